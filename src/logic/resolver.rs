//! Dependency aggregation for a resolved selection
//!
//! - **Packages**: the set union of every selected component's package
//!   dependencies, sorted for a deterministic install command
//! - **Component dependencies**: declared ones that were not selected are
//!   reported; they are never added to the selection or used to reorder it

use crate::component::Component;
use std::collections::BTreeSet;

/// Union of the package dependencies of `components`.
///
/// Order of `components` and repeated entries do not change the result.
pub fn aggregate_packages(components: &[&dyn Component]) -> BTreeSet<String> {
    components
        .iter()
        .flat_map(|c| c.package_dependencies().iter())
        .map(|pkg| (*pkg).to_string())
        .collect()
}

/// A declared component dependency that is missing from the selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependency {
    pub component: &'static str,
    pub requires: &'static str,
}

/// Declared component dependencies not present in the selection, in
/// selection order, each reported once
pub fn undeclared_dependencies(components: &[&dyn Component]) -> Vec<MissingDependency> {
    let selected: BTreeSet<&str> = components.iter().map(|c| c.name()).collect();
    let mut seen = BTreeSet::new();
    let mut missing = Vec::new();

    for component in components {
        for &requires in component.component_dependencies() {
            if !selected.contains(requires) && seen.insert((component.name(), requires)) {
                missing.push(MissingDependency {
                    component: component.name(),
                    requires,
                });
            }
        }
    }

    missing
}
