//! The fixed catalog of components offered in a session

use crate::component::Component;
use crate::components;

/// Ordered, read-only list of components, built once at startup
pub struct Registry {
    components: Vec<Box<dyn Component>>,
}

impl Registry {
    /// Registry over a custom catalog, in the given order
    pub fn new(components: Vec<Box<dyn Component>>) -> Self {
        Self { components }
    }

    /// Registry of every built-in component
    pub fn builtin() -> Self {
        Self::new(components::builtin())
    }

    pub fn components(&self) -> impl Iterator<Item = &dyn Component> {
        self.components.iter().map(|c| c.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.components.iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("components", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order() {
        let registry = Registry::builtin();
        assert_eq!(
            registry.names(),
            vec!["Docker", "NginxDomain", "VNC", "ZabbixAgent", "AwsCli", "NodeExporter"]
        );
        assert_eq!(registry.len(), 6);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_empty_registry() {
        let registry = Registry::new(Vec::new());
        assert!(registry.is_empty());
        assert_eq!(registry.components().count(), 0);
    }
}
