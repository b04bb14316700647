//! Turns free-text operator input into an ordered list of components
//!
//! Tokens are matched by case-sensitive substring against component names, so
//! `Nginx` selects `NginxDomain`. A token must match exactly one component;
//! the first token that matches none or several rejects the whole input.

use crate::component::Component;
use crate::error::SelectionError;
use crate::registry::Registry;

/// Split input on `,` and trim each token. Empty tokens are kept so they are
/// reported instead of silently dropped.
pub fn parse_selection(input: &str) -> Vec<&str> {
    input.split(',').map(str::trim).collect()
}

/// Every registry component whose name contains `token`, in registry order
pub fn candidates<'r>(registry: &'r Registry, token: &str) -> Vec<&'r dyn Component> {
    if token.is_empty() {
        return Vec::new();
    }
    registry
        .components()
        .filter(|c| c.name().contains(token))
        .collect()
}

/// Resolve one token to its single matching component
pub fn resolve_token<'r>(
    registry: &'r Registry,
    token: &str,
) -> Result<&'r dyn Component, SelectionError> {
    let mut matches = candidates(registry, token);
    match matches.len() {
        0 => Err(SelectionError::UnknownComponent(token.to_string())),
        1 => Ok(matches.remove(0)),
        _ => Err(SelectionError::AmbiguousComponent {
            token: token.to_string(),
            candidates: matches.iter().map(|c| c.name().to_string()).collect(),
        }),
    }
}

/// Resolve a whole comma-separated selection.
///
/// Token order is preserved, and two tokens naming the same component yield
/// it twice. Nothing is returned unless every token resolves.
pub fn resolve<'r>(
    registry: &'r Registry,
    input: &str,
) -> Result<Vec<&'r dyn Component>, SelectionError> {
    parse_selection(input)
        .into_iter()
        .map(|token| resolve_token(registry, token))
        .collect()
}
