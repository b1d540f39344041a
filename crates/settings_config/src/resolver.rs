//! Namespace resolution.
//!
//! A repository inherits the settings of the most specific configured group in its
//! ancestry. The hierarchy is not modelled as a tree: candidate paths are produced by
//! stripping the last segment of the namespace path until a configured name matches.

use tracing::debug;

use crate::GroupConfig;

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;

/// Returns the candidate paths tried for `namespace_path`, most specific first.
///
/// # Examples
///
/// ```rust
/// use settings_config::resolution_chain;
///
/// assert_eq!(resolution_chain("acme/backend/payments"), vec!["acme/backend/payments", "acme/backend", "acme"]);
/// assert_eq!(resolution_chain("acme"), vec!["acme"]);
/// ```
pub fn resolution_chain(namespace_path: &str) -> Vec<&str> {
    let mut chain = Vec::new();
    let mut current = namespace_path;

    loop {
        chain.push(current);
        match current.rsplit_once('/') {
            Some((parent, _)) => current = parent,
            None => break,
        }
    }

    chain
}

/// Finds the group configuration governing `namespace_path`.
///
/// Names are compared case-insensitively. When the tree holds duplicate names the first
/// entry wins. Returns `None` once the single remaining segment fails to match.
///
/// # Examples
///
/// ```rust
/// use settings_config::{resolve_group, GroupConfig};
///
/// let groups = vec![GroupConfig::named("acme")];
///
/// let resolved = resolve_group(&groups, "ACME/backend/payments").unwrap();
/// assert_eq!(resolved.name, "acme");
/// assert!(resolve_group(&groups, "other").is_none());
/// ```
pub fn resolve_group<'a>(groups: &'a [GroupConfig], namespace_path: &str) -> Option<&'a GroupConfig> {
    for candidate in resolution_chain(namespace_path) {
        if let Some(group) = groups
            .iter()
            .find(|g| g.name.eq_ignore_ascii_case(candidate))
        {
            debug!(
                namespace = namespace_path,
                group = %group.name,
                "Resolved namespace to configured group"
            );
            return Some(group);
        }
    }

    debug!(namespace = namespace_path, "No configured group for namespace");
    None
}
