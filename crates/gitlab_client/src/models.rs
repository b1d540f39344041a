//! # Models
//!
//! Listing types returned by the GitLab groups and projects endpoints, plus the page
//! wrapper used by every paginated call.
//!
//! Only the fields the reconciliation engine needs are modelled. Everything else in the
//! GitLab payloads is ignored during deserialization.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// Represents a GitLab group (or subgroup) as returned by `GET /groups`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Group {
    /// The unique ID of the group
    pub id: u64,
    /// The display name of the group
    pub name: String,
    /// The URL slug of the group (last path segment)
    #[serde(default)]
    pub path: String,
    /// The full namespace path, e.g. `acme/backend`
    #[serde(default)]
    pub full_path: String,
    /// The web URL of the group, e.g. `https://gitlab.com/groups/acme/backend`
    pub web_url: String,
}

/// The namespace a project lives in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Namespace {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub path: String,
    /// Slash separated ancestry of the namespace, e.g. `acme/backend/payments`
    pub full_path: String,
}

/// Represents a GitLab project, the unit being reconciled.
///
/// # Examples
///
/// ```
/// use gitlab_client::models::Project;
///
/// let project: Project = serde_json::from_str(r#"{
///     "id": 42,
///     "name": "ledger",
///     "path_with_namespace": "acme/backend/payments/ledger",
///     "namespace": {
///         "id": 7,
///         "name": "payments",
///         "path": "payments",
///         "full_path": "acme/backend/payments"
///     }
/// }"#).unwrap();
///
/// assert_eq!(project.namespace_path(), "acme/backend/payments");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub path_with_namespace: String,
    pub namespace: Namespace,
}

impl Project {
    /// The full path of the namespace the project belongs to.
    pub fn namespace_path(&self) -> &str {
        &self.namespace.full_path
    }
}

/// One page of a paginated GitLab listing.
///
/// GitLab reports pagination through the `X-Page`, `X-Total-Pages` and `X-Next-Page`
/// response headers. `X-Total-Pages` is omitted for very large collections, in which case
/// only `next_page` tells whether more data exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// The items on this page
    pub items: Vec<T>,
    /// The page number GitLab says it served
    pub current_page: u32,
    /// The total number of pages, when reported
    pub total_pages: Option<u32>,
    /// The next page number, when reported
    pub next_page: Option<u32>,
}

impl<T> Page<T> {
    /// Creates a page that is known to be the last one.
    pub fn last(items: Vec<T>, current_page: u32) -> Self {
        Self {
            items,
            current_page,
            total_pages: Some(current_page),
            next_page: None,
        }
    }

    /// Returns true if another page should be requested after this one.
    pub fn has_next(&self) -> bool {
        match self.total_pages {
            Some(total) => self.current_page < total,
            None => self.next_page.is_some(),
        }
    }
}
