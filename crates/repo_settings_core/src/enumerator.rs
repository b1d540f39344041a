//! Group and project enumeration.
//!
//! GitLab listing endpoints are paginated. [`PageCursor`] tracks the position in one
//! listing; every call to [`Enumerator::list_groups`] or [`Enumerator::list_projects`]
//! starts from the first page.

use gitlab_client::{GitLabApi, Group, Page, Project};
use tracing::{debug, info};

use crate::errors::RepoSettingsResult;

#[cfg(test)]
#[path = "enumerator_tests.rs"]
mod tests;

/// Page size used when listing groups.
pub const GROUPS_PER_PAGE: u32 = 10;

/// Page size used when listing the projects of a group.
pub const PROJECTS_PER_PAGE: u32 = 20;

/// Position in a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    next: Option<u32>,
    per_page: u32,
}

impl PageCursor {
    /// Creates a cursor positioned on the first page.
    pub fn new(per_page: u32) -> Self {
        Self {
            next: Some(1),
            per_page,
        }
    }

    /// The page to fetch next, or `None` once the listing is exhausted.
    pub fn next_page(&self) -> Option<u32> {
        self.next
    }

    /// Page size requested for every page.
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Moves past `page`.
    ///
    /// The listing ends when the page reports no successor. A successor that does not move
    /// forward also ends it.
    pub fn advance<T>(&mut self, page: &Page<T>) {
        self.next = if page.has_next() {
            let candidate = match page.total_pages {
                Some(_) => page.current_page + 1,
                None => page.next_page.unwrap_or(page.current_page + 1),
            };
            (candidate > page.current_page).then_some(candidate)
        } else {
            None
        };
    }
}

/// Lists groups and projects through a [`GitLabApi`].
pub struct Enumerator<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C: GitLabApi + ?Sized> Enumerator<'a, C> {
    /// Creates an enumerator issuing requests through `client`.
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Lists every group visible to the token, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepoSettingsError::Transport` if any page cannot be fetched.
    pub async fn list_groups(&self) -> RepoSettingsResult<Vec<Group>> {
        let mut cursor = PageCursor::new(GROUPS_PER_PAGE);
        let mut groups = Vec::new();

        while let Some(page_number) = cursor.next_page() {
            debug!(page = page_number, "Fetching groups page");
            let page = self
                .client
                .list_groups_page(page_number, cursor.per_page())
                .await?;
            cursor.advance(&page);
            groups.extend(page.items);
        }

        info!(count = groups.len(), "Listed groups");
        Ok(groups)
    }

    /// Lists every project in a group, including those in its subgroups.
    ///
    /// # Errors
    ///
    /// Returns `RepoSettingsError::Transport` if any page cannot be fetched.
    pub async fn list_projects(&self, group_id: u64) -> RepoSettingsResult<Vec<Project>> {
        let mut cursor = PageCursor::new(PROJECTS_PER_PAGE);
        let mut projects = Vec::new();

        while let Some(page_number) = cursor.next_page() {
            debug!(group_id = group_id, page = page_number, "Fetching projects page");
            let page = self
                .client
                .list_group_projects_page(group_id, page_number, cursor.per_page())
                .await?;
            cursor.advance(&page);
            projects.extend(page.items);
        }

        info!(group_id = group_id, count = projects.len(), "Listed projects");
        Ok(projects)
    }
}
