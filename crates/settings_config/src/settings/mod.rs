//! Desired-state settings fragments for each managed category.
//!
//! Every fragment is optional on a group. An absent fragment means the category is not
//! managed for the repositories resolved to that group.

pub mod approvals;
pub mod integration;
pub mod protected_branch;

pub use approvals::ApprovalSettings;
pub use integration::{IntegrationSettings, SlackPropertiesSettings};
pub use protected_branch::{parse_access_level, ProtectedBranchSetting};
