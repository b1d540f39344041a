//! Protected branch domain types.
//!
//! This module contains types representing GitLab protected branches and the access
//! levels that govern who may push to or merge into them.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "protected_branch_tests.rs"]
mod tests;

/// The access levels that can be granted on a protected branch.
///
/// GitLab exposes more levels (e.g. admin = 60) on other endpoints, but protected branch
/// rules only accept these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccessLevel {
    /// Nobody may perform the action
    NoOne,
    /// Developers and maintainers
    Developers,
    /// Maintainers only
    Maintainers,
}

impl AccessLevel {
    /// The numeric value GitLab uses for the level.
    pub fn value(self) -> u32 {
        match self {
            Self::NoOne => 0,
            Self::Developers => 30,
            Self::Maintainers => 40,
        }
    }

    /// Converts a numeric GitLab level back into an `AccessLevel`.
    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::NoOne),
            30 => Some(Self::Developers),
            40 => Some(Self::Maintainers),
            _ => None,
        }
    }

    /// The description GitLab attaches to the level.
    pub fn description(self) -> &'static str {
        match self {
            Self::NoOne => "No one",
            Self::Developers => "Developers + Maintainers",
            Self::Maintainers => "Maintainers",
        }
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.value())
    }
}

/// One access grant on a protected branch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BranchAccessDescription {
    pub access_level: u32,
    #[serde(default)]
    pub access_level_description: String,
}

impl From<AccessLevel> for BranchAccessDescription {
    fn from(value: AccessLevel) -> Self {
        Self {
            access_level: value.value(),
            access_level_description: value.description().to_string(),
        }
    }
}

/// A protected branch as returned by `GET /projects/:id/protected_branches`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProtectedBranch {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub push_access_levels: Vec<BranchAccessDescription>,
    #[serde(default)]
    pub merge_access_levels: Vec<BranchAccessDescription>,
}

impl ProtectedBranch {
    /// Sorted numeric push levels.
    pub fn push_levels(&self) -> Vec<u32> {
        sorted_levels(&self.push_access_levels)
    }

    /// Sorted numeric merge levels.
    pub fn merge_levels(&self) -> Vec<u32> {
        sorted_levels(&self.merge_access_levels)
    }
}

fn sorted_levels(levels: &[BranchAccessDescription]) -> Vec<u32> {
    let mut values: Vec<u32> = levels.iter().map(|l| l.access_level).collect();
    values.sort_unstable();
    values.dedup();
    values
}

/// Body of `POST /projects/:id/protected_branches`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtectBranchOptions {
    pub name: String,
    pub push_access_level: u32,
    pub merge_access_level: u32,
}

impl ProtectBranchOptions {
    pub fn new(name: &str, merge: AccessLevel, push: AccessLevel) -> Self {
        Self {
            name: name.to_string(),
            push_access_level: push.value(),
            merge_access_level: merge.value(),
        }
    }
}
