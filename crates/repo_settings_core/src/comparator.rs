//! The comparison contract shared by every setting category.

/// Merges desired settings over live settings and compares the result.
///
/// Implementations are written per category with explicit per-field code. They must
/// satisfy these properties:
///
/// * `merge(d, &merge(d, l))` equals `merge(d, l)`
/// * an empty desired value yields the live value unchanged
/// * `equal` ignores the order of set-like fields
pub trait SettingComparator {
    /// Desired-state fragment from configuration
    type Desired;

    /// Live settings as read from GitLab
    type Live;

    /// Overlays the set fields of `desired` on `live`.
    fn merge(desired: &Self::Desired, live: &Self::Live) -> Self::Live;

    /// Returns true if the two live values are equivalent.
    fn equal(a: &Self::Live, b: &Self::Live) -> bool;

    /// Describes how `to` differs from `from`, one entry per changed field.
    fn describe_changes(from: &Self::Live, to: &Self::Live) -> Vec<String>;
}
