use std::fmt;

/// A closed, exhaustively enumerated value set.
///
/// Every member carries a storage `key` (what the database column holds) and
/// an external `label` (what API callers send and receive). Both must be
/// unique within the set.
pub trait Choice: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Human-readable name of the set, used in error messages.
    const SET_NAME: &'static str;

    /// Every member, in declaration order.
    const ALL: &'static [Self];

    /// Key persisted by the storage layer.
    fn key(self) -> &'static str;

    /// Label exposed to API callers.
    fn label(self) -> &'static str;

    /// Look up a member by its external label (exact match).
    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|member| member.label() == label)
    }

    /// Look up a member by its storage key.
    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|member| member.key() == key)
    }

    /// All external labels, in declaration order.
    fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|member| member.label()).collect()
    }

    /// `(key, label)` pairs for every member.
    fn table() -> Vec<(&'static str, &'static str)> {
        Self::ALL
            .iter()
            .map(|member| (member.key(), member.label()))
            .collect()
    }
}
