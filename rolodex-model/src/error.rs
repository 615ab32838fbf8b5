use thiserror::Error;

/// Errors produced when external labels do not belong to a closed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The label is not a member of the named choice set.
    #[error("'{label}' is not a valid {set}")]
    UnknownLabel {
        /// Name of the choice set (e.g. `role`).
        set: &'static str,
        /// The rejected label.
        label: String,
    },
}
