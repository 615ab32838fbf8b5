use thiserror::Error;

/// Every failure the core can raise.
///
/// Failures are raised where they are detected and propagated unchanged to
/// the transport boundary, which alone decides how to render them.
#[derive(Error, Debug)]
pub enum RolodexError {
    /// A domain value failed to parse or to match an enumerated mapping.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// An external attribute name (or alias path segment) is not mapped.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// A stored key is absent from a choice mapping.
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    /// Malformed or policy-violating input.
    #[error("{0}")]
    BadRequest(String),

    /// The grant policy denied the operation.
    #[error("{0}")]
    Unauthorized(String),

    /// The target entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, RolodexError>;
