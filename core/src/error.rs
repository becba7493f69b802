use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChaosError {
    /// Missing or inconsistent relationship/schema option, reported at construction
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Statement cannot be rendered (missing clause, unknown column type, bad operator)
    #[error("Compile error: {0}")]
    Compile(String),

    /// Relationship key missing on a schema or entity
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Unknown naming-convention rule
    #[error("Convention error: {0}")]
    Convention(String),

    /// Access to a relation that has not been embedded
    #[error("Relation not loaded: {0}")]
    NotLoaded(String),

    /// Stored value cannot be cast to the field's logical type
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Opaque failure reported by a connection
    #[error("Backend error: {0}")]
    Backend(String),

    /// Rusqlite specific errors
    #[cfg(feature = "rusqlite")]
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

/// Result type for chaos operations
pub type Result<T> = std::result::Result<T, ChaosError>;
