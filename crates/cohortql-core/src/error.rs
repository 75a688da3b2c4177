use thiserror::Error;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The operator tree itself is wrong (leaf without a type, bad kid count,
    /// unknown operator, invalid options). Never recoverable.
    #[error("Malformed operator tree: {0}")]
    MalformedTree(String),

    #[error("Unknown criterion type: {0}")]
    UnknownType(String),

    #[error("Unsupported dialect for date construction: {0}")]
    UnsupportedDialect(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Hashing error: {0}")]
    Hash(String),

    // The core crate does not talk to a store, but connection layers map
    // their failures into this variant so they abort compilation uniformly.
    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal invariant failed: {0}")]
    Invariant(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Hash(e.to_string())
    }
}
