/// Convenience result type used across visdiff.
pub type VisdiffResult<T> = Result<T, VisdiffError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum VisdiffError {
    /// Structurally invalid input (e.g. a snapshot that is not a selector-keyed mapping).
    #[error("validation error: {0}")]
    Validation(String),

    /// A selector, cell label or grid range that cannot be interpreted.
    #[error("parse error: {0}")]
    Parse(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VisdiffError {
    /// Build a [`VisdiffError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`VisdiffError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`VisdiffError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
