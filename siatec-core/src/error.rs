//! Error types.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SiatecError>;

/// Errors that can occur while building point sets or running selectors.
///
/// Missing difference vectors, empty translator sets and zero-sized bounding
/// boxes are ordinary outcomes and never surface as errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SiatecError {
    /// Two vectors of differing dimensionality were combined.
    #[error("dimension mismatch: expected {expected} components, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// A selector was given zero points.
    #[error("empty dataset: at least one point is required")]
    EmptyDataset,

    /// A row of input could not be turned into a point.
    #[error("malformed input at line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    /// A threshold or configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The input source could not be read.
    #[error("io error: {0}")]
    Io(String),
}

impl SiatecError {
    /// Check if the caller can fix this by correcting the input data.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SiatecError::MalformedInput { .. } | SiatecError::EmptyDataset | SiatecError::Io(_)
        )
    }

    /// Check if this error indicates a programming error.
    pub fn is_bug(&self) -> bool {
        matches!(self, SiatecError::DimensionMismatch { .. })
    }
}

impl From<std::io::Error> for SiatecError {
    fn from(err: std::io::Error) -> Self {
        SiatecError::Io(err.to_string())
    }
}
