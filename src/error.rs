//! Error types for the tracker.

use thiserror::Error;

/// Errors raised while configuring the tracker or validating its input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    /// A configuration parameter is out of range. Raised at construction time.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A detection in the submitted frame is malformed.
    #[error("Invalid detection at index {index}: {reason}")]
    InvalidDetection { index: usize, reason: String },
}

/// Result type for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;
