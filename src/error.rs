//! Error types for fleetplan.
//!
//! Every variant here is fatal: it aborts the whole synthesis run and no partial
//! plan is written. Non-fatal conditions are [`crate::diagnostics::Diagnostic`]s.

use crate::exit_codes;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for synthesis runs.
#[derive(Error, Debug)]
pub enum SynthError {
    /// A required configuration value is missing or malformed.
    #[error("configuration error in '{key}': {message}")]
    Configuration { key: String, message: String },

    /// A referenced local file (instruction, prompt, handler entry,
    /// interface contract, library asset) is missing or unreadable.
    #[error("missing resource '{}': {reason}", path.display())]
    MissingResource { path: PathBuf, reason: String },

    /// The assembled graph violates a structural invariant.
    #[error("invalid plan: {0}")]
    InvalidPlan(String),

    /// Output could not be written or the invocation itself is wrong.
    #[error("{0}")]
    UserError(String),
}

impl SynthError {
    /// Shorthand for a [`SynthError::Configuration`] naming the offending key.
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        SynthError::Configuration {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`SynthError::MissingResource`].
    pub fn missing(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        SynthError::MissingResource {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            SynthError::Configuration { .. } => exit_codes::USER_ERROR,
            SynthError::UserError(_) => exit_codes::USER_ERROR,
            SynthError::MissingResource { .. } => exit_codes::MISSING_RESOURCE,
            SynthError::InvalidPlan(_) => exit_codes::INVALID_PLAN,
        }
    }
}

/// Result type alias for synthesis operations.
pub type Result<T> = std::result::Result<T, SynthError>;
