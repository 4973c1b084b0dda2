//! Error types for SkyFare
//!
//! Two families live here:
//! - [`Error`]: configuration and I/O plumbing used by the binaries
//! - [`PredictError`]: the typed outcome taxonomy returned to the presentation layer

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Common result type for configuration and plumbing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types for configuration and file handling
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// One strategy that was tried against an existing candidate file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatFailure {
    pub format: String,
    pub error: String,
}

/// What happened when the resolver looked at one candidate file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// No file at this path
    Missing,
    /// File exists but could not be read
    ReadFailed(String),
    /// File was read, every format rejected it
    Rejected(Vec<FormatFailure>),
}

/// Diagnostic record for one candidate file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveAttempt {
    pub path: PathBuf,
    pub outcome: AttemptOutcome,
}

/// No candidate artifact could be loaded
///
/// Carries every file that was tried and, for files that existed, the error
/// from every format. Fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelUnavailable {
    pub attempts: Vec<ResolveAttempt>,
}

impl ModelUnavailable {
    /// File names tried, in resolution order
    pub fn tried(&self) -> Vec<PathBuf> {
        self.attempts.iter().map(|a| a.path.clone()).collect()
    }
}

impl fmt::Display for ModelUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attempts.is_empty() {
            return write!(f, "no model artifact candidates configured");
        }

        write!(f, "no loadable model artifact")?;
        for attempt in &self.attempts {
            write!(f, "\n  {}: ", attempt.path.display())?;
            match &attempt.outcome {
                AttemptOutcome::Missing => write!(f, "not found")?,
                AttemptOutcome::ReadFailed(e) => write!(f, "read failed ({})", e)?,
                AttemptOutcome::Rejected(failures) => {
                    let detail: Vec<String> = failures
                        .iter()
                        .map(|ff| format!("{}: {}", ff.format, ff.error))
                        .collect();
                    write!(f, "{}", detail.join("; "))?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for ModelUnavailable {}

/// Typed failure returned by the core to the presentation layer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    /// No pipeline could be resolved (fatal, operator-facing)
    #[error("Model unavailable: {0}")]
    ModelUnavailable(#[from] ModelUnavailable),

    /// A precondition on the query was violated (recoverable, user-facing)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The pipeline raised during prediction (recoverable)
    #[error("Prediction failed: {0}")]
    PredictionFailed(String),
}

impl PredictError {
    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            PredictError::ModelUnavailable(_) => "MODEL_UNAVAILABLE",
            PredictError::InvalidQuery(_) => "INVALID_QUERY",
            PredictError::PredictionFailed(_) => "PREDICTION_FAILED",
        }
    }
}
