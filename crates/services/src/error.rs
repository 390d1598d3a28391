//! Shared error types for the services crate.

use thiserror::Error;

/// Errors emitted by the reporting adapter.
///
/// `Validation` is a caller mistake caught before any scoring. Everything else
/// is a delivery failure and never touches the local session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    #[error("{0}")]
    Validation(String),
    #[error("report delivery is not configured")]
    Disabled,
    #[error("report delivery failed with status {status}: {message}")]
    HttpStatus {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("report delivery failed: {0}")]
    Delivery(String),
}

impl ReportError {
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    #[must_use]
    pub fn is_delivery(&self) -> bool {
        !self.is_validation()
    }
}

/// Errors emitted by `QuizService` operations that can fail.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("quiz is not completed")]
    NotCompleted,
    #[error("no report service configured")]
    NoReporter,
    #[error(transparent)]
    Report(#[from] ReportError),
}
