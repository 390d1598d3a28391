#![forbid(unsafe_code)]

pub mod error;
pub mod persistence;
pub mod quiz_service;
pub mod reporting;

pub use assessment_core::Clock;

pub use error::{QuizServiceError, ReportError};
pub use persistence::SnapshotStore;
pub use quiz_service::{PendingReport, QuizService, StepOutcome};
pub use reporting::{
    AssessmentReport, OutboundEmail, ReportConfig, ReportReceipt, ReportRequest, ReportResponse,
    ReportService, ReportTransport, ResendTransport,
};
