//! Outbound assessment report: validation, rendering and delivery.

mod report;
mod request;
mod service;
mod transport;

pub use report::{AssessmentReport, PhaseLine, ReviewLine, SectionLine};
pub use request::{MISSING_FIELDS, ReportRequest, ValidatedReport};
pub use service::{ReportReceipt, ReportResponse, ReportService, ResponseBody};
pub use transport::{
    DEFAULT_BASE_URL, DEFAULT_SENDER, DEFAULT_TIMEOUT_SECS, OutboundEmail, ReportConfig,
    ReportTransport, ResendTransport,
};
