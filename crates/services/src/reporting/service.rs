use std::sync::Arc;

use assessment_core::{Clock, QuestionBank};
use serde::Serialize;

use super::report::AssessmentReport;
use super::request::ReportRequest;
use super::transport::{
    DEFAULT_SENDER, OutboundEmail, ReportConfig, ReportTransport, ResendTransport,
};
use crate::error::ReportError;

/// What a successful submission produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportReceipt {
    pub subject: String,
    pub percentage: u32,
    pub message_id: Option<String>,
}

/// Builds the assessment report and hands it to a transport.
///
/// Independent of any session: it only ever sees the submitted answers and
/// start time.
#[derive(Clone)]
pub struct ReportService {
    bank: Arc<QuestionBank>,
    transport: Option<Arc<dyn ReportTransport>>,
    from: String,
    recipient: String,
    clock: Clock,
}

impl ReportService {
    #[must_use]
    pub fn new(
        bank: Arc<QuestionBank>,
        transport: Option<Arc<dyn ReportTransport>>,
        recipient: impl Into<String>,
        clock: Clock,
    ) -> Self {
        Self {
            bank,
            transport,
            from: DEFAULT_SENDER.to_string(),
            recipient: recipient.into(),
            clock,
        }
    }

    /// Wire up the Resend transport from `QUIZ_REPORT_*` variables; stays
    /// disabled when they are missing.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Http` if the HTTP client cannot be built.
    pub fn from_env(bank: Arc<QuestionBank>, clock: Clock) -> Result<Self, ReportError> {
        match ReportConfig::from_env() {
            Some(config) => Self::with_config(bank, &config, clock),
            None => {
                tracing::info!("report delivery disabled: QUIZ_REPORT_API_KEY or QUIZ_REPORT_RECIPIENT unset");
                Ok(Self::new(bank, None, String::new(), clock))
            }
        }
    }

    /// # Errors
    ///
    /// Returns `ReportError::Http` if the HTTP client cannot be built.
    pub fn with_config(
        bank: Arc<QuestionBank>,
        config: &ReportConfig,
        clock: Clock,
    ) -> Result<Self, ReportError> {
        let transport: Arc<dyn ReportTransport> = Arc::new(ResendTransport::new(config)?);
        Ok(Self::new(bank, Some(transport), config.recipient.clone(), clock).with_sender(&config.from))
    }

    #[must_use]
    pub fn with_sender(mut self, from: &str) -> Self {
        self.from = from.to_string();
        self
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Validate, score, render and deliver one report.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Validation` for an incomplete request (nothing is
    /// scored), `ReportError::Disabled` without a transport, or the transport's
    /// delivery error.
    pub async fn submit(&self, request: ReportRequest) -> Result<ReportReceipt, ReportError> {
        let report = request.validate()?;
        let Some(transport) = &self.transport else {
            return Err(ReportError::Disabled);
        };

        let built = AssessmentReport::build(
            &self.bank,
            &report.answers,
            report.started_at,
            self.clock.now(),
        );
        let email = OutboundEmail {
            from: self.from.clone(),
            to: vec![self.recipient.clone()],
            subject: built.subject(),
            html: built.render_html(),
            text: built.render_text(),
        };

        match transport.deliver(&email).await {
            Ok(message_id) => {
                tracing::info!(
                    percentage = built.percentage(),
                    tier = built.tier().level(),
                    "assessment report delivered"
                );
                Ok(ReportReceipt {
                    subject: email.subject,
                    percentage: built.percentage(),
                    message_id,
                })
            }
            Err(err) => {
                tracing::warn!(error = %err, "assessment report delivery failed");
                Err(err)
            }
        }
    }

    /// Handle a raw JSON body the way the HTTP endpoint does.
    pub async fn handle_json(&self, body: &str) -> ReportResponse {
        let result = match serde_json::from_str::<ReportRequest>(body) {
            Ok(request) => self.submit(request).await,
            Err(err) => Err(ReportError::Validation(format!("Invalid request body: {err}"))),
        };
        ReportResponse::from_result(&result)
    }
}

//
// ─── WIRE RESPONSE ────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Success { success: bool },
    Failure { error: String },
}

/// HTTP-style reply: `200 {success: true}`, `400 {error}` or `500 {error}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl ReportResponse {
    #[must_use]
    pub fn from_result(result: &Result<ReportReceipt, ReportError>) -> Self {
        match result {
            Ok(_) => Self {
                status: 200,
                body: ResponseBody::Success { success: true },
            },
            Err(err) => Self {
                status: if err.is_validation() { 400 } else { 500 },
                body: ResponseBody::Failure {
                    error: err.to_string(),
                },
            },
        }
    }

    /// # Errors
    ///
    /// Returns `serde_json::Error` if the body cannot be serialized.
    pub fn body_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.body)
    }
}
