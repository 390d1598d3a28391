use assessment_core::SessionState;
use assessment_core::model::AnswerMap;
use assessment_core::time::{from_epoch_millis, to_epoch_millis};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ReportError;

pub const MISSING_FIELDS: &str = "Missing answers or startTime";

/// Wire body of a report submission: `{answers, startTime}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<AnswerMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedReport {
    pub answers: AnswerMap,
    pub started_at: DateTime<Utc>,
}

impl ReportRequest {
    #[must_use]
    pub fn from_state(state: &SessionState) -> Self {
        Self {
            answers: Some(state.answers().clone()),
            start_time: state.started_at().map(to_epoch_millis),
        }
    }

    /// Check the request before any scoring.
    ///
    /// An empty answer map is accepted; a missing one is not. A start time of
    /// zero counts as missing, and so does a negative one: anything before the
    /// epoch is rejected, not only falsy values.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Validation` when `answers` or `startTime` is absent.
    pub fn validate(self) -> Result<ValidatedReport, ReportError> {
        let missing = || ReportError::Validation(MISSING_FIELDS.to_string());
        let answers = self.answers.ok_or_else(missing)?;
        let started_at = self.start_time.and_then(from_epoch_millis).ok_or_else(missing)?;
        Ok(ValidatedReport {
            answers,
            started_at,
        })
    }
}
