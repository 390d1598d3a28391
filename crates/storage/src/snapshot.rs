//! Persisted shape of a quiz session.
//!
//! The JSON layout is `{currentIndex, answers, showResult, completed, startTime,
//! quizStatus}`. Decoding is lenient: any field may be missing or malformed and
//! falls back to its default instead of rejecting the whole snapshot.

use assessment_core::model::{AnswerMap, RevealSet};
use assessment_core::session::{QuizStatus, SessionState};
use assessment_core::time::{from_epoch_millis, to_epoch_millis};
use serde::{Deserialize, Serialize};

use crate::repository::StorageError;

/// Fixed key under which the single snapshot lives.
pub const SNAPSHOT_KEY: &str = "ic4-quiz-state";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    #[serde(default, deserialize_with = "lenient::index")]
    pub current_index: usize,
    #[serde(default, deserialize_with = "lenient::answers")]
    pub answers: AnswerMap,
    #[serde(default, deserialize_with = "lenient::flags")]
    pub show_result: RevealSet,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub completed: bool,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub start_time: i64,
    #[serde(
        default,
        deserialize_with = "lenient::status",
        skip_serializing_if = "Option::is_none"
    )]
    pub quiz_status: Option<QuizStatus>,
}

impl SnapshotRecord {
    #[must_use]
    pub fn from_state(state: &SessionState) -> Self {
        Self {
            current_index: state.current_index(),
            answers: state.answers().clone(),
            show_result: state.revealed().clone(),
            completed: state.is_completed(),
            start_time: state.started_at().map_or(0, to_epoch_millis),
            quiz_status: Some(state.status()),
        }
    }

    /// Decode a stored payload.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` when the payload is not valid JSON or
    /// not a record at all. Individual fields never cause a failure.
    pub fn decode(payload: &str) -> Result<Self, StorageError> {
        serde_json::from_str(payload).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Encode for storage.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails.
    pub fn encode(&self) -> Result<String, StorageError> {
        serde_json::to_string(self).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Convert into a raw session state, back-filling what is missing.
    ///
    /// A snapshot without `quizStatus` (written before the landing screen existed)
    /// is treated as completed if flagged so, in progress if it carries answers or
    /// a start time, and not started otherwise.
    #[must_use]
    pub fn into_state(self) -> SessionState {
        let status = match self.quiz_status {
            Some(status) => status,
            None if self.completed => QuizStatus::Completed,
            None if !self.answers.is_empty() || self.start_time > 0 => QuizStatus::InProgress,
            None => QuizStatus::NotStarted,
        };
        SessionState::from_parts(
            self.current_index,
            self.answers,
            self.show_result,
            self.completed,
            status,
            from_epoch_millis(self.start_time),
        )
    }
}

mod lenient {
    use assessment_core::model::{AnswerMap, AnswerOption, QuestionId, RevealSet};
    use assessment_core::session::QuizStatus;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn index<'de, D: Deserializer<'de>>(d: D) -> Result<usize, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or_default())
    }

    pub fn answers<'de, D: Deserializer<'de>>(d: D) -> Result<AnswerMap, D::Error> {
        let Value::Object(entries) = Value::deserialize(d)? else {
            return Ok(AnswerMap::new());
        };
        Ok(entries
            .into_iter()
            .filter_map(|(key, value)| {
                let id = key.parse::<QuestionId>().ok()?;
                let option = value.as_str()?.parse::<AnswerOption>().ok()?;
                Some((id, option))
            })
            .collect())
    }

    pub fn flags<'de, D: Deserializer<'de>>(d: D) -> Result<RevealSet, D::Error> {
        let Value::Object(entries) = Value::deserialize(d)? else {
            return Ok(RevealSet::new());
        };
        Ok(entries
            .into_iter()
            .filter_map(|(key, value)| Some((key.parse::<QuestionId>().ok()?, value.as_bool()?)))
            .collect())
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(Value::deserialize(d)?.as_bool().unwrap_or_default())
    }

    pub fn timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        let value = Value::deserialize(d)?;
        #[allow(clippy::cast_possible_truncation)]
        let millis = value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f as i64))
            .unwrap_or_default();
        Ok(millis)
    }

    pub fn status<'de, D: Deserializer<'de>>(d: D) -> Result<Option<QuizStatus>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(value.as_str().and_then(|s| s.parse().ok()))
    }
}
