//! Session state and the progression state machine that drives it.

mod machine;
mod progress;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::bank::QuestionBank;
use crate::model::{AnswerMap, AnswerOption, Question, QuestionId, RevealSet};
use crate::scoring::{ScoreCard, compute_scores};
use crate::time::{elapsed_since, format_elapsed};

pub use machine::Quiz;
pub use progress::SessionProgress;

//
// ─── STATUS ───────────────────────────────────────────────────────────────────
//

/// Coarse lifecycle of a quiz session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl QuizStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for QuizStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError(String);

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown quiz status: {}", self.0)
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for QuizStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not-started" => Ok(Self::NotStarted),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

//
// ─── STATE ────────────────────────────────────────────────────────────────────
//

/// Immutable snapshot of a quiz session.
///
/// Values are produced by [`Quiz`] transitions; every transition returns a new
/// snapshot and leaves its input untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    current_index: usize,
    answers: AnswerMap,
    revealed: RevealSet,
    completed: bool,
    status: QuizStatus,
    started_at: Option<DateTime<Utc>>,
}

impl SessionState {
    /// The initial, not-started state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate a state from persisted parts.
    ///
    /// No invariants are enforced here; pass the result through [`Quiz::restore`]
    /// before driving transitions with it.
    #[must_use]
    pub fn from_parts(
        current_index: usize,
        answers: AnswerMap,
        revealed: RevealSet,
        completed: bool,
        status: QuizStatus,
        started_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            current_index,
            answers,
            revealed,
            completed,
            status,
            started_at,
        }
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    #[must_use]
    pub fn revealed(&self) -> &RevealSet {
        &self.revealed
    }

    /// True while the results view is showing.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn status(&self) -> QuizStatus {
        self.status
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn selected_answer(&self, id: QuestionId) -> Option<AnswerOption> {
        self.answers.get(&id).copied()
    }

    #[must_use]
    pub fn is_revealed(&self, id: QuestionId) -> bool {
        self.revealed.get(&id).copied().unwrap_or(false)
    }

    /// Whether the stored answer for `id` is correct; `None` if unanswered or unknown.
    #[must_use]
    pub fn is_correct(&self, bank: &QuestionBank, id: QuestionId) -> Option<bool> {
        let selected = self.selected_answer(id)?;
        bank.question(id).map(|question| question.is_correct(selected))
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn all_answered(&self, bank: &QuestionBank) -> bool {
        bank.questions()
            .iter()
            .all(|question| self.answers.contains_key(&question.id()))
    }

    #[must_use]
    pub fn current_question<'a>(&self, bank: &'a QuestionBank) -> Option<&'a Question> {
        bank.question_at(self.current_index)
    }

    #[must_use]
    pub fn progress(&self, bank: &QuestionBank) -> SessionProgress {
        let answered = bank
            .questions()
            .iter()
            .filter(|question| self.answers.contains_key(&question.id()))
            .count();
        SessionProgress {
            total: bank.len(),
            answered,
            remaining: bank.len().saturating_sub(answered),
            is_complete: self.status == QuizStatus::Completed,
        }
    }

    /// Scores derived from the answer map alone, regardless of navigation state.
    #[must_use]
    pub fn scores(&self, bank: &QuestionBank) -> ScoreCard {
        compute_scores(bank, &self.answers)
    }

    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<Duration> {
        elapsed_since(self.started_at, now)
    }

    /// `m:ss` since the start, or a neutral placeholder before `start()`.
    #[must_use]
    pub fn elapsed_display(&self, now: DateTime<Utc>) -> String {
        format_elapsed(self.elapsed(now))
    }
}
