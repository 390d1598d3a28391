use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{QuestionId, SectionId};

/// Chosen option per question id. Absence means unanswered.
pub type AnswerMap = BTreeMap<QuestionId, AnswerOption>;

/// Whether feedback has been shown for a question id.
pub type RevealSet = BTreeMap<QuestionId, bool>;

//
// ─── ANSWER OPTION ────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid answer option: {0:?}")]
pub struct InvalidOption(pub String);

/// One of the four choices offered by every question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnswerOption {
    A,
    B,
    C,
    D,
}

impl AnswerOption {
    /// All options in display order.
    pub const ALL: [AnswerOption; 4] = [Self::A, Self::B, Self::C, Self::D];

    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        }
    }
}

impl fmt::Display for AnswerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl TryFrom<char> for AnswerOption {
    type Error = InvalidOption;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value.to_ascii_uppercase() {
            'A' => Ok(Self::A),
            'B' => Ok(Self::B),
            'C' => Ok(Self::C),
            'D' => Ok(Self::D),
            _ => Err(InvalidOption(value.to_string())),
        }
    }
}

impl FromStr for AnswerOption {
    type Err = InvalidOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::try_from(c).map_err(|_| InvalidOption(s.to_string())),
            _ => Err(InvalidOption(s.to_string())),
        }
    }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// Option texts keyed by letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOptions {
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "C")]
    pub c: String,
    #[serde(rename = "D")]
    pub d: String,
}

impl QuestionOptions {
    #[must_use]
    pub fn get(&self, option: AnswerOption) -> &str {
        match option {
            AnswerOption::A => &self.a,
            AnswerOption::B => &self.b,
            AnswerOption::C => &self.c,
            AnswerOption::D => &self.d,
        }
    }
}

/// A single multiple-choice question. Defined with the bank and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    section: SectionId,
    #[serde(rename = "question")]
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    options: QuestionOptions,
    correct_answer: AnswerOption,
    explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    study_tip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    example: Option<String>,
}

impl Question {
    #[must_use]
    pub fn new(
        id: QuestionId,
        section: SectionId,
        text: impl Into<String>,
        options: QuestionOptions,
        correct_answer: AnswerOption,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            id,
            section,
            text: text.into(),
            code: None,
            options,
            correct_answer,
            explanation: explanation.into(),
            study_tip: None,
            example: None,
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_study_tip(mut self, tip: impl Into<String>) -> Self {
        self.study_tip = Some(tip.into());
        self
    }

    #[must_use]
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn section(&self) -> &SectionId {
        &self.section
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    #[must_use]
    pub fn options(&self) -> &QuestionOptions {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> AnswerOption {
        self.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn study_tip(&self) -> Option<&str> {
        self.study_tip.as_deref()
    }

    /// Real-world illustration shown alongside the explanation.
    #[must_use]
    pub fn example(&self) -> Option<&str> {
        self.example.as_deref()
    }

    #[must_use]
    pub fn is_correct(&self, option: AnswerOption) -> bool {
        self.correct_answer == option
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
