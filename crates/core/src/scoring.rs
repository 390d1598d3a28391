//! Score aggregation shared by the in-session results view and the outbound report.

use std::collections::HashMap;

use crate::bank::QuestionBank;
use crate::model::{AnswerMap, AnswerOption, PhaseId, QuestionId, SectionId};

//
// ─── TALLY ────────────────────────────────────────────────────────────────────
//

/// Correct/total counter for a section, a phase or the whole bank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub correct: u32,
    pub total: u32,
}

impl Tally {
    /// `round(100 * correct / total)`, halves rounding up; 0 when `total` is 0.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        percentage(self.correct, self.total)
    }

    #[must_use]
    pub fn band(&self) -> PerformanceBand {
        PerformanceBand::from_percentage(self.percentage())
    }

    fn add(&mut self, other: Tally) {
        self.correct = self.correct.saturating_add(other.correct);
        self.total = self.total.saturating_add(other.total);
    }
}

/// Integer percentage with half-up rounding.
#[must_use]
pub fn percentage(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let correct = u64::from(correct);
    let total = u64::from(total);
    let rounded = (200 * correct + total) / (2 * total);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

//
// ─── BANDS AND TIERS ──────────────────────────────────────────────────────────
//

/// Three-level banding used for every percentage (section, phase and overall).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PerformanceBand {
    High,
    Medium,
    Low,
}

impl PerformanceBand {
    #[must_use]
    pub fn from_percentage(percent: u32) -> Self {
        match percent {
            80.. => Self::High,
            60..=79 => Self::Medium,
            _ => Self::Low,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Coarse proficiency classification of the overall percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProficiencyTier {
    Ic4,
    Ic3,
    Ic2,
    Ic1,
}

impl ProficiencyTier {
    #[must_use]
    pub fn from_percentage(percent: u32) -> Self {
        match percent {
            85.. => Self::Ic4,
            65..=84 => Self::Ic3,
            35..=64 => Self::Ic2,
            _ => Self::Ic1,
        }
    }

    #[must_use]
    pub fn level(self) -> &'static str {
        match self {
            Self::Ic4 => "IC4",
            Self::Ic3 => "IC3",
            Self::Ic2 => "IC2",
            Self::Ic1 => "IC1",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Ic4 => "Staff Engineer",
            Self::Ic3 => "Senior Engineer",
            Self::Ic2 => "Mid-Level Engineer",
            Self::Ic1 => "Junior Engineer",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Ic4 => "Consistent command of every phase, ready to lead design discussions.",
            Self::Ic3 => "Solid fundamentals with a few gaps worth reviewing.",
            Self::Ic2 => "Working knowledge; several sections need focused study.",
            Self::Ic1 => "Foundational topics need another pass through the study guide.",
        }
    }
}

/// Headline shown with the final results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultVerdict {
    Excellent,
    Good,
    Fair,
    NeedsStudy,
}

impl ResultVerdict {
    #[must_use]
    pub fn from_percentage(percent: u32) -> Self {
        match percent {
            90.. => Self::Excellent,
            80..=89 => Self::Good,
            60..=79 => Self::Fair,
            _ => Self::NeedsStudy,
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent - You're Well Prepared!",
            Self::Good => "Good - Review the questions you missed",
            Self::Fair => "Fair - Focus on weak sections in the study guide",
            Self::NeedsStudy => {
                "More study needed - Review the Essential Study Guide thoroughly"
            }
        }
    }
}

//
// ─── SCORE CARD ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionScore {
    pub section: SectionId,
    pub tally: Tally,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseScore {
    pub phase: PhaseId,
    pub tally: Tally,
}

/// Per-section, per-phase and overall correctness counts for an answer map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreCard {
    sections: Vec<SectionScore>,
    phases: Vec<PhaseScore>,
    total: Tally,
}

impl ScoreCard {
    /// Section scores in bank order.
    #[must_use]
    pub fn sections(&self) -> &[SectionScore] {
        &self.sections
    }

    #[must_use]
    pub fn section(&self, id: &SectionId) -> Option<Tally> {
        self.sections
            .iter()
            .find(|score| &score.section == id)
            .map(|score| score.tally)
    }

    /// Phase scores in bank order, each the sum of its member sections.
    #[must_use]
    pub fn phases(&self) -> &[PhaseScore] {
        &self.phases
    }

    #[must_use]
    pub fn phase(&self, id: PhaseId) -> Option<Tally> {
        self.phases
            .iter()
            .find(|score| score.phase == id)
            .map(|score| score.tally)
    }

    #[must_use]
    pub fn total(&self) -> Tally {
        self.total
    }

    #[must_use]
    pub fn total_correct(&self) -> u32 {
        self.total.correct
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total.total
    }

    #[must_use]
    pub fn percentage(&self) -> u32 {
        self.total.percentage()
    }

    #[must_use]
    pub fn band(&self) -> PerformanceBand {
        self.total.band()
    }

    #[must_use]
    pub fn tier(&self) -> ProficiencyTier {
        ProficiencyTier::from_percentage(self.percentage())
    }

    #[must_use]
    pub fn verdict(&self) -> ResultVerdict {
        ResultVerdict::from_percentage(self.percentage())
    }
}

/// Score an answer map against the bank.
///
/// Safe on partial and empty maps; answers for ids outside the bank are ignored.
#[must_use]
pub fn compute_scores(bank: &QuestionBank, answers: &AnswerMap) -> ScoreCard {
    let mut sections: Vec<SectionScore> = bank
        .sections()
        .iter()
        .map(|section| SectionScore {
            section: section.id().clone(),
            tally: Tally::default(),
        })
        .collect();
    let position: HashMap<&SectionId, usize> = bank
        .sections()
        .iter()
        .enumerate()
        .map(|(pos, section)| (section.id(), pos))
        .collect();

    let mut total = Tally::default();
    for question in bank.questions() {
        let correct = answers.get(&question.id()) == Some(&question.correct_answer());
        let hit = Tally {
            correct: u32::from(correct),
            total: 1,
        };
        if let Some(&pos) = position.get(question.section()) {
            sections[pos].tally.add(hit);
        }
        total.add(hit);
    }

    let phases = bank
        .phases()
        .iter()
        .map(|phase| {
            let mut tally = Tally::default();
            for score in &sections {
                if phase.sections().contains(&score.section) {
                    tally.add(score.tally);
                }
            }
            PhaseScore {
                phase: phase.id(),
                tally,
            }
        })
        .collect();

    ScoreCard {
        sections,
        phases,
        total,
    }
}

//
// ─── PER-QUESTION REVIEW ──────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionOutcome {
    Correct,
    Incorrect,
    Unanswered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview {
    pub id: QuestionId,
    pub selected: Option<AnswerOption>,
    pub correct: AnswerOption,
    pub outcome: QuestionOutcome,
}

/// One review entry per question, in navigation order.
#[must_use]
pub fn review_answers(bank: &QuestionBank, answers: &AnswerMap) -> Vec<QuestionReview> {
    bank.questions()
        .iter()
        .map(|question| {
            let selected = answers.get(&question.id()).copied();
            let outcome = match selected {
                None => QuestionOutcome::Unanswered,
                Some(option) if question.is_correct(option) => QuestionOutcome::Correct,
                Some(_) => QuestionOutcome::Incorrect,
            };
            QuestionReview {
                id: question.id(),
                selected,
                correct: question.correct_answer(),
                outcome,
            }
        })
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
