//! The fixed, validated question bank: questions grouped into sections grouped into phases.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use thiserror::Error;

use crate::model::{Phase, PhaseId, Question, QuestionId, Section, SectionId};

const BUILTIN_BANK: &str = include_str!("../data/questions.json");

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Reasons a bank definition is rejected.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankError {
    #[error("invalid bank definition: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("bank has no questions")]
    Empty,

    #[error("duplicate question id {0}")]
    DuplicateQuestion(QuestionId),

    #[error("question ids must be dense from 1; missing {0}")]
    MissingQuestion(QuestionId),

    #[error("duplicate section {0}")]
    DuplicateSection(SectionId),

    #[error("duplicate phase {0}")]
    DuplicatePhase(PhaseId),

    #[error("question {question} references unknown section {section}")]
    UnknownSection {
        question: QuestionId,
        section: SectionId,
    },

    #[error("question {question} lies outside the range of section {section}")]
    OutsideSection {
        question: QuestionId,
        section: SectionId,
    },

    #[error("section {0} has an empty or inverted range")]
    InvalidRange(SectionId),

    #[error("section {section} should start at question {expected}")]
    RangeGap {
        section: SectionId,
        expected: QuestionId,
    },

    #[error("sections cover questions 1..={covered} but the bank has {total}")]
    Coverage { covered: u32, total: u32 },

    #[error("section {section} references unknown phase {phase}")]
    UnknownPhase { section: SectionId, phase: PhaseId },

    #[error("phase {phase} lists unknown section {section}")]
    UnknownPhaseSection { phase: PhaseId, section: SectionId },

    #[error("section {0} must be listed by exactly one phase, its own")]
    PhaseMembership(SectionId),
}

#[derive(Debug, Deserialize)]
struct BankDefinition {
    title: String,
    #[serde(default)]
    subtitle: Option<String>,
    phases: Vec<Phase>,
    sections: Vec<Section>,
    questions: Vec<Question>,
}

//
// ─── BANK ─────────────────────────────────────────────────────────────────────
//

/// Read-only question bank.
///
/// The sequence order of `questions()` is the navigation order. Question ids are
/// dense from 1 but are not assumed to match their index; use [`QuestionBank::index_of`].
#[derive(Debug, Clone)]
pub struct QuestionBank {
    title: String,
    subtitle: Option<String>,
    phases: Vec<Phase>,
    sections: Vec<Section>,
    questions: Vec<Question>,
    index_by_id: HashMap<QuestionId, usize>,
    section_by_id: HashMap<SectionId, usize>,
}

impl QuestionBank {
    /// Build and validate a bank.
    ///
    /// # Errors
    ///
    /// Returns `BankError` if ids are not dense, section ranges do not partition the
    /// id space, or the phase/section membership is inconsistent.
    pub fn new(
        title: impl Into<String>,
        subtitle: Option<String>,
        phases: Vec<Phase>,
        sections: Vec<Section>,
        questions: Vec<Question>,
    ) -> Result<Self, BankError> {
        if questions.is_empty() {
            return Err(BankError::Empty);
        }

        let index_by_id = index_questions(&questions)?;
        let section_by_id = index_sections(&sections)?;
        check_ranges(&sections, questions.len())?;
        check_phases(&phases, &sections)?;

        for question in &questions {
            let section = section_by_id
                .get(question.section())
                .map(|&pos| &sections[pos])
                .ok_or_else(|| BankError::UnknownSection {
                    question: question.id(),
                    section: question.section().clone(),
                })?;
            if !section.contains(question.id()) {
                return Err(BankError::OutsideSection {
                    question: question.id(),
                    section: section.id().clone(),
                });
            }
        }

        Ok(Self {
            title: title.into(),
            subtitle,
            phases,
            sections,
            questions,
            index_by_id,
            section_by_id,
        })
    }

    /// Parse a bank definition from JSON and validate it.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Parse` for malformed JSON, or any validation error from
    /// [`QuestionBank::new`].
    pub fn from_json(json: &str) -> Result<Self, BankError> {
        let def: BankDefinition = serde_json::from_str(json)?;
        Self::new(def.title, def.subtitle, def.phases, def.sections, def.questions)
    }

    /// The bundled 55-question technical assessment.
    ///
    /// # Errors
    ///
    /// Returns `BankError` if the embedded definition fails validation.
    pub fn builtin() -> Result<Self, BankError> {
        Self::from_json(BUILTIN_BANK)
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Number of questions. Always at least one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }

    #[must_use]
    pub fn contains(&self, id: QuestionId) -> bool {
        self.index_by_id.contains_key(&id)
    }

    #[must_use]
    pub fn index_of(&self, id: QuestionId) -> Option<usize> {
        self.index_by_id.get(&id).copied()
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.index_of(id).map(|idx| &self.questions[idx])
    }

    #[must_use]
    pub fn question_at(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.section_by_id.get(id).map(|&pos| &self.sections[pos])
    }

    /// Display name of a section, falling back to the raw code when unknown.
    #[must_use]
    pub fn section_name<'a>(&'a self, id: &'a SectionId) -> &'a str {
        self.section(id).map_or(id.as_str(), Section::name)
    }

    #[must_use]
    pub fn phase(&self, id: PhaseId) -> Option<&Phase> {
        self.phases.iter().find(|phase| phase.id() == id)
    }

    #[must_use]
    pub fn phase_for_section(&self, id: &SectionId) -> Option<&Phase> {
        self.section(id).and_then(|section| self.phase(section.phase()))
    }

    /// Sections of a phase in the phase's listed order.
    pub fn sections_in_phase<'a>(&'a self, phase: &'a Phase) -> impl Iterator<Item = &'a Section> {
        phase.sections().iter().filter_map(move |id| self.section(id))
    }

    /// Questions of a section in navigation order.
    pub fn questions_in_section<'a>(
        &'a self,
        id: &'a SectionId,
    ) -> impl Iterator<Item = &'a Question> {
        self.questions.iter().filter(move |q| q.section() == id)
    }
}

fn index_questions(questions: &[Question]) -> Result<HashMap<QuestionId, usize>, BankError> {
    let mut index = HashMap::with_capacity(questions.len());
    for (pos, question) in questions.iter().enumerate() {
        if index.insert(question.id(), pos).is_some() {
            return Err(BankError::DuplicateQuestion(question.id()));
        }
    }

    let mut ids: Vec<u32> = questions.iter().map(|q| q.id().value()).collect();
    ids.sort_unstable();
    for (pos, id) in ids.iter().enumerate() {
        let expected = u32::try_from(pos + 1).unwrap_or(u32::MAX);
        if *id != expected {
            return Err(BankError::MissingQuestion(QuestionId::new(expected)));
        }
    }
    Ok(index)
}

fn index_sections(sections: &[Section]) -> Result<HashMap<SectionId, usize>, BankError> {
    let mut index = HashMap::with_capacity(sections.len());
    for (pos, section) in sections.iter().enumerate() {
        if index.insert(section.id().clone(), pos).is_some() {
            return Err(BankError::DuplicateSection(section.id().clone()));
        }
    }
    Ok(index)
}

fn check_ranges(sections: &[Section], total: usize) -> Result<(), BankError> {
    let mut ordered: Vec<&Section> = sections.iter().collect();
    ordered.sort_by_key(|section| section.first_question());

    let mut expected = 1_u32;
    for section in ordered {
        if section.is_empty() {
            return Err(BankError::InvalidRange(section.id().clone()));
        }
        if section.first_question().value() != expected {
            return Err(BankError::RangeGap {
                section: section.id().clone(),
                expected: QuestionId::new(expected),
            });
        }
        expected = section.last_question().value().saturating_add(1);
    }

    let covered = expected - 1;
    let total = u32::try_from(total).unwrap_or(u32::MAX);
    if covered != total {
        return Err(BankError::Coverage { covered, total });
    }
    Ok(())
}

fn check_phases(phases: &[Phase], sections: &[Section]) -> Result<(), BankError> {
    let mut seen = HashSet::new();
    for phase in phases {
        if !seen.insert(phase.id()) {
            return Err(BankError::DuplicatePhase(phase.id()));
        }
        for listed in phase.sections() {
            if !sections.iter().any(|s| s.id() == listed) {
                return Err(BankError::UnknownPhaseSection {
                    phase: phase.id(),
                    section: listed.clone(),
                });
            }
        }
    }

    for section in sections {
        if !seen.contains(&section.phase()) {
            return Err(BankError::UnknownPhase {
                section: section.id().clone(),
                phase: section.phase(),
            });
        }
        let listings: Vec<PhaseId> = phases
            .iter()
            .flat_map(|phase| {
                phase
                    .sections()
                    .iter()
                    .filter(|id| *id == section.id())
                    .map(move |_| phase.id())
            })
            .collect();
        if listings != [section.phase()] {
            return Err(BankError::PhaseMembership(section.id().clone()));
        }
    }
    Ok(())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn question(id: u32, section: &str) -> Value {
        json!({
            "id": id,
            "section": section,
            "question": format!("Question {id}?"),
            "options": {"A": "a", "B": "b", "C": "c", "D": "d"},
            "correct_answer": "A",
            "explanation": "because"
        })
    }

    fn bank_json(questions: Vec<Value>, sections: Value, phases: Value) -> String {
        json!({
            "title": "Test",
            "phases": phases,
            "sections": sections,
            "questions": questions,
        })
        .to_string()
    }

    fn two_sections() -> Value {
        json!([
            {"id": "A", "name": "First", "phase": 1, "first_question": 1, "last_question": 2},
            {"id": "B", "name": "Second", "phase": 2, "first_question": 3, "last_question": 3}
        ])
    }

    fn two_phases() -> Value {
        json!([
            {"id": 1, "name": "One", "sections": ["A"]},
            {"id": 2, "name": "Two", "sections": ["B"]}
        ])
    }

    #[test]
    fn builtin_bank_is_valid() {
        let bank = QuestionBank::builtin().unwrap();
        assert_eq!(bank.len(), 55);
        assert_eq!(bank.sections().len(), 5);
        assert_eq!(bank.phases().len(), 2);
        assert_eq!(bank.title(), "Technical Assessment");

        let e = SectionId::new("E");
        assert_eq!(bank.section_name(&e), "System Design & Architecture");
        assert_eq!(bank.phase_for_section(&e).unwrap().name(), "Platform");
        assert_eq!(bank.questions_in_section(&e).count(), 10);
    }

    #[test]
    fn index_map_is_derived_not_assumed() {
        let json = bank_json(
            vec![question(3, "B"), question(1, "A"), question(2, "A")],
            two_sections(),
            two_phases(),
        );
        let bank = QuestionBank::from_json(&json).unwrap();

        assert_eq!(bank.index_of(QuestionId::new(3)), Some(0));
        assert_eq!(bank.index_of(QuestionId::new(1)), Some(1));
        assert_eq!(bank.question_at(2).unwrap().id(), QuestionId::new(2));
        assert_eq!(bank.index_of(QuestionId::new(4)), None);
    }

    #[test]
    fn rejects_gap_in_ids() {
        let json = bank_json(
            vec![question(1, "A"), question(2, "A"), question(4, "B")],
            two_sections(),
            two_phases(),
        );
        let err = QuestionBank::from_json(&json).unwrap_err();
        assert!(matches!(err, BankError::MissingQuestion(id) if id == QuestionId::new(3)));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let json = bank_json(
            vec![question(1, "A"), question(1, "A"), question(3, "B")],
            two_sections(),
            two_phases(),
        );
        let err = QuestionBank::from_json(&json).unwrap_err();
        assert!(matches!(err, BankError::DuplicateQuestion(_)));
    }

    #[test]
    fn rejects_overlapping_sections() {
        let sections = json!([
            {"id": "A", "name": "First", "phase": 1, "first_question": 1, "last_question": 2},
            {"id": "B", "name": "Second", "phase": 2, "first_question": 2, "last_question": 3}
        ]);
        let json = bank_json(
            vec![question(1, "A"), question(2, "A"), question(3, "B")],
            sections,
            two_phases(),
        );
        let err = QuestionBank::from_json(&json).unwrap_err();
        assert!(matches!(err, BankError::RangeGap { .. }));
    }

    #[test]
    fn rejects_sections_not_covering_all_ids() {
        let sections = json!([
            {"id": "A", "name": "First", "phase": 1, "first_question": 1, "last_question": 2}
        ]);
        let phases = json!([{"id": 1, "name": "One", "sections": ["A"]}]);
        let json = bank_json(
            vec![question(1, "A"), question(2, "A"), question(3, "A")],
            sections,
            phases,
        );
        let err = QuestionBank::from_json(&json).unwrap_err();
        assert!(matches!(err, BankError::Coverage { covered: 2, total: 3 }));
    }

    #[test]
    fn rejects_question_outside_its_section() {
        let json = bank_json(
            vec![question(1, "A"), question(2, "B"), question(3, "B")],
            two_sections(),
            two_phases(),
        );
        let err = QuestionBank::from_json(&json).unwrap_err();
        assert!(matches!(err, BankError::OutsideSection { .. }));
    }

    #[test]
    fn rejects_section_listed_by_two_phases() {
        let phases = json!([
            {"id": 1, "name": "One", "sections": ["A", "B"]},
            {"id": 2, "name": "Two", "sections": ["B"]}
        ]);
        let json = bank_json(
            vec![question(1, "A"), question(2, "A"), question(3, "B")],
            two_sections(),
            phases,
        );
        let err = QuestionBank::from_json(&json).unwrap_err();
        assert!(matches!(err, BankError::PhaseMembership(_)));
    }

    #[test]
    fn rejects_empty_and_malformed_banks() {
        let json = bank_json(Vec::new(), json!([]), json!([]));
        assert!(matches!(
            QuestionBank::from_json(&json).unwrap_err(),
            BankError::Empty
        ));
        assert!(matches!(
            QuestionBank::from_json("{not json").unwrap_err(),
            BankError::Parse(_)
        ));
    }
}
