use serde::{Deserialize, Serialize};

use crate::model::ids::{PhaseId, QuestionId, SectionId};

/// A named, contiguous range of question ids belonging to one phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    id: SectionId,
    name: String,
    phase: PhaseId,
    first_question: QuestionId,
    last_question: QuestionId,
}

impl Section {
    #[must_use]
    pub fn new(
        id: SectionId,
        name: impl Into<String>,
        phase: PhaseId,
        first_question: QuestionId,
        last_question: QuestionId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            phase,
            first_question,
            last_question,
        }
    }

    #[must_use]
    pub fn id(&self) -> &SectionId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn phase(&self) -> PhaseId {
        self.phase
    }

    #[must_use]
    pub fn first_question(&self) -> QuestionId {
        self.first_question
    }

    #[must_use]
    pub fn last_question(&self) -> QuestionId {
        self.last_question
    }

    /// Returns true if `id` falls inside this section's inclusive range.
    #[must_use]
    pub fn contains(&self, id: QuestionId) -> bool {
        self.first_question <= id && id <= self.last_question
    }

    /// Number of ids covered by the range; zero for an inverted range.
    #[must_use]
    pub fn len(&self) -> usize {
        let first = self.first_question.value();
        let last = self.last_question.value();
        if last < first {
            0
        } else {
            (last - first) as usize + 1
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Top-level grouping of sections, e.g. "DSA & Design Patterns".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    id: PhaseId,
    name: String,
    sections: Vec<SectionId>,
}

impl Phase {
    #[must_use]
    pub fn new(id: PhaseId, name: impl Into<String>, sections: Vec<SectionId>) -> Self {
        Self {
            id,
            name: name.into(),
            sections,
        }
    }

    #[must_use]
    pub fn id(&self) -> PhaseId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member sections in display order.
    #[must_use]
    pub fn sections(&self) -> &[SectionId] {
        &self.sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_range_membership() {
        let section = Section::new(
            SectionId::new("B"),
            "Data Structures",
            PhaseId::new(1),
            QuestionId::new(11),
            QuestionId::new(20),
        );
        assert_eq!(section.len(), 10);
        assert!(section.contains(QuestionId::new(11)));
        assert!(section.contains(QuestionId::new(20)));
        assert!(!section.contains(QuestionId::new(10)));
        assert!(!section.contains(QuestionId::new(21)));
    }

    #[test]
    fn inverted_range_is_empty() {
        let section = Section::new(
            SectionId::new("X"),
            "Broken",
            PhaseId::new(1),
            QuestionId::new(5),
            QuestionId::new(4),
        );
        assert!(section.is_empty());
    }
}
