mod ids;
mod question;
mod section;

pub use ids::{ParseIdError, PhaseId, QuestionId, SectionId};
pub use question::{AnswerMap, AnswerOption, InvalidOption, Question, QuestionOptions, RevealSet};
pub use section::{Phase, Section};
