#![forbid(unsafe_code)]

pub mod bank;
pub mod error;
pub mod model;
pub mod scoring;
pub mod session;
pub mod time;

pub use bank::{BankError, QuestionBank};
pub use error::Error;
pub use scoring::{ScoreCard, compute_scores};
pub use session::{Quiz, QuizStatus, SessionProgress, SessionState};
pub use time::Clock;
