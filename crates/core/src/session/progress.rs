use crate::scoring::percentage;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

impl SessionProgress {
    /// Share of questions answered, rounded to a whole percent.
    #[must_use]
    pub fn percent_answered(&self) -> u32 {
        let answered = u32::try_from(self.answered).unwrap_or(u32::MAX);
        let total = u32::try_from(self.total).unwrap_or(u32::MAX);
        percentage(answered, total)
    }
}
