use std::sync::Arc;

use assessment_core::model::{AnswerOption, Question, QuestionId};
use assessment_core::{
    Clock, QuestionBank, Quiz, QuizStatus, ScoreCard, SessionProgress, SessionState,
};

use tokio::task::JoinHandle;

use crate::error::{QuizServiceError, ReportError};
use crate::persistence::SnapshotStore;
use crate::reporting::{ReportReceipt, ReportRequest, ReportService};

/// Result of one service step.
#[derive(Debug)]
pub struct StepOutcome {
    /// State after the transition.
    pub state: SessionState,
    /// Set only on the step that first completed the quiz while a reporter is
    /// configured.
    pub report: Option<PendingReport>,
}

/// Report delivery running in the background after completion.
///
/// Dropping it detaches the task; delivery still runs to the end.
#[derive(Debug)]
pub struct PendingReport {
    handle: JoinHandle<Result<ReportReceipt, ReportError>>,
}

impl PendingReport {
    fn spawn(reporter: Arc<ReportService>, request: ReportRequest) -> Self {
        let handle = tokio::spawn(async move { reporter.submit(request).await });
        Self { handle }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the delivery result.
    ///
    /// # Errors
    ///
    /// Returns the report error, or `ReportError::Delivery` if the task
    /// panicked or was cancelled.
    pub async fn wait(self) -> Result<ReportReceipt, ReportError> {
        self.handle
            .await
            .map_err(|err| ReportError::Delivery(err.to_string()))?
    }
}

/// Drives a single quiz session: transitions in memory, best-effort snapshots,
/// and a one-shot report on completion.
pub struct QuizService {
    quiz: Quiz,
    state: SessionState,
    store: SnapshotStore,
    clock: Clock,
    reporter: Option<Arc<ReportService>>,
    report_sent: bool,
}

impl QuizService {
    /// Resume from the stored snapshot, or start empty when there is none.
    ///
    /// A session restored as completed counts as already reported. A started
    /// snapshot without a start time is stamped with the current time and
    /// saved back.
    pub async fn resume(quiz: Quiz, store: SnapshotStore, clock: Clock) -> Self {
        let state = match store.load().await {
            Some(saved) => {
                let missing_start = saved.started_at().is_none();
                let state = quiz.restore(saved, clock.now());
                if missing_start && state.started_at().is_some() {
                    tracing::debug!("resumed session had no start time; stamped now");
                    store.save(&state).await;
                }
                state
            }
            None => SessionState::new(),
        };
        tracing::debug!(status = %state.status(), index = state.current_index(), "quiz session resumed");
        let report_sent = state.status() == QuizStatus::Completed;
        Self {
            quiz,
            state,
            store,
            clock,
            reporter: None,
            report_sent,
        }
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<ReportService>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    //
    // ─── READS ────────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        self.quiz.bank()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.state.current_question(self.quiz.bank())
    }

    #[must_use]
    pub fn scores(&self) -> ScoreCard {
        self.state.scores(self.quiz.bank())
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        self.state.progress(self.quiz.bank())
    }

    #[must_use]
    pub fn elapsed_display(&self) -> String {
        self.state.elapsed_display(self.clock.now())
    }

    #[must_use]
    pub fn report_sent(&self) -> bool {
        self.report_sent
    }

    //
    // ─── TRANSITIONS ──────────────────────────────────────────────────────────
    //

    pub async fn start(&mut self) -> StepOutcome {
        let next = self.quiz.start(&self.state, self.clock.now());
        self.apply(next, "start").await
    }

    pub async fn select_answer(&mut self, id: QuestionId, option: AnswerOption) -> StepOutcome {
        let next = self.quiz.select_answer(&self.state, id, option);
        self.apply(next, "select_answer").await
    }

    pub async fn answer_current(&mut self, option: AnswerOption) -> StepOutcome {
        let next = self.quiz.select_current(&self.state, option);
        self.apply(next, "answer_current").await
    }

    pub async fn next(&mut self) -> StepOutcome {
        let next = self.quiz.next(&self.state);
        self.apply(next, "next").await
    }

    pub async fn previous(&mut self) -> StepOutcome {
        let next = self.quiz.previous(&self.state);
        self.apply(next, "previous").await
    }

    pub async fn jump_to(&mut self, index: usize) -> StepOutcome {
        let next = self.quiz.jump_to(&self.state, index);
        self.apply(next, "jump_to").await
    }

    pub async fn finish_early(&mut self) -> StepOutcome {
        let next = self.quiz.finish_early(&self.state);
        self.apply(next, "finish_early").await
    }

    /// Reset to the initial state and drop the stored snapshot.
    pub async fn restart(&mut self) -> StepOutcome {
        self.state = self.quiz.restart(&self.state);
        self.report_sent = false;
        self.store.clear().await;
        tracing::debug!("quiz session restarted");
        StepOutcome {
            state: self.state.clone(),
            report: None,
        }
    }

    /// Submit the report again for a completed session, e.g. after a failed
    /// delivery.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::NotCompleted` before completion,
    /// `QuizServiceError::NoReporter` without a reporter, or the report error.
    pub async fn resend_report(&mut self) -> Result<ReportReceipt, QuizServiceError> {
        if self.state.status() != QuizStatus::Completed {
            return Err(QuizServiceError::NotCompleted);
        }
        let reporter = self.reporter.clone().ok_or(QuizServiceError::NoReporter)?;
        let receipt = reporter
            .submit(ReportRequest::from_state(&self.state))
            .await?;
        self.report_sent = true;
        Ok(receipt)
    }

    async fn apply(&mut self, next: SessionState, action: &'static str) -> StepOutcome {
        let entered_completed = self.state.status() != QuizStatus::Completed
            && next.status() == QuizStatus::Completed;

        if next != self.state {
            self.state = next;
            tracing::debug!(
                action,
                status = %self.state.status(),
                index = self.state.current_index(),
                answered = self.state.answered_count(),
                "quiz transition"
            );
            self.store.save(&self.state).await;
        }

        let report = if entered_completed {
            let scores = self.scores();
            tracing::info!(
                correct = scores.total_correct(),
                total = scores.total_questions(),
                percentage = scores.percentage(),
                "quiz completed"
            );
            self.submit_once()
        } else {
            None
        };

        StepOutcome {
            state: self.state.clone(),
            report,
        }
    }

    /// Hand the report off to a background task so the completing step
    /// returns without waiting on delivery.
    fn submit_once(&mut self) -> Option<PendingReport> {
        if self.report_sent {
            return None;
        }
        let reporter = self.reporter.clone()?;
        self.report_sent = true;
        Some(PendingReport::spawn(
            reporter,
            ReportRequest::from_state(&self.state),
        ))
    }
}
