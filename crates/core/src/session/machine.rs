use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{QuizStatus, SessionState};
use crate::bank::QuestionBank;
use crate::model::{AnswerMap, AnswerOption, QuestionId, RevealSet};

/// Progression state machine over a fixed bank.
///
/// Each transition takes the current snapshot and returns the next one. Calls that
/// are not allowed from the current state return an unchanged copy instead of an
/// error, so callers can wire them straight to UI events.
#[derive(Debug, Clone)]
pub struct Quiz {
    bank: Arc<QuestionBank>,
}

impl Quiz {
    #[must_use]
    pub fn new(bank: Arc<QuestionBank>) -> Self {
        Self { bank }
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn shared_bank(&self) -> Arc<QuestionBank> {
        Arc::clone(&self.bank)
    }

    /// `NotStarted -> InProgress`, stamping the start time. No-op otherwise.
    #[must_use]
    pub fn start(&self, state: &SessionState, now: DateTime<Utc>) -> SessionState {
        if state.status != QuizStatus::NotStarted {
            return state.clone();
        }
        SessionState {
            status: QuizStatus::InProgress,
            started_at: Some(now),
            ..SessionState::default()
        }
    }

    /// Record an answer and reveal it in one step.
    ///
    /// Ignored unless in progress, for ids outside the bank, and for questions
    /// already revealed (answers are locked once shown).
    #[must_use]
    pub fn select_answer(
        &self,
        state: &SessionState,
        id: QuestionId,
        option: AnswerOption,
    ) -> SessionState {
        if state.status != QuizStatus::InProgress
            || !self.bank.contains(id)
            || state.is_revealed(id)
        {
            return state.clone();
        }
        let mut next = state.clone();
        next.answers.insert(id, option);
        next.revealed.insert(id, true);
        next
    }

    /// Answer whichever question the index points at.
    #[must_use]
    pub fn select_current(&self, state: &SessionState, option: AnswerOption) -> SessionState {
        match state.current_question(&self.bank) {
            Some(question) => self.select_answer(state, question.id(), option),
            None => state.clone(),
        }
    }

    /// Advance one question, or complete the quiz from the last one.
    #[must_use]
    pub fn next(&self, state: &SessionState) -> SessionState {
        if state.status != QuizStatus::InProgress {
            return state.clone();
        }
        let mut next = state.clone();
        if state.current_index < self.bank.last_index() {
            next.current_index += 1;
        } else {
            next.completed = true;
            next.status = QuizStatus::Completed;
        }
        next
    }

    /// Step back one question; stays at 0.
    #[must_use]
    pub fn previous(&self, state: &SessionState) -> SessionState {
        if state.status != QuizStatus::InProgress || state.current_index == 0 {
            return state.clone();
        }
        let mut next = state.clone();
        next.current_index -= 1;
        next
    }

    /// Jump to any valid index.
    ///
    /// From the results view this re-enters review: the completed flag clears and
    /// the status returns to in-progress, so `next()` from the last question or
    /// `finish_early()` shows the results again. Out-of-range indices are ignored.
    #[must_use]
    pub fn jump_to(&self, state: &SessionState, index: usize) -> SessionState {
        if state.status == QuizStatus::NotStarted || index >= self.bank.len() {
            return state.clone();
        }
        let mut next = state.clone();
        next.current_index = index;
        next.completed = false;
        next.status = QuizStatus::InProgress;
        next
    }

    /// Show the results before reaching the last question. Requires every question answered.
    #[must_use]
    pub fn finish_early(&self, state: &SessionState) -> SessionState {
        if state.status != QuizStatus::InProgress || !state.all_answered(&self.bank) {
            return state.clone();
        }
        let mut next = state.clone();
        next.completed = true;
        next.status = QuizStatus::Completed;
        next
    }

    /// Back to the initial empty state, from anywhere.
    #[must_use]
    pub fn restart(&self, _state: &SessionState) -> SessionState {
        SessionState::default()
    }

    /// Bring an externally supplied state (e.g. a persisted snapshot) in line
    /// with the session invariants.
    ///
    /// - answers for ids outside the bank are dropped
    /// - every answered question is revealed and nothing else is
    /// - the index is clamped to the bank
    /// - a not-started status discards everything else
    /// - the completed flag and the completed status always agree; a completed
    ///   status without the flag is a review in progress
    /// - a started session without a start time is stamped with `now`, since
    ///   `start` will never set it again
    #[must_use]
    pub fn restore(&self, state: SessionState, now: DateTime<Utc>) -> SessionState {
        let mut status = state.status;
        if state.completed {
            status = QuizStatus::Completed;
        } else if status == QuizStatus::Completed {
            status = QuizStatus::InProgress;
        }
        if status == QuizStatus::NotStarted {
            return SessionState::default();
        }

        let answers: AnswerMap = state
            .answers
            .into_iter()
            .filter(|(id, _)| self.bank.contains(*id))
            .collect();
        let revealed: RevealSet = answers.keys().map(|id| (*id, true)).collect();

        SessionState {
            current_index: state.current_index.min(self.bank.last_index()),
            answers,
            revealed,
            completed: status == QuizStatus::Completed,
            status,
            started_at: state.started_at.or(Some(now)),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use serde_json::json;

    /// Two questions: Q1 correct "C", Q2 correct "B".
    fn two_question_quiz() -> Quiz {
        let question = |id: u32, correct: &str| {
            json!({
                "id": id,
                "section": "A",
                "question": format!("Question {id}?"),
                "options": {"A": "a", "B": "b", "C": "c", "D": "d"},
                "correct_answer": correct,
                "explanation": "because"
            })
        };
        let json = json!({
            "title": "Pair",
            "phases": [{"id": 1, "name": "Only", "sections": ["A"]}],
            "sections": [
                {"id": "A", "name": "Basics", "phase": 1, "first_question": 1, "last_question": 2}
            ],
            "questions": [question(1, "C"), question(2, "B")],
        });
        Quiz::new(Arc::new(QuestionBank::from_json(&json.to_string()).unwrap()))
    }

    fn builtin_quiz() -> Quiz {
        Quiz::new(Arc::new(QuestionBank::builtin().unwrap()))
    }

    fn assert_reveal_matches_answers(state: &SessionState) {
        let answered: Vec<_> = state.answers().keys().copied().collect();
        let revealed: Vec<_> = state
            .revealed()
            .iter()
            .filter(|(_, shown)| **shown)
            .map(|(id, _)| *id)
            .collect();
        assert_eq!(answered, revealed);
        assert_eq!(state.revealed().len(), state.answers().len());
    }

    #[test]
    fn two_question_walkthrough() {
        let quiz = two_question_quiz();
        let q1 = QuestionId::new(1);
        let q2 = QuestionId::new(2);

        let state = quiz.start(&SessionState::new(), fixed_now());
        assert_eq!(state.status(), QuizStatus::InProgress);
        assert_eq!(state.started_at(), Some(fixed_now()));

        let state = quiz.select_answer(&state, q1, AnswerOption::C);
        assert!(state.is_revealed(q1));
        assert_eq!(state.is_correct(quiz.bank(), q1), Some(true));

        let state = quiz.next(&state);
        assert_eq!(state.current_index(), 1);

        let state = quiz.select_current(&state, AnswerOption::A);
        assert_eq!(state.is_correct(quiz.bank(), q2), Some(false));

        let state = quiz.next(&state);
        assert_eq!(state.status(), QuizStatus::Completed);
        assert!(state.is_completed());
        let scores = state.scores(quiz.bank());
        assert_eq!(scores.total_correct(), 1);
        assert_eq!(scores.percentage(), 50);
    }

    #[test]
    fn answering_twice_keeps_first_answer() {
        let quiz = two_question_quiz();
        let q1 = QuestionId::new(1);
        let started = quiz.start(&SessionState::new(), fixed_now());

        let once = quiz.select_answer(&started, q1, AnswerOption::A);
        let twice = quiz.select_answer(&once, q1, AnswerOption::C);
        assert_eq!(once, twice);
        assert_eq!(twice.selected_answer(q1), Some(AnswerOption::A));
    }

    #[test]
    fn transitions_do_not_mutate_their_input() {
        let quiz = two_question_quiz();
        let started = quiz.start(&SessionState::new(), fixed_now());
        let before = started.clone();

        let _ = quiz.select_answer(&started, QuestionId::new(1), AnswerOption::B);
        let _ = quiz.next(&started);
        assert_eq!(started, before);
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let quiz = two_question_quiz();
        let state = quiz.start(&SessionState::new(), fixed_now());

        let state = quiz.previous(&state);
        assert_eq!(state.current_index(), 0);

        let state = quiz.next(&state);
        assert_eq!(state.current_index(), 1);
        let state = quiz.next(&state);
        assert_eq!(state.current_index(), 1);
        assert_eq!(state.status(), QuizStatus::Completed);

        let unchanged = quiz.jump_to(&state, 2);
        assert_eq!(unchanged, state);
    }

    #[test]
    fn actions_before_start_are_ignored() {
        let quiz = two_question_quiz();
        let fresh = SessionState::new();

        assert_eq!(quiz.select_answer(&fresh, QuestionId::new(1), AnswerOption::C), fresh);
        assert_eq!(quiz.next(&fresh), fresh);
        assert_eq!(quiz.jump_to(&fresh, 1), fresh);
        assert_eq!(quiz.finish_early(&fresh), fresh);
    }

    #[test]
    fn start_is_a_no_op_once_started() {
        let quiz = two_question_quiz();
        let started = quiz.start(&SessionState::new(), fixed_now());
        let answered = quiz.select_answer(&started, QuestionId::new(1), AnswerOption::C);

        let later = fixed_now() + chrono::Duration::minutes(5);
        let restarted = quiz.start(&answered, later);
        assert_eq!(restarted, answered);
        assert_eq!(restarted.started_at(), Some(fixed_now()));
    }

    #[test]
    fn unknown_question_ids_are_ignored() {
        let quiz = two_question_quiz();
        let started = quiz.start(&SessionState::new(), fixed_now());
        let state = quiz.select_answer(&started, QuestionId::new(3), AnswerOption::A);
        assert_eq!(state, started);
    }

    #[test]
    fn finish_early_requires_every_answer() {
        let quiz = two_question_quiz();
        let state = quiz.start(&SessionState::new(), fixed_now());
        let state = quiz.select_answer(&state, QuestionId::new(2), AnswerOption::B);

        let still = quiz.finish_early(&state);
        assert_eq!(still.status(), QuizStatus::InProgress);

        let state = quiz.select_answer(&state, QuestionId::new(1), AnswerOption::D);
        let done = quiz.finish_early(&state);
        assert_eq!(done.status(), QuizStatus::Completed);
        assert!(done.is_completed());
        assert_eq!(done.current_index(), 0);
    }

    #[test]
    fn reviewing_from_results_preserves_recorded_answers() {
        let quiz = builtin_quiz();
        let mut state = quiz.start(&SessionState::new(), fixed_now());
        for _ in 0..quiz.bank().len() {
            state = quiz.select_current(&state, AnswerOption::B);
            state = quiz.next(&state);
        }
        assert_eq!(state.status(), QuizStatus::Completed);
        let scores_before = state.scores(quiz.bank());

        let reviewing = quiz.jump_to(&state, 4);
        assert_eq!(reviewing.current_index(), 4);
        assert!(!reviewing.is_completed());
        assert_eq!(reviewing.status(), QuizStatus::InProgress);

        let id = reviewing.current_question(quiz.bank()).unwrap().id();
        assert_eq!(reviewing.selected_answer(id), Some(AnswerOption::B));
        assert!(reviewing.is_revealed(id));
        assert_eq!(reviewing.answers(), state.answers());
        assert_eq!(reviewing.scores(quiz.bank()), scores_before);

        let locked = quiz.select_current(&reviewing, AnswerOption::C);
        assert_eq!(locked.selected_answer(id), Some(AnswerOption::B));

        let back = quiz.finish_early(&reviewing);
        assert_eq!(back.status(), QuizStatus::Completed);
    }

    #[test]
    fn reveal_set_tracks_answers_through_any_sequence() {
        let quiz = builtin_quiz();
        let mut state = quiz.start(&SessionState::new(), fixed_now());
        let options = AnswerOption::ALL;

        for step in 0..200_usize {
            state = match step % 7 {
                0 | 3 => quiz.select_current(&state, options[step % 4]),
                1 => quiz.next(&state),
                2 => quiz.previous(&state),
                4 => quiz.jump_to(&state, (step * 13) % 60),
                5 => {
                    let id = QuestionId::new(u32::try_from(step % 58).unwrap());
                    quiz.select_answer(&state, id, options[(step / 7) % 4])
                }
                _ => quiz.finish_early(&state),
            };
            assert_reveal_matches_answers(&state);
            assert!(state.current_index() < quiz.bank().len());
            if state.is_completed() {
                assert_eq!(state.status(), QuizStatus::Completed);
            }
        }
    }

    #[test]
    fn restart_returns_to_initial_state() {
        let quiz = two_question_quiz();
        let state = quiz.start(&SessionState::new(), fixed_now());
        let state = quiz.select_answer(&state, QuestionId::new(1), AnswerOption::C);
        let state = quiz.next(&quiz.next(&state));

        let reset = quiz.restart(&state);
        assert_eq!(reset, SessionState::new());
    }

    #[test]
    fn restore_repairs_inconsistent_snapshots() {
        let quiz = two_question_quiz();
        let mut answers = AnswerMap::new();
        answers.insert(QuestionId::new(1), AnswerOption::C);
        answers.insert(QuestionId::new(9), AnswerOption::A);
        let mut revealed = RevealSet::new();
        revealed.insert(QuestionId::new(2), true);

        let raw = SessionState::from_parts(
            7,
            answers,
            revealed,
            true,
            QuizStatus::InProgress,
            Some(fixed_now()),
        );
        let state = quiz.restore(raw, fixed_now());

        assert_eq!(state.current_index(), 1);
        assert_eq!(state.status(), QuizStatus::Completed);
        assert_eq!(state.answers().len(), 1);
        assert!(state.is_revealed(QuestionId::new(1)));
        assert!(!state.is_revealed(QuestionId::new(2)));
        assert_reveal_matches_answers(&state);
    }

    #[test]
    fn restore_of_not_started_discards_leftovers() {
        let quiz = two_question_quiz();
        let mut answers = AnswerMap::new();
        answers.insert(QuestionId::new(1), AnswerOption::C);
        let raw = SessionState::from_parts(
            1,
            answers,
            RevealSet::new(),
            false,
            QuizStatus::NotStarted,
            None,
        );
        assert_eq!(quiz.restore(raw, fixed_now()), SessionState::new());
    }

    #[test]
    fn restore_treats_completed_status_without_flag_as_review() {
        let quiz = two_question_quiz();
        let raw = SessionState::from_parts(
            0,
            AnswerMap::new(),
            RevealSet::new(),
            false,
            QuizStatus::Completed,
            Some(fixed_now()),
        );
        let state = quiz.restore(raw, fixed_now());
        assert_eq!(state.status(), QuizStatus::InProgress);
        assert!(!state.is_completed());
    }

    #[test]
    fn restore_stamps_missing_start_time() {
        let quiz = two_question_quiz();
        let now = fixed_now() + chrono::Duration::seconds(30);
        let raw = SessionState::from_parts(
            1,
            AnswerMap::new(),
            RevealSet::new(),
            false,
            QuizStatus::InProgress,
            None,
        );
        let state = quiz.restore(raw, now);
        assert_eq!(state.started_at(), Some(now));
        assert_eq!(state.elapsed_display(now), "0:00");

        let kept = quiz.restore(state.clone(), now + chrono::Duration::seconds(65));
        assert_eq!(kept.started_at(), Some(now));
    }
}
