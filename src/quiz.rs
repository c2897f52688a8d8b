// src/quiz.rs

use crate::clock::{Clock, SystemClock};
use crate::error::EngineError;
use crate::models::{AnswerRecord, Question, QuizResult};
use crate::scoring;
use log::{debug, info};
use std::fmt;

/// Where a running quiz currently sits.
///
/// The machine only ever moves forward: Presenting(i) -> Feedback(i) ->
/// Presenting(i+1) ... -> Completed. A past question is never re-presented.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizState {
    Presenting { index: usize },
    Feedback { index: usize, correct: bool, points: i64 },
    Completed,
}

impl fmt::Display for QuizState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizState::Presenting { index } => write!(f, "presenting({index})"),
            QuizState::Feedback { index, .. } => write!(f, "feedback({index})"),
            QuizState::Completed => write!(f, "completed"),
        }
    }
}

/// State machine driving one quiz, a question at a time.
pub struct QuizFlow<C: Clock = SystemClock> {
    questions: Vec<Question>,
    clock: C,
    state: QuizState,
    records: Vec<AnswerRecord>,
    presented_at_ms: i64,
    result: Option<QuizResult>,
}

impl QuizFlow<SystemClock> {
    pub fn new(questions: Vec<Question>) -> Result<Self, EngineError> {
        QuizFlow::with_clock(questions, SystemClock)
    }
}

impl<C: Clock> QuizFlow<C> {
    pub fn with_clock(questions: Vec<Question>, clock: C) -> Result<Self, EngineError> {
        if questions.is_empty() {
            return Err(EngineError::EmptyQuiz);
        }
        let presented_at_ms = clock.now().timestamp_millis();
        info!("[Quiz] Starting quiz with {} questions", questions.len());
        Ok(QuizFlow {
            questions,
            clock,
            state: QuizState::Presenting { index: 0 },
            records: Vec::new(),
            presented_at_ms,
            result: None,
        })
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    /// The question currently on screen, if the quiz is still running.
    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            QuizState::Presenting { index } | QuizState::Feedback { index, .. } => {
                self.questions.get(index)
            }
            QuizState::Completed => None,
        }
    }

    pub fn records(&self) -> &[AnswerRecord] {
        &self.records
    }

    /// Finalized result. None until the quiz has completed.
    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    /// Milliseconds left on the presented question's own budget, if it has
    /// one. The caller schedules the countdown from this; expiry comes back
    /// through `expire_time_budget`.
    pub fn remaining_budget_ms(&self) -> Option<i64> {
        let question = self.current_question()?;
        let budget_ms = question.time_budget_secs? as i64 * 1000;
        let elapsed = self.clock.now().timestamp_millis() - self.presented_at_ms;
        Some((budget_ms - elapsed).max(0))
    }

    /// Grades the submitted text against the presented question and moves to
    /// feedback. An empty string is a legitimate "no answer" (graded
    /// incorrect); rejecting blank input is the UI's business, not ours.
    pub fn submit_answer(&mut self, text: &str) -> Result<&AnswerRecord, EngineError> {
        let index = match self.state {
            QuizState::Presenting { index } => index,
            _ => return Err(EngineError::invariant("submit_answer", &self.state)),
        };

        let elapsed_ms = self.clock.now().timestamp_millis() - self.presented_at_ms;
        let grade = scoring::grade_answer(&self.questions[index], text);
        debug!(
            "[Quiz] Q{} answered in {}ms: correct={}, points={}",
            index, elapsed_ms, grade.correct, grade.points
        );

        self.records.push(AnswerRecord {
            question_index: index,
            submitted: text.to_string(),
            elapsed_ms,
            correct: grade.correct,
            points_awarded: grade.points,
        });
        self.state = QuizState::Feedback {
            index,
            correct: grade.correct,
            points: grade.points,
        };
        Ok(&self.records[index])
    }

    /// Leaves the feedback screen: presents the next question, or finalizes
    /// the quiz when the last one was just answered.
    pub fn advance(&mut self) -> Result<&QuizState, EngineError> {
        let index = match self.state {
            QuizState::Feedback { index, .. } => index,
            _ => return Err(EngineError::invariant("advance", &self.state)),
        };

        if index + 1 == self.questions.len() {
            self.finalize()?;
        } else {
            self.state = QuizState::Presenting { index: index + 1 };
            self.presented_at_ms = self.clock.now().timestamp_millis();
            debug!("[Quiz] Presenting Q{}", index + 1);
        }
        Ok(&self.state)
    }

    /// Forces completion when a timer (per-question or whole-quiz) runs out.
    ///
    /// Synthesizes "no answer" records for every question not yet answered,
    /// then finalizes. Idempotent: once Completed, further calls no-op, so a
    /// stale timer racing a user-initiated finish cannot double-count.
    pub fn expire_time_budget(&mut self) -> Result<(), EngineError> {
        if self.state == QuizState::Completed {
            debug!("[Quiz] Expiry after completion ignored");
            return Ok(());
        }

        let answered = self.records.len();
        let now_ms = self.clock.now().timestamp_millis();
        let presenting = matches!(self.state, QuizState::Presenting { .. });
        for index in answered..self.questions.len() {
            // The question on screen charges its real elapsed time; questions
            // never reached charge nothing.
            let elapsed_ms = if presenting && index == answered {
                (now_ms - self.presented_at_ms).max(0)
            } else {
                0
            };
            self.records.push(AnswerRecord {
                question_index: index,
                submitted: String::new(),
                elapsed_ms,
                correct: false,
                points_awarded: 0,
            });
        }
        info!(
            "[Quiz] Time budget expired; {} unanswered question(s) recorded",
            self.questions.len() - answered
        );
        self.finalize()
    }

    fn finalize(&mut self) -> Result<(), EngineError> {
        let result = scoring::summarize_quiz(&self.records, &self.questions)?;
        info!(
            "[Quiz] Completed: score {}/{} ({:.0}% accuracy)",
            result.score, result.total_points, result.accuracy
        );
        self.result = Some(result);
        self.state = QuizState::Completed;
        Ok(())
    }
}
