// src/scoring.rs

use crate::error::EngineError;
use crate::models::{AnswerRecord, Question, QuizResult};

/// Verdict for a single submitted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grade {
    pub correct: bool,
    pub points: i64,
}

/// Case-insensitive, whitespace-trimmed equality against the canonical
/// answer. Strict beyond that normalization: no partial credit, no numeric
/// tolerance.
pub fn grade_answer(question: &Question, submitted: &str) -> Grade {
    let correct =
        submitted.trim().to_lowercase() == question.correct_answer.trim().to_lowercase();
    Grade {
        correct,
        points: if correct { question.points } else { 0 },
    }
}

/// Folds the answer records of a finished quiz into its result.
///
/// An empty question list is a content configuration error, not a zero-score
/// quiz: accuracy would divide by zero, so we refuse it outright.
pub fn summarize_quiz(
    records: &[AnswerRecord],
    questions: &[Question],
) -> Result<QuizResult, EngineError> {
    if questions.is_empty() {
        return Err(EngineError::EmptyQuiz);
    }

    let score: i64 = records.iter().map(|r| r.points_awarded).sum();
    let total_points: i64 = questions.iter().map(|q| q.points).sum();
    let correct_count = records.iter().filter(|r| r.correct).count();
    let total_elapsed_ms: i64 = records.iter().map(|r| r.elapsed_ms).sum();

    Ok(QuizResult {
        score,
        total_points,
        correct_count,
        total_questions: questions.len(),
        total_elapsed_ms,
        accuracy: correct_count as f64 / questions.len() as f64 * 100.0,
    })
}

/// Linear hint penalty, clamped so the score never goes negative.
pub fn apply_hint_penalty(base_score: i64, hints_used: usize, penalty_per_hint: i64) -> i64 {
    (base_score - hints_used as i64 * penalty_per_hint).max(0)
}

/// Whether a result clears the passing threshold. Undefined (false) when the
/// quiz carried no points at all.
pub fn passed(result: &QuizResult, passing_percent: f64) -> bool {
    if result.total_points <= 0 {
        return false;
    }
    result.score as f64 / result.total_points as f64 * 100.0 >= passing_percent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, QuestionKind};

    fn question(answer: &str, points: i64) -> Question {
        Question {
            id: 1,
            prompt: "prompt".into(),
            kind: QuestionKind::ShortAnswer,
            options: Vec::new(),
            correct_answer: answer.into(),
            explanation: None,
            difficulty: Difficulty::Easy,
            points,
            time_budget_secs: None,
        }
    }

    fn record(index: usize, correct: bool, points: i64, elapsed_ms: i64) -> AnswerRecord {
        AnswerRecord {
            question_index: index,
            submitted: "x".into(),
            elapsed_ms,
            correct,
            points_awarded: if correct { points } else { 0 },
        }
    }

    #[test]
    fn grading_normalizes_case_and_whitespace() {
        let q = question("Paris", 10);
        assert!(grade_answer(&q, "  paris ").correct);
        assert!(grade_answer(&q, "PARIS").correct);
        assert_eq!(grade_answer(&q, "PARIS").points, 10);
    }

    #[test]
    fn grading_is_strict_beyond_normalization() {
        let q = question("Paris", 10);
        for wrong in ["pariss", "par is", "", "france"] {
            let g = grade_answer(&q, wrong);
            assert!(!g.correct);
            assert_eq!(g.points, 0);
        }
    }

    #[test]
    fn perfect_quiz_scores_full_points_and_accuracy() {
        let questions = vec![question("a", 10), question("b", 20)];
        let records = vec![record(0, true, 10, 100), record(1, true, 20, 200)];
        let result = summarize_quiz(&records, &questions).unwrap();
        assert_eq!(result.score, result.total_points);
        assert_eq!(result.accuracy, 100.0);
        assert_eq!(result.total_elapsed_ms, 300);
    }

    #[test]
    fn empty_quiz_is_rejected() {
        assert!(matches!(
            summarize_quiz(&[], &[]),
            Err(EngineError::EmptyQuiz)
        ));
    }

    #[test]
    fn hint_penalty_never_goes_negative() {
        assert_eq!(apply_hint_penalty(100, 2, 15), 70);
        assert_eq!(apply_hint_penalty(100, 1000, 15), 0);
        assert_eq!(apply_hint_penalty(0, 1, 15), 0);
    }

    #[test]
    fn passing_guards_zero_total_points() {
        let zero = QuizResult {
            score: 0,
            total_points: 0,
            correct_count: 0,
            total_questions: 1,
            total_elapsed_ms: 0,
            accuracy: 0.0,
        };
        assert!(!passed(&zero, 0.0));

        let half = QuizResult {
            score: 15,
            total_points: 30,
            correct_count: 1,
            total_questions: 2,
            total_elapsed_ms: 0,
            accuracy: 50.0,
        };
        assert!(passed(&half, 50.0));
        assert!(!passed(&half, 50.1));
    }
}
