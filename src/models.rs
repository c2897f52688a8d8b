// src/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// --- Content Models ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy = 1,
    Medium = 2,
    Hard = 3,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Ok(Difficulty::Medium), // Default fallback
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    Code,
}

/// One quiz question. Immutable once a quiz has started.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub prompt: String,
    pub kind: QuestionKind,
    /// Present only for multiple-choice questions.
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: Option<String>,
    pub difficulty: Difficulty,
    pub points: i64,
    /// Per-question countdown, seconds. None means the global quiz timer rules.
    #[serde(default)]
    pub time_budget_secs: Option<u32>,
}

/// A graded coding challenge as served to a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub base_points: i64,
    pub starter_code: String,
    pub language: String,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub expected_output: String,
}

// --- Quiz Models ---

/// One answered (or expired) question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_index: usize,
    /// Empty string means "no answer".
    pub submitted: String,
    pub elapsed_ms: i64,
    pub correct: bool,
    pub points_awarded: i64,
}

/// Aggregate of a finished quiz. Created exactly once, at termination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub score: i64,
    pub total_points: i64,
    pub correct_count: usize,
    pub total_questions: usize,
    pub total_elapsed_ms: i64,
    /// correct_count / total_questions * 100.
    pub accuracy: f64,
}

// --- Session Models ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
    Failed,
    Abandoned,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::InProgress)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
            SessionStatus::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(SessionStatus::InProgress),
            "completed" => Ok(SessionStatus::Completed),
            "failed" => Ok(SessionStatus::Failed),
            "abandoned" => Ok(SessionStatus::Abandoned),
            _ => Err(format!("unknown session status '{s}'")),
        }
    }
}

/// Pass/fail outcome of one test case, supplied by the external execution
/// service. Never fabricated or mutated by the engine after receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestVerdict {
    pub test_index: usize,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
    pub exec_time_ms: i64,
    #[serde(default)]
    pub error: Option<String>,
}

/// One user's attempt at a coding challenge, start to terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub id: String,
    pub user_id: i64,
    pub challenge_id: String,
    pub status: SessionStatus,
    pub code: String,
    pub score: i64,
    pub hints_used: usize,
    /// Indices already revealed; a hint can only be charged once.
    pub revealed_hints: Vec<usize>,
    pub attempts: u32,
    pub verdicts: Vec<TestVerdict>,
    pub started_at: DateTime<Utc>,
    /// Set only on entering a terminal state.
    pub completed_at: Option<DateTime<Utc>>,
    /// Frozen at the terminal transition.
    pub elapsed_secs: i64,
}

// --- Mini-game Models ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn other(&self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// A 3x3 board, row-major, cell indices 0-8.
pub type Board = [Option<Mark>; 9];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Rock,
    Paper,
    Scissors,
}

impl Choice {
    pub const ALL: [Choice; 3] = [Choice::Rock, Choice::Paper, Choice::Scissors];

    /// The choice this one defeats.
    pub fn beats(&self) -> Choice {
        match self {
            Choice::Rock => Choice::Scissors,
            Choice::Paper => Choice::Rock,
            Choice::Scissors => Choice::Paper,
        }
    }

    /// The choice that defeats this one.
    pub fn beaten_by(&self) -> Choice {
        match self {
            Choice::Rock => Choice::Paper,
            Choice::Paper => Choice::Scissors,
            Choice::Scissors => Choice::Rock,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Lose,
    Draw,
}

/// One finished mini-game round, from the player's perspective.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub player: Choice,
    pub opponent: Choice,
    pub result: Outcome,
    pub sequence: u64,
}

/// Running tallies derived solely from the round log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub played: u32,
    pub current_streak: u32,
    pub best_streak: u32,
}

// --- Leaderboard Models ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    AllTime,
}

/// One row of the standings. A view recomputed per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: i64,
    pub display_name: String,
    pub score: i64,
    pub games_completed: u32,
}
