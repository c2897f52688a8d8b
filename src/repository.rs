// src/repository.rs

use crate::models::{
    Challenge, Choice, GameSession, Outcome, Question, QuestionKind, QuizResult, RoundOutcome,
    SessionStatus,
};
use chrono::{DateTime, Utc};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Result};
use std::collections::HashMap;
use std::str::FromStr;

/// Registers (or renames) a user for leaderboard display.
pub fn upsert_user(conn: &Connection, user_id: i64, display_name: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO users (id, display_name) VALUES (?, ?)
         ON CONFLICT(id) DO UPDATE SET display_name = excluded.display_name",
        params![user_id, display_name],
    )?;
    Ok(())
}

pub fn load_display_names(conn: &Connection) -> Result<HashMap<i64, String>> {
    let mut stmt = conn.prepare("SELECT id, display_name FROM users")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}

// --- Content ---

pub fn load_questions(conn: &Connection) -> Result<Vec<Question>> {
    let mut stmt = conn.prepare(
        "SELECT id, prompt, kind, options, answer, explanation, difficulty, points,
                time_budget_secs
         FROM questions ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        let kind: String = row.get(2)?;
        let options: String = row.get(3)?;
        let difficulty: String = row.get(6)?;
        Ok(Question {
            id: row.get(0)?,
            prompt: row.get(1)?,
            kind: parse_kind(&kind),
            options: serde_json::from_str(&options).unwrap_or_default(),
            correct_answer: row.get(4)?,
            explanation: row.get(5)?,
            difficulty: FromStr::from_str(&difficulty).unwrap_or(crate::models::Difficulty::Medium),
            points: row.get(7)?,
            time_budget_secs: row.get(8)?,
        })
    })?;
    rows.collect()
}

pub fn load_challenge(conn: &Connection, challenge_id: &str) -> Result<Option<Challenge>> {
    conn.query_row(
        "SELECT id, title, difficulty, base_points, starter_code, language, hints, test_cases
         FROM challenges WHERE id = ?",
        [challenge_id],
        |row| {
            let difficulty: String = row.get(2)?;
            let hints: String = row.get(6)?;
            let test_cases: String = row.get(7)?;
            Ok(Challenge {
                id: row.get(0)?,
                title: row.get(1)?,
                difficulty: FromStr::from_str(&difficulty)
                    .unwrap_or(crate::models::Difficulty::Medium),
                base_points: row.get(3)?,
                starter_code: row.get(4)?,
                language: row.get(5)?,
                hints: serde_json::from_str(&hints).unwrap_or_default(),
                test_cases: serde_json::from_str(&test_cases).unwrap_or_default(),
            })
        },
    )
    .optional()
}

// --- Results ---

pub fn save_completed_quiz(
    conn: &Connection,
    user_id: i64,
    result: &QuizResult,
    completed_at: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO quiz_results
         (user_id, score, total_points, correct_count, total_questions, total_elapsed_ms,
          accuracy, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            user_id,
            result.score,
            result.total_points,
            result.correct_count,
            result.total_questions,
            result.total_elapsed_ms,
            result.accuracy,
            completed_at.timestamp_millis(),
        ],
    )?;
    Ok(())
}

/// Upserts the session row on its id, so repeated saves of the same session
/// (code edits, attempts, the terminal transition) converge on one record.
pub fn save_session_event(conn: &Connection, session: &GameSession) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO sessions
         (id, user_id, challenge_id, status, code, score, hints_used, revealed_hints,
          attempts, verdicts, started_at, completed_at, elapsed_secs)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            session.id,
            session.user_id,
            session.challenge_id,
            session.status.as_str(),
            session.code,
            session.score,
            session.hints_used,
            serde_json::to_string(&session.revealed_hints).unwrap_or_else(|_| "[]".into()),
            session.attempts,
            serde_json::to_string(&session.verdicts).unwrap_or_else(|_| "[]".into()),
            session.started_at.timestamp_millis(),
            session.completed_at.map(|t| t.timestamp_millis()),
            session.elapsed_secs,
        ],
    )?;
    Ok(())
}

/// Best-effort save. The in-memory state machine is the source of truth: a
/// storage failure is logged and swallowed, never rolled back into the
/// already-finalized session.
pub fn save_session_event_best_effort(conn: &Connection, session: &GameSession) {
    if let Err(e) = save_session_event(conn, session) {
        warn!("[DB] Failed to save session '{}': {}", session.id, e);
    }
}

pub fn load_sessions(conn: &Connection) -> Result<Vec<GameSession>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, challenge_id, status, code, score, hints_used, revealed_hints,
                attempts, verdicts, started_at, completed_at, elapsed_secs
         FROM sessions ORDER BY started_at",
    )?;
    let rows = stmt.query_map([], |row| {
        let status: String = row.get(3)?;
        let revealed: String = row.get(7)?;
        let verdicts: String = row.get(9)?;
        let started_ms: i64 = row.get(10)?;
        let completed_ms: Option<i64> = row.get(11)?;
        Ok(GameSession {
            id: row.get(0)?,
            user_id: row.get(1)?,
            challenge_id: row.get(2)?,
            status: SessionStatus::from_str(&status).unwrap_or(SessionStatus::Abandoned),
            code: row.get(4)?,
            score: row.get(5)?,
            hints_used: row.get(6)?,
            revealed_hints: serde_json::from_str(&revealed).unwrap_or_default(),
            attempts: row.get(8)?,
            verdicts: serde_json::from_str(&verdicts).unwrap_or_default(),
            started_at: DateTime::from_timestamp_millis(started_ms).unwrap_or_else(Utc::now),
            completed_at: completed_ms.and_then(DateTime::from_timestamp_millis),
            elapsed_secs: row.get(12)?,
        })
    })?;
    rows.collect()
}

pub fn load_completed_sessions(conn: &Connection) -> Result<Vec<GameSession>> {
    Ok(load_sessions(conn)?
        .into_iter()
        .filter(|s| s.status == SessionStatus::Completed)
        .collect())
}

// --- Mini-game Rounds ---

pub fn log_round(
    conn: &Connection,
    user_id: i64,
    round: &RoundOutcome,
    played_at: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO rounds (user_id, player, opponent, result, sequence, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
        params![
            user_id,
            choice_str(round.player),
            choice_str(round.opponent),
            outcome_str(round.result),
            round.sequence,
            played_at.timestamp_millis(),
        ],
    )?;
    Ok(())
}

pub fn round_count(conn: &Connection, user_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT count(*) FROM rounds WHERE user_id = ?",
        [user_id],
        |r| r.get(0),
    )
}

fn parse_kind(s: &str) -> QuestionKind {
    match s {
        "multiple_choice" => QuestionKind::MultipleChoice,
        "true_false" => QuestionKind::TrueFalse,
        "code" => QuestionKind::Code,
        _ => QuestionKind::ShortAnswer,
    }
}

fn choice_str(c: Choice) -> &'static str {
    match c {
        Choice::Rock => "rock",
        Choice::Paper => "paper",
        Choice::Scissors => "scissors",
    }
}

fn outcome_str(o: Outcome) -> &'static str {
    match o {
        Outcome::Win => "win",
        Outcome::Lose => "lose",
        Outcome::Draw => "draw",
    }
}
