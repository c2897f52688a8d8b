// src/database.rs

use crate::error::EngineError;
use crate::models::{Challenge, Question};
use log::info;
use rusqlite::{params, Connection};
use serde::Deserialize;

pub fn init_db(conn: &Connection) -> Result<(), EngineError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            display_name TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS questions (
            id INTEGER PRIMARY KEY,
            prompt TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('multiple_choice','true_false','short_answer','code')),
            options TEXT NOT NULL DEFAULT '[]',
            answer TEXT NOT NULL,
            explanation TEXT,
            difficulty TEXT NOT NULL CHECK (difficulty IN ('easy','medium','hard')),
            points INTEGER NOT NULL,
            time_budget_secs INTEGER
        );
        CREATE TABLE IF NOT EXISTS challenges (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            difficulty TEXT NOT NULL CHECK (difficulty IN ('easy','medium','hard')),
            base_points INTEGER NOT NULL,
            starter_code TEXT NOT NULL,
            language TEXT NOT NULL,
            hints TEXT NOT NULL DEFAULT '[]',
            test_cases TEXT NOT NULL DEFAULT '[]'
        );
        CREATE TABLE IF NOT EXISTS quiz_results (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            score INTEGER NOT NULL,
            total_points INTEGER NOT NULL,
            correct_count INTEGER NOT NULL,
            total_questions INTEGER NOT NULL,
            total_elapsed_ms INTEGER NOT NULL,
            accuracy REAL NOT NULL,
            created_at INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL,
            challenge_id TEXT NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('in_progress','completed','failed','abandoned')),
            code TEXT NOT NULL,
            score INTEGER NOT NULL,
            hints_used INTEGER NOT NULL,
            revealed_hints TEXT NOT NULL DEFAULT '[]',
            attempts INTEGER NOT NULL,
            verdicts TEXT NOT NULL DEFAULT '[]',
            started_at INTEGER NOT NULL,
            completed_at INTEGER,
            elapsed_secs INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS rounds (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            player TEXT NOT NULL,
            opponent TEXT NOT NULL,
            result TEXT NOT NULL CHECK (result IN ('win','lose','draw')),
            sequence INTEGER NOT NULL,
            created_at INTEGER NOT NULL
        );
        ",
    )?;

    let count: i64 = conn.query_row("SELECT count(*) FROM questions", [], |row| row.get(0))?;
    if count == 0 {
        info!("[DB] Content tables empty, seeding starter content");
        seed_content(conn)?;
    }

    Ok(())
}

#[derive(Deserialize)]
struct SeedContent {
    questions: Vec<Question>,
    challenges: Vec<Challenge>,
}

fn seed_content(conn: &Connection) -> Result<(), EngineError> {
    let data = include_str!("data/seed_content.json");
    let content: SeedContent = serde_json::from_str(data)?;

    let mut q_stmt = conn.prepare(
        "INSERT OR REPLACE INTO questions
         (id, prompt, kind, options, answer, explanation, difficulty, points, time_budget_secs)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )?;
    for q in &content.questions {
        q_stmt.execute(params![
            q.id,
            q.prompt,
            kind_str(q),
            serde_json::to_string(&q.options)?,
            q.correct_answer,
            q.explanation,
            q.difficulty.as_str(),
            q.points,
            q.time_budget_secs,
        ])?;
    }

    let mut c_stmt = conn.prepare(
        "INSERT OR REPLACE INTO challenges
         (id, title, difficulty, base_points, starter_code, language, hints, test_cases)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )?;
    for c in &content.challenges {
        c_stmt.execute(params![
            c.id,
            c.title,
            c.difficulty.as_str(),
            c.base_points,
            c.starter_code,
            c.language,
            serde_json::to_string(&c.hints)?,
            serde_json::to_string(&c.test_cases)?,
        ])?;
    }

    info!(
        "[DB] Seeded {} questions, {} challenges",
        content.questions.len(),
        content.challenges.len()
    );
    Ok(())
}

fn kind_str(q: &Question) -> &'static str {
    use crate::models::QuestionKind::*;
    match q.kind {
        MultipleChoice => "multiple_choice",
        TrueFalse => "true_false",
        ShortAnswer => "short_answer",
        Code => "code",
    }
}
