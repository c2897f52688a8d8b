// src/lib.rs

//! Session engine for a learning platform's interactive layer: timed
//! quizzes, graded coding challenges, and two turn-based mini-games with
//! heuristic opponents. Rendering, transport, auth, and code execution live
//! outside this crate; it exposes deterministic state machines and pure
//! decision functions a UI or test harness drives directly.

pub mod clock;
pub mod constants;
pub mod database;
pub mod error;
pub mod history;
pub mod leaderboard;
pub mod models;
pub mod opponents;
pub mod quiz;
pub mod repository;
pub mod scoring;
pub mod session;
pub mod timers;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::EngineError;
pub use history::RoundHistory;
pub use leaderboard::build_leaderboard;
pub use quiz::{QuizFlow, QuizState};
pub use session::{CodeExecutor, GameSessionManager};
pub use timers::{TimerKind, TimerRegistry, TimerToken};
