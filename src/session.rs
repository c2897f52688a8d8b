// src/session.rs

use crate::clock::{Clock, SystemClock};
use crate::constants::DEFAULT_HINT_PENALTY;
use crate::error::EngineError;
use crate::models::{Challenge, GameSession, SessionStatus, TestCase, TestVerdict};
use crate::scoring;
use log::{debug, info, warn};
use std::collections::HashMap;

/// External code-execution collaborator. The engine never runs code itself;
/// it only consumes the ordered verdict list the service hands back. A
/// transport or timeout failure comes through as `Err` and leaves the
/// session untouched.
pub trait CodeExecutor {
    fn run(
        &self,
        language: &str,
        code: &str,
        test_cases: &[TestCase],
    ) -> Result<Vec<TestVerdict>, String>;
}

/// Lifecycle manager for one user's coding-challenge attempts.
///
/// Holds at most one live session per challenge; terminal sessions are kept
/// around so the leaderboard can fold them later. All mutation of a
/// `GameSession` goes through these operations.
pub struct GameSessionManager<C: Clock = SystemClock> {
    user_id: i64,
    clock: C,
    penalty_per_hint: i64,
    challenges: HashMap<String, Challenge>,
    sessions: HashMap<String, GameSession>,
    archive: Vec<GameSession>,
}

impl GameSessionManager<SystemClock> {
    pub fn new(user_id: i64) -> Self {
        GameSessionManager::with_clock(user_id, SystemClock)
    }
}

impl<C: Clock> GameSessionManager<C> {
    pub fn with_clock(user_id: i64, clock: C) -> Self {
        GameSessionManager {
            user_id,
            clock,
            penalty_per_hint: DEFAULT_HINT_PENALTY,
            challenges: HashMap::new(),
            sessions: HashMap::new(),
            archive: Vec::new(),
        }
    }

    pub fn penalty_per_hint(mut self, penalty: i64) -> Self {
        self.penalty_per_hint = penalty;
        self
    }

    /// Starts a fresh attempt at a challenge.
    ///
    /// Refuses with `DuplicateActiveSession` while an in-progress session for
    /// the same challenge exists; the caller resumes that one instead of
    /// silently forking a duplicate.
    pub fn start(&mut self, challenge: Challenge) -> Result<&GameSession, EngineError> {
        if let Some(existing) = self.sessions.get(&challenge.id) {
            if existing.status == SessionStatus::InProgress {
                return Err(EngineError::DuplicateActiveSession {
                    challenge_id: challenge.id.clone(),
                });
            }
            // A finished attempt moves to the archive before a new one begins.
            let done = self.sessions.remove(&challenge.id);
            self.archive.extend(done);
        }

        let now = self.clock.now();
        let session = GameSession {
            id: format!("{}-{}-{}", self.user_id, challenge.id, now.timestamp_millis()),
            user_id: self.user_id,
            challenge_id: challenge.id.clone(),
            status: SessionStatus::InProgress,
            code: challenge.starter_code.clone(),
            score: 0,
            hints_used: 0,
            revealed_hints: Vec::new(),
            attempts: 0,
            verdicts: Vec::new(),
            started_at: now,
            completed_at: None,
            elapsed_secs: 0,
        };
        info!("[Session] {} started on challenge '{}'", session.id, challenge.id);
        let id = challenge.id.clone();
        self.challenges.insert(id.clone(), challenge);
        self.sessions.insert(id.clone(), session);
        Ok(&self.sessions[&id])
    }

    /// Hands back the live session for a challenge, if there is one.
    pub fn resume(&self, challenge_id: &str) -> Result<&GameSession, EngineError> {
        self.sessions
            .get(challenge_id)
            .filter(|s| s.status == SessionStatus::InProgress)
            .ok_or_else(|| EngineError::UnknownSession {
                challenge_id: challenge_id.to_string(),
            })
    }

    pub fn session(&self, challenge_id: &str) -> Option<&GameSession> {
        self.sessions.get(challenge_id)
    }

    /// Wall-clock seconds the session has been live; frozen once terminal.
    pub fn elapsed_secs(&self, challenge_id: &str) -> Option<i64> {
        let session = self.sessions.get(challenge_id)?;
        if session.status.is_terminal() {
            Some(session.elapsed_secs)
        } else {
            Some((self.clock.now() - session.started_at).num_seconds())
        }
    }

    /// Replaces the code buffer. No scoring effect.
    pub fn update_code(&mut self, challenge_id: &str, text: &str) -> Result<(), EngineError> {
        let session = self.live_session_mut("update_code", challenge_id)?;
        session.code = text.to_string();
        Ok(())
    }

    /// Reveals a hint, charging it exactly once. The cost lands at
    /// completion time: a hint used and "wasted" because the user solves the
    /// challenge anyway still lowers the final score.
    pub fn use_hint(&mut self, challenge_id: &str, index: usize) -> Result<&str, EngineError> {
        let hint_count = self
            .challenges
            .get(challenge_id)
            .map(|c| c.hints.len())
            .unwrap_or(0);
        let session = self.live_session_mut("use_hint", challenge_id)?;

        if index >= hint_count {
            return Err(EngineError::invariant(
                "use_hint",
                format!("hint index {index} out of range ({hint_count} hints)"),
            ));
        }
        if session.revealed_hints.contains(&index) {
            return Err(EngineError::HintAlreadyUsed { index });
        }

        session.revealed_hints.push(index);
        session.hints_used += 1;
        debug!(
            "[Session] Hint {} revealed on '{}' ({} used)",
            index, challenge_id, session.hints_used
        );
        Ok(&self.challenges[challenge_id].hints[index])
    }

    /// Stores the submission and its verdicts. All tests passing completes
    /// the session and settles the score (base points minus hint penalty,
    /// clamped at zero); any failure leaves it in progress for another try.
    pub fn submit(
        &mut self,
        challenge_id: &str,
        code: &str,
        verdicts: Vec<TestVerdict>,
    ) -> Result<&GameSession, EngineError> {
        let base_points = self
            .challenges
            .get(challenge_id)
            .map(|c| c.base_points)
            .unwrap_or(0);
        let penalty = self.penalty_per_hint;
        let now = self.clock.now();

        let session = self.live_session_mut("submit", challenge_id)?;
        session.attempts += 1;
        session.code = code.to_string();
        let all_passed = !verdicts.is_empty() && verdicts.iter().all(|v| v.passed);
        session.verdicts = verdicts;

        if all_passed {
            session.score = scoring::apply_hint_penalty(base_points, session.hints_used, penalty);
            session.status = SessionStatus::Completed;
            session.completed_at = Some(now);
            session.elapsed_secs = (now - session.started_at).num_seconds();
            info!(
                "[Session] '{}' completed on attempt {}: score {} ({} hints)",
                challenge_id, session.attempts, session.score, session.hints_used
            );
        } else {
            let failed = session.verdicts.iter().filter(|v| !v.passed).count();
            debug!(
                "[Session] '{}' attempt {}: {} test(s) failing, still in progress",
                challenge_id, session.attempts, failed
            );
        }
        Ok(&*session)
    }

    /// Runs the submission through the external executor first. An executor
    /// failure surfaces as `ExecutionFailed` with the session untouched and
    /// the attempt count unincremented.
    pub fn submit_via(
        &mut self,
        challenge_id: &str,
        code: &str,
        executor: &dyn CodeExecutor,
    ) -> Result<&GameSession, EngineError> {
        // Validate state before calling out, so a forbidden submit never
        // reaches the execution service.
        self.resume(challenge_id)?;
        let challenge = self
            .challenges
            .get(challenge_id)
            .ok_or_else(|| EngineError::UnknownSession {
                challenge_id: challenge_id.to_string(),
            })?;

        let verdicts = executor
            .run(&challenge.language, code, &challenge.test_cases)
            .map_err(|e| {
                warn!("[Session] Execution failed for '{}': {}", challenge_id, e);
                EngineError::ExecutionFailed(e)
            })?;
        self.submit(challenge_id, code, verdicts)
    }

    /// Walks away. No score, elapsed time frozen.
    pub fn abandon(&mut self, challenge_id: &str) -> Result<&GameSession, EngineError> {
        let now = self.clock.now();
        let session = self.live_session_mut("abandon", challenge_id)?;
        session.status = SessionStatus::Abandoned;
        session.completed_at = Some(now);
        session.elapsed_secs = (now - session.started_at).num_seconds();
        info!("[Session] '{}' abandoned after {}s", challenge_id, session.elapsed_secs);
        Ok(&*session)
    }

    /// Time budget exhausted: the session fails. A stale timer firing after
    /// the session already reached a terminal state is tolerated as a no-op,
    /// since timer cancellation is best-effort.
    pub fn expire(&mut self, challenge_id: &str) -> Result<(), EngineError> {
        let now = self.clock.now();
        let session = match self.sessions.get_mut(challenge_id) {
            Some(s) => s,
            None => return Ok(()),
        };
        if session.status.is_terminal() {
            debug!("[Session] Late expiry against terminal '{}' ignored", challenge_id);
            return Ok(());
        }
        session.status = SessionStatus::Failed;
        session.completed_at = Some(now);
        session.elapsed_secs = (now - session.started_at).num_seconds();
        info!("[Session] '{}' failed on time budget", challenge_id);
        Ok(())
    }

    /// Every terminal session seen so far, archive included. Leaderboard
    /// input.
    pub fn finished_sessions(&self) -> Vec<GameSession> {
        self.archive
            .iter()
            .chain(self.sessions.values().filter(|s| s.status.is_terminal()))
            .cloned()
            .collect()
    }

    fn live_session_mut(
        &mut self,
        operation: &'static str,
        challenge_id: &str,
    ) -> Result<&mut GameSession, EngineError> {
        let session = self.sessions.get_mut(challenge_id).ok_or_else(|| {
            EngineError::UnknownSession {
                challenge_id: challenge_id.to_string(),
            }
        })?;
        if session.status.is_terminal() {
            return Err(EngineError::invariant(operation, session.status));
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::Difficulty;
    use chrono::Utc;

    fn challenge(id: &str, base_points: i64, hints: &[&str]) -> Challenge {
        Challenge {
            id: id.into(),
            title: format!("challenge {id}"),
            difficulty: Difficulty::Medium,
            base_points,
            starter_code: "fn solve() {}".into(),
            language: "rust".into(),
            hints: hints.iter().map(|h| h.to_string()).collect(),
            test_cases: vec![TestCase {
                input: "1".into(),
                expected_output: "1".into(),
            }],
        }
    }

    fn verdict(index: usize, passed: bool) -> TestVerdict {
        TestVerdict {
            test_index: index,
            passed,
            expected: "1".into(),
            actual: if passed { "1".into() } else { "0".into() },
            exec_time_ms: 4,
            error: None,
        }
    }

    fn manager() -> (GameSessionManager<ManualClock>, ManualClock) {
        let clock = ManualClock::starting_at(Utc::now());
        let mgr = GameSessionManager::with_clock(42, clock.clone());
        (mgr, clock)
    }

    #[test]
    fn hint_then_passing_submit_settles_score() {
        let (mut mgr, _clock) = manager();
        mgr.start(challenge("c1", 100, &["think about hashing"]))
            .unwrap();
        mgr.use_hint("c1", 0).unwrap();
        let session = mgr.submit("c1", "fn solve() { 1 }", vec![verdict(0, true)]).unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.score, 85);
        assert!(session.completed_at.is_some());
    }

    #[test]
    fn duplicate_start_is_rejected_and_original_untouched() {
        let (mut mgr, _clock) = manager();
        mgr.start(challenge("c1", 100, &[])).unwrap();
        mgr.update_code("c1", "draft").unwrap();

        let err = mgr.start(challenge("c1", 100, &[])).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateActiveSession { .. }));
        let original = mgr.resume("c1").unwrap();
        assert_eq!(original.code, "draft");
        assert_eq!(original.attempts, 0);
    }

    #[test]
    fn failing_verdicts_keep_the_session_alive() {
        let (mut mgr, _clock) = manager();
        mgr.start(challenge("c1", 100, &[])).unwrap();
        let session = mgr
            .submit("c1", "bad", vec![verdict(0, true), verdict(1, false)])
            .unwrap();
        assert_eq!(session.status, SessionStatus::InProgress);
        assert_eq!(session.attempts, 1);
        assert_eq!(session.score, 0);

        // Resubmit succeeds.
        let session = mgr.submit("c1", "good", vec![verdict(0, true)]).unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.attempts, 2);
        assert_eq!(session.score, 100);
    }

    #[test]
    fn hint_cannot_be_charged_twice() {
        let (mut mgr, _clock) = manager();
        mgr.start(challenge("c1", 100, &["h0", "h1"])).unwrap();
        assert_eq!(mgr.use_hint("c1", 0).unwrap(), "h0");
        assert!(matches!(
            mgr.use_hint("c1", 0),
            Err(EngineError::HintAlreadyUsed { index: 0 })
        ));
        assert_eq!(mgr.use_hint("c1", 1).unwrap(), "h1");
        assert_eq!(mgr.session("c1").unwrap().hints_used, 2);
    }

    #[test]
    fn many_hints_clamp_score_at_zero() {
        let (mut mgr, _clock) = manager();
        let hints = ["a"; 9];
        mgr.start(challenge("c1", 100, &hints)).unwrap();
        for i in 0..9 {
            mgr.use_hint("c1", i).unwrap();
        }
        let session = mgr.submit("c1", "ok", vec![verdict(0, true)]).unwrap();
        assert_eq!(session.score, 0);
    }

    #[test]
    fn operations_on_terminal_session_are_invariant_violations() {
        let (mut mgr, _clock) = manager();
        mgr.start(challenge("c1", 100, &["h"])).unwrap();
        mgr.abandon("c1").unwrap();
        assert!(matches!(
            mgr.update_code("c1", "x"),
            Err(EngineError::InvariantViolation { .. })
        ));
        assert!(matches!(
            mgr.submit("c1", "x", vec![verdict(0, true)]),
            Err(EngineError::InvariantViolation { .. })
        ));
        assert!(matches!(
            mgr.use_hint("c1", 0),
            Err(EngineError::InvariantViolation { .. })
        ));
    }

    #[test]
    fn elapsed_time_freezes_at_terminal_transition() {
        let (mut mgr, clock) = manager();
        mgr.start(challenge("c1", 100, &[])).unwrap();
        clock.advance_secs(90);
        assert_eq!(mgr.elapsed_secs("c1"), Some(90));
        mgr.abandon("c1").unwrap();
        clock.advance_secs(1000);
        assert_eq!(mgr.elapsed_secs("c1"), Some(90));
    }

    #[test]
    fn expiry_fails_the_session_and_late_expiry_noops() {
        let (mut mgr, clock) = manager();
        mgr.start(challenge("c1", 100, &[])).unwrap();
        clock.advance_secs(30);
        mgr.expire("c1").unwrap();
        assert_eq!(mgr.session("c1").unwrap().status, SessionStatus::Failed);

        // Stale timer fires again; nothing changes.
        clock.advance_secs(30);
        mgr.expire("c1").unwrap();
        assert_eq!(mgr.session("c1").unwrap().elapsed_secs, 30);
    }

    #[test]
    fn executor_failure_leaves_session_untouched() {
        struct FlakyExecutor;
        impl CodeExecutor for FlakyExecutor {
            fn run(
                &self,
                _language: &str,
                _code: &str,
                _test_cases: &[TestCase],
            ) -> Result<Vec<TestVerdict>, String> {
                Err("sandbox timeout".into())
            }
        }

        let (mut mgr, _clock) = manager();
        mgr.start(challenge("c1", 100, &[])).unwrap();
        mgr.update_code("c1", "draft").unwrap();
        let err = mgr.submit_via("c1", "draft2", &FlakyExecutor).unwrap_err();
        assert!(matches!(err, EngineError::ExecutionFailed(_)));

        let session = mgr.session("c1").unwrap();
        assert_eq!(session.status, SessionStatus::InProgress);
        assert_eq!(session.attempts, 0);
        assert_eq!(session.code, "draft");
    }

    #[test]
    fn new_attempt_after_terminal_archives_the_old_one() {
        let (mut mgr, _clock) = manager();
        mgr.start(challenge("c1", 100, &[])).unwrap();
        mgr.abandon("c1").unwrap();
        mgr.start(challenge("c1", 100, &[])).unwrap();
        mgr.submit("c1", "ok", vec![verdict(0, true)]).unwrap();

        let finished = mgr.finished_sessions();
        assert_eq!(finished.len(), 2);
        assert!(finished.iter().any(|s| s.status == SessionStatus::Abandoned));
        assert!(finished.iter().any(|s| s.status == SessionStatus::Completed));
    }
}
