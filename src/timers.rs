// src/timers.rs

use chrono::{DateTime, Utc};
use log::debug;

/// What a countdown is for. Carried back to the caller when it fires so the
/// right expiry operation gets invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    QuestionBudget,
    QuizBudget,
    SessionBudget,
    OpponentThinking,
    RevealCountdown,
}

/// Cancellation token handed out at scheduling time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

struct TimerEntry {
    token: TimerToken,
    kind: TimerKind,
    deadline: DateTime<Utc>,
}

/// Explicit countdown bookkeeping, replacing interval callbacks tied to a
/// widget's lifetime.
///
/// The registry does not run anything by itself: the caller polls `due` from
/// its event loop and routes each fired entry to the matching engine expiry
/// operation — that operation is the only thing a timer may call. Fired
/// entries are removed, so each deadline is delivered at most once.
/// Cancellation is best-effort; the state machines tolerate a late fire.
#[derive(Default)]
pub struct TimerRegistry {
    next_id: u64,
    entries: Vec<TimerEntry>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        TimerRegistry::default()
    }

    pub fn schedule(&mut self, kind: TimerKind, deadline: DateTime<Utc>) -> TimerToken {
        self.next_id += 1;
        let token = TimerToken(self.next_id);
        debug!("[Timer] Scheduled {:?} #{} for {}", kind, self.next_id, deadline);
        self.entries.push(TimerEntry {
            token,
            kind,
            deadline,
        });
        token
    }

    /// Removes a pending timer. Returns false when it already fired or was
    /// never scheduled.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.token != token);
        let cancelled = self.entries.len() < before;
        if cancelled {
            debug!("[Timer] Cancelled #{}", token.0);
        }
        cancelled
    }

    /// Drops every pending timer. Called on terminal transitions so nothing
    /// fires against a finished quiz or session.
    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    /// Fired timers, in deadline order. Each is delivered exactly once.
    pub fn due(&mut self, now: DateTime<Utc>) -> Vec<(TimerToken, TimerKind)> {
        let mut fired: Vec<(DateTime<Utc>, TimerToken, TimerKind)> = self
            .entries
            .iter()
            .filter(|e| e.deadline <= now)
            .map(|e| (e.deadline, e.token, e.kind))
            .collect();
        fired.sort_by_key(|(deadline, token, _)| (*deadline, token.0));
        self.entries.retain(|e| e.deadline > now);
        fired.into_iter().map(|(_, token, kind)| (token, kind)).collect()
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }
}
