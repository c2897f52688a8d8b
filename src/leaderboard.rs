// src/leaderboard.rs

use crate::models::{GameSession, LeaderboardEntry, Period, SessionStatus};
use chrono::{DateTime, Datelike, Utc};
use log::debug;
use std::collections::HashMap;

/// Folds completed sessions into ranked standings for a time window.
///
/// The leaderboard is a view: it is rebuilt from session data on every call
/// and never stored or incrementally updated. Sessions whose completion
/// timestamp falls outside the window, and sessions that did not complete,
/// are ignored. An empty result is a valid leaderboard.
pub fn build_leaderboard(
    sessions: &[GameSession],
    display_names: &HashMap<i64, String>,
    period: Period,
    now: DateTime<Utc>,
) -> Vec<LeaderboardEntry> {
    struct Tally {
        score: i64,
        games: u32,
        earliest: DateTime<Utc>,
        first_seen: usize,
    }

    let mut tallies: HashMap<i64, Tally> = HashMap::new();
    let mut order: Vec<i64> = Vec::new();

    for session in sessions {
        if session.status != SessionStatus::Completed {
            continue;
        }
        let completed_at = match session.completed_at {
            Some(ts) if in_period(ts, period, now) => ts,
            _ => continue,
        };

        let next_index = order.len();
        let tally = tallies.entry(session.user_id).or_insert_with(|| {
            order.push(session.user_id);
            Tally {
                score: 0,
                games: 0,
                earliest: completed_at,
                first_seen: next_index,
            }
        });
        tally.score += session.score;
        tally.games += 1;
        tally.earliest = tally.earliest.min(completed_at);
    }

    // Score descending, earlier qualifying completion first, then input
    // order. The sort key makes the ordering total, so full ties stay in the
    // order users first appeared.
    let mut users: Vec<(i64, Tally)> = order
        .iter()
        .filter_map(|id| tallies.remove(id).map(|t| (*id, t)))
        .collect();
    users.sort_by(|a, b| {
        b.1.score
            .cmp(&a.1.score)
            .then(a.1.earliest.cmp(&b.1.earliest))
            .then(a.1.first_seen.cmp(&b.1.first_seen))
    });

    debug!(
        "[Leaderboard] {:?}: {} of {} sessions qualified, {} users ranked",
        period,
        users.iter().map(|(_, t)| t.games).sum::<u32>(),
        sessions.len(),
        users.len()
    );

    users
        .into_iter()
        .enumerate()
        .map(|(i, (user_id, tally))| LeaderboardEntry {
            rank: i as u32 + 1,
            user_id,
            display_name: display_names
                .get(&user_id)
                .cloned()
                .unwrap_or_else(|| format!("user-{user_id}")),
            score: tally.score,
            games_completed: tally.games,
        })
        .collect()
}

/// Whether a completion timestamp falls inside the window anchored at `now`.
fn in_period(ts: DateTime<Utc>, period: Period, now: DateTime<Utc>) -> bool {
    match period {
        Period::Daily => ts.date_naive() == now.date_naive(),
        Period::Weekly => ts.iso_week() == now.iso_week(),
        Period::Monthly => ts.year() == now.year() && ts.month() == now.month(),
        Period::AllTime => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session(user_id: i64, score: i64, completed_at: DateTime<Utc>) -> GameSession {
        GameSession {
            id: format!("{user_id}-c-{}", completed_at.timestamp()),
            user_id,
            challenge_id: "c".into(),
            status: SessionStatus::Completed,
            code: String::new(),
            score,
            hints_used: 0,
            revealed_hints: Vec::new(),
            attempts: 1,
            verdicts: Vec::new(),
            started_at: completed_at,
            completed_at: Some(completed_at),
            elapsed_secs: 60,
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn empty_input_yields_empty_board() {
        let board = build_leaderboard(&[], &HashMap::new(), Period::AllTime, Utc::now());
        assert!(board.is_empty());
    }

    #[test]
    fn scores_sum_per_user_and_rank_descending() {
        let now = at(2026, 3, 10, 12);
        let sessions = vec![
            session(1, 50, at(2026, 3, 10, 9)),
            session(2, 80, at(2026, 3, 10, 10)),
            session(1, 60, at(2026, 3, 10, 11)),
        ];
        let board = build_leaderboard(&sessions, &HashMap::new(), Period::AllTime, now);
        assert_eq!(board.len(), 2);
        assert_eq!((board[0].user_id, board[0].score, board[0].rank), (1, 110, 1));
        assert_eq!(board[0].games_completed, 2);
        assert_eq!((board[1].user_id, board[1].score, board[1].rank), (2, 80, 2));
    }

    #[test]
    fn ranks_are_gapless_from_one_with_full_ties_in_input_order() {
        let now = at(2026, 3, 10, 12);
        let ts = at(2026, 3, 10, 9);
        let sessions = vec![
            session(7, 50, ts),
            session(3, 50, ts),
            session(5, 90, ts),
        ];
        let board = build_leaderboard(&sessions, &HashMap::new(), Period::AllTime, now);
        let ranks: Vec<u32> = board.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        // 7 and 3 tie on score and earliest completion: input order holds.
        assert_eq!(board[1].user_id, 7);
        assert_eq!(board[2].user_id, 3);
    }

    #[test]
    fn score_tie_breaks_by_earliest_completion() {
        let now = at(2026, 3, 10, 12);
        let sessions = vec![
            session(1, 50, at(2026, 3, 10, 11)),
            session(2, 50, at(2026, 3, 10, 8)),
        ];
        let board = build_leaderboard(&sessions, &HashMap::new(), Period::AllTime, now);
        assert_eq!(board[0].user_id, 2);
        assert_eq!(board[1].user_id, 1);
    }

    #[test]
    fn daily_window_excludes_yesterday() {
        let now = at(2026, 3, 10, 12);
        let sessions = vec![
            session(1, 50, at(2026, 3, 9, 23)),
            session(2, 30, at(2026, 3, 10, 1)),
        ];
        let board = build_leaderboard(&sessions, &HashMap::new(), Period::Daily, now);
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].user_id, 2);
    }

    #[test]
    fn weekly_window_follows_iso_weeks() {
        // 2026-03-09 is a Monday; the previous Sunday is a different ISO week.
        let now = at(2026, 3, 10, 12);
        let sessions = vec![
            session(1, 50, at(2026, 3, 8, 12)),
            session(2, 30, at(2026, 3, 9, 0)),
        ];
        let board = build_leaderboard(&sessions, &HashMap::new(), Period::Weekly, now);
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].user_id, 2);
    }

    #[test]
    fn monthly_window_uses_the_calendar_month() {
        let now = at(2026, 3, 10, 12);
        let sessions = vec![
            session(1, 50, at(2026, 2, 28, 12)),
            session(2, 30, at(2026, 3, 1, 0)),
        ];
        let board = build_leaderboard(&sessions, &HashMap::new(), Period::Monthly, now);
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].user_id, 2);
    }

    #[test]
    fn non_completed_sessions_never_qualify() {
        let now = at(2026, 3, 10, 12);
        let mut failed = session(1, 50, at(2026, 3, 10, 9));
        failed.status = SessionStatus::Failed;
        let mut abandoned = session(2, 50, at(2026, 3, 10, 9));
        abandoned.status = SessionStatus::Abandoned;
        let board =
            build_leaderboard(&[failed, abandoned], &HashMap::new(), Period::AllTime, now);
        assert!(board.is_empty());
    }

    #[test]
    fn display_names_resolve_with_fallback() {
        let now = at(2026, 3, 10, 12);
        let sessions = vec![session(1, 50, at(2026, 3, 10, 9))];
        let mut names = HashMap::new();
        names.insert(1, "ada".to_string());
        let board = build_leaderboard(&sessions, &names, Period::AllTime, now);
        assert_eq!(board[0].display_name, "ada");

        let board = build_leaderboard(&sessions, &HashMap::new(), Period::AllTime, now);
        assert_eq!(board[0].display_name, "user-1");
    }
}
