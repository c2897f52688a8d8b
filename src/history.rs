// src/history.rs

use crate::models::{Choice, GameStats, Outcome, RoundOutcome};
use crate::opponents::resolve;
use log::debug;

/// Append-only log of mini-game rounds for one user-device session.
///
/// Feeds the adaptive opponent (the human's past choices) and the streak and
/// tally computation. Stats are recomputed from the log on every call rather
/// than kept as counters, so they cannot drift from the rounds they claim to
/// summarize.
#[derive(Debug, Default)]
pub struct RoundHistory {
    rounds: Vec<RoundOutcome>,
}

impl RoundHistory {
    pub fn new() -> Self {
        RoundHistory::default()
    }

    /// Resolves a round and appends it, assigning the next sequence number.
    pub fn record(&mut self, player: Choice, opponent: Choice) -> RoundOutcome {
        let outcome = RoundOutcome {
            player,
            opponent,
            result: resolve(player, opponent),
            sequence: self.rounds.len() as u64 + 1,
        };
        debug!(
            "[History] Round {}: {:?} vs {:?} -> {:?}",
            outcome.sequence, player, opponent, outcome.result
        );
        self.rounds.push(outcome);
        outcome
    }

    pub fn rounds(&self) -> &[RoundOutcome] {
        &self.rounds
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// The human's choices in play order, as the adaptive opponent wants them.
    pub fn player_choices(&self) -> Vec<Choice> {
        self.rounds.iter().map(|r| r.player).collect()
    }

    /// Recomputes the tallies and streaks from the full log.
    pub fn stats(&self) -> GameStats {
        let mut stats = GameStats::default();
        let mut streak = 0;
        for round in &self.rounds {
            stats.played += 1;
            match round.result {
                Outcome::Win => {
                    stats.wins += 1;
                    streak += 1;
                    stats.best_streak = stats.best_streak.max(streak);
                }
                Outcome::Lose => {
                    stats.losses += 1;
                    streak = 0;
                }
                Outcome::Draw => {
                    stats.draws += 1;
                    streak = 0;
                }
            }
        }
        stats.current_streak = streak;
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_are_monotonic_from_one() {
        let mut history = RoundHistory::new();
        let a = history.record(Choice::Rock, Choice::Scissors);
        let b = history.record(Choice::Rock, Choice::Paper);
        assert_eq!(a.sequence, 1);
        assert_eq!(b.sequence, 2);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn stats_track_streaks_across_the_log() {
        let mut history = RoundHistory::new();
        // win, win, loss, win, draw
        history.record(Choice::Rock, Choice::Scissors);
        history.record(Choice::Paper, Choice::Rock);
        history.record(Choice::Rock, Choice::Paper);
        history.record(Choice::Scissors, Choice::Paper);
        history.record(Choice::Rock, Choice::Rock);

        let stats = history.stats();
        assert_eq!(stats.played, 5);
        assert_eq!(stats.wins, 3);
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.draws, 1);
        assert_eq!(stats.best_streak, 2);
        assert_eq!(stats.current_streak, 0);
    }

    #[test]
    fn recomputing_stats_is_stable() {
        let mut history = RoundHistory::new();
        history.record(Choice::Rock, Choice::Scissors);
        assert_eq!(history.stats(), history.stats());
    }

    #[test]
    fn player_choices_preserve_order() {
        let mut history = RoundHistory::new();
        history.record(Choice::Rock, Choice::Rock);
        history.record(Choice::Scissors, Choice::Rock);
        assert_eq!(
            history.player_choices(),
            vec![Choice::Rock, Choice::Scissors]
        );
    }
}
