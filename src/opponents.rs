// src/opponents.rs

use crate::constants::*;
use crate::models::{Board, Choice, Mark, Outcome};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

// --- Grid Game Heuristic ---

/// Picks the opponent's next cell on a 3x3 board.
///
/// Priority list, first match wins: complete own two-in-a-row, block the
/// human's two-in-a-row, take the center, take a random empty corner, take a
/// random empty cell. With probability `random_move_probability` the whole
/// list is skipped in favor of a uniform-random empty cell; that single
/// parameter is the difficulty knob.
///
/// Returns None when the board is full.
pub fn choose_grid_move(
    board: &Board,
    ai_mark: Mark,
    random_move_probability: f64,
    rng: &mut impl Rng,
) -> Option<usize> {
    let empty: Vec<usize> = (0..GRID_CELLS).filter(|&i| board[i].is_none()).collect();
    if empty.is_empty() {
        return None;
    }

    if random_move_probability > 0.0 && rng.gen::<f64>() < random_move_probability {
        let cell = *empty.choose(rng)?;
        debug!("[Grid] Random move (p={:.2}): cell {}", random_move_probability, cell);
        return Some(cell);
    }

    // 1. Take the win.
    if let Some(cell) = completing_cell(board, ai_mark) {
        debug!("[Grid] Winning move: cell {}", cell);
        return Some(cell);
    }

    // 2. Block the human.
    if let Some(cell) = completing_cell(board, ai_mark.other()) {
        debug!("[Grid] Blocking move: cell {}", cell);
        return Some(cell);
    }

    // 3. Center.
    if board[GRID_CENTER].is_none() {
        debug!("[Grid] Taking center");
        return Some(GRID_CENTER);
    }

    // 4. Random empty corner.
    let corners: Vec<usize> = GRID_CORNERS
        .iter()
        .copied()
        .filter(|&i| board[i].is_none())
        .collect();
    if let Some(&cell) = corners.choose(rng) {
        debug!("[Grid] Corner move: cell {}", cell);
        return Some(cell);
    }

    // 5. Anything left.
    let cell = *empty.choose(rng)?;
    debug!("[Grid] Fallback move: cell {}", cell);
    Some(cell)
}

/// The empty cell that completes a two-in-a-row for `mark`, if any.
fn completing_cell(board: &Board, mark: Mark) -> Option<usize> {
    for line in &WIN_LINES {
        let mut owned = 0;
        let mut open = None;
        for &i in line {
            match board[i] {
                Some(m) if m == mark => owned += 1,
                None => open = Some(i),
                Some(_) => {}
            }
        }
        if owned == 2 {
            if let Some(cell) = open {
                return Some(cell);
            }
        }
    }
    None
}

/// Whether `mark` holds a completed winning line.
pub fn grid_winner(board: &Board, mark: Mark) -> bool {
    WIN_LINES
        .iter()
        .any(|line| line.iter().all(|&i| board[i] == Some(mark)))
}

// --- Simultaneous-Choice Adaptive Opponent ---

/// Counter-strategy over the human's trailing choices.
///
/// Looks at the most recent `window` entries of `history`, finds the modal
/// choice (frequency ties broken by the most recent occurrence) and plays
/// its counter with probability `counter_probability`; otherwise, and
/// whenever the history is still shorter than the window, picks uniformly at
/// random. Re-derived from the history slice on every call; nothing is
/// retained between calls.
pub fn choose_counter_move(
    history: &[Choice],
    window: usize,
    counter_probability: f64,
    rng: &mut impl Rng,
) -> Choice {
    if history.len() >= window && rng.gen::<f64>() < counter_probability {
        let tail = &history[history.len() - window..];
        let modal = modal_choice(tail);
        let counter = modal.beaten_by();
        debug!("[Adaptive] Modal {:?} in window, countering with {:?}", modal, counter);
        return counter;
    }
    *Choice::ALL.choose(rng).unwrap_or(&Choice::Rock)
}

/// Most frequent choice in the slice; on equal counts the one seen most
/// recently wins.
fn modal_choice(window: &[Choice]) -> Choice {
    let mut best = window[window.len() - 1];
    let mut best_count = 0;
    let mut best_recency = 0;
    for candidate in Choice::ALL {
        let count = window.iter().filter(|&&c| c == candidate).count();
        let recency = window.iter().rposition(|&c| c == candidate);
        if let Some(recency) = recency {
            if count > best_count || (count == best_count && recency > best_recency) {
                best = candidate;
                best_count = count;
                best_recency = recency;
            }
        }
    }
    best
}

/// Pure outcome resolution from the player's perspective.
pub fn resolve(player: Choice, opponent: Choice) -> Outcome {
    if player == opponent {
        Outcome::Draw
    } else if player.beats() == opponent {
        Outcome::Win
    } else {
        Outcome::Lose
    }
}
