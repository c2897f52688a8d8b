// src/constants.rs

// --- Scoring ---
pub const DEFAULT_HINT_PENALTY: i64 = 15; // Points lost per revealed hint
pub const DEFAULT_PASSING_PERCENT: f64 = 70.0;

// --- Grid game (3x3) ---
pub const GRID_CELLS: usize = 9;
pub const GRID_CENTER: usize = 4;
pub const GRID_CORNERS: [usize; 4] = [0, 2, 6, 8];

// The 8 winning lines: rows, columns, diagonals.
pub const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

// Probability that the opponent ignores the priority list and plays a
// uniform-random empty cell. The single difficulty knob.
pub const GRID_RANDOM_PROBABILITY_EASY: f64 = 0.75;
pub const GRID_RANDOM_PROBABILITY_MEDIUM: f64 = 0.35;
pub const GRID_RANDOM_PROBABILITY_HARD: f64 = 0.0;

// --- Simultaneous-choice game ---
pub const ADAPTIVE_WINDOW: usize = 3; // Trailing human choices examined
pub const ADAPTIVE_COUNTER_PROBABILITY: f64 = 0.6; // Chance of countering the modal choice
