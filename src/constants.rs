//! Constants for the board layout, game rules and engine parameters.
//!
//! Every component reads slot positions from here. The board is a flat array
//! of 28 signed counts:
//!
//! ```text
//!  0..=23   points (White > 0, Black < 0)
//!  24       White bar      25  Black bar
//!  26       White off      27  Black off
//! ```
//!
//! White moves from point 0 towards point 23 and bears off from 18..=23.
//! Black moves from point 23 towards point 0 and bears off from 0..=5.

use std::time::Duration;

// =============================================================================
// Board Geometry
// =============================================================================

/// Number of playable points.
pub const NUM_POINTS: usize = 24;

/// Total board array length: 24 points plus two bar and two off slots.
pub const BOARD_LEN: usize = 28;

/// Bar slot for White.
pub const WHITE_BAR: usize = 24;

/// Bar slot for Black.
pub const BLACK_BAR: usize = 25;

/// Borne-off slot for White.
pub const WHITE_OFF: usize = 26;

/// Borne-off slot for Black.
pub const BLACK_OFF: usize = 27;

/// Points in one quadrant.
pub const QUADRANT: usize = 6;

/// Checkers per side.
pub const CHECKERS: u8 = 15;

/// Pip value charged for a checker on the bar.
pub const BAR_PIPS: u32 = 25;

/// The standard opening position.
pub const START_BOARD: [i8; BOARD_LEN] = [
    2, 0, 0, 0, 0, -5, 0, -3, 0, 0, 0, 5, -5, 0, 0, 0, 3, 0, 5, 0, 0, 0, 0, -2, 0, 0, 0, 0,
];

// =============================================================================
// Dice
// =============================================================================

/// Faces on a die.
pub const DIE_FACES: u8 = 6;

/// Number of distinct rolls (15 non-doubles plus 6 doubles).
pub const DISTINCT_ROLLS: usize = 21;

/// Longest distance covered by the hit-probability table.
pub const MAX_HIT_DISTANCE: usize = 12;

// =============================================================================
// Search Parameters
// =============================================================================

/// Default UCB1 exploration constant.
pub const MCTS_C: f64 = 1.4;

/// Default MCTS wall-clock budget per move.
pub const MCTS_BUDGET: Duration = Duration::from_secs(2);

/// Default expectiminimax depth in plies.
pub const SEARCH_DEPTH: usize = 2;

/// Default RNG seed for reproducible play.
pub const DEFAULT_SEED: u64 = 0x5eed;

// =============================================================================
// Evaluator Weights
// =============================================================================

/// Tolerance on the weight sum.
pub const WEIGHT_EPSILON: f64 = 1e-6;

/// Number of evaluator sub-features.
pub const NUM_FEATURES: usize = 6;

/// Shortest run of made points that counts as a prime.
pub const PRIME_MIN_LEN: usize = 3;

/// Default feature weights, in the order
/// prime, anchors, blots, race, home board, captured.
pub const DEFAULT_WEIGHTS: [f64; NUM_FEATURES] = [0.2, 0.1, 0.15, 0.3, 0.15, 0.1];
