//! Constants for board geometry, search parameters, and move priors.
//!
//! The board is a 10x9 grid of intersections; rows are numbered 0..9 from
//! Black's back rank (top) down to Red's back rank (bottom), columns 0..8
//! left to right. Red moves first in a fresh game.

// =============================================================================
// Board Geometry
// =============================================================================

/// Number of rows (ranks) on the board.
pub const ROWS: usize = 10;

/// Number of columns (files) on the board.
pub const COLS: usize = 9;

/// Palace column range, shared by both sides.
pub const PALACE_COL_MIN: usize = 3;
pub const PALACE_COL_MAX: usize = 5;

/// Black's palace occupies rows 0..=2.
pub const BLACK_PALACE_ROW_MAX: usize = 2;

/// Red's palace occupies rows 7..=9.
pub const RED_PALACE_ROW_MIN: usize = 7;

/// The river runs between rows 4 and 5: Black's half is rows 0..=4,
/// Red's half is rows 5..=9.
pub const BLACK_RIVER_ROW_MAX: usize = 4;
pub const RED_RIVER_ROW_MIN: usize = 5;

// =============================================================================
// MCTS (Monte Carlo Tree Search) Parameters
// =============================================================================

/// Default number of simulations per move.
pub const N_SIMS: usize = 1000;

/// UCT exploration constant (approximately sqrt(2)).
pub const UCT_C: f64 = 1.41;

/// Default weight for the heuristic bonus layered on UCT during selection.
/// A weight of 0.0 recovers pure UCT.
pub const BONUS_WEIGHT: f64 = 0.3;

/// Ply cap for rollouts; a playout that reaches it without a terminal
/// position is scored as a draw.
pub const ROLLOUT_MAX_PLIES: usize = 100;

// =============================================================================
// Move Priors (static move-bias weights)
// =============================================================================

/// Prior for a move that gives check.
pub const PRIOR_CHECK: u32 = 50;

/// Prior for a move that restricts the opponent general's mobility.
pub const PRIOR_KING_TRAP: u32 = 20;

/// Prior for a move that lands on or attacks an opponent palace square.
pub const PRIOR_KEY_SQUARE: u32 = 15;

/// Divisor normalizing a combined prior into the UCT value range.
pub const PRIOR_SCALE: f64 = 100.0;
