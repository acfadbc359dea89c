//! Rollout policies (random game simulation).
//!
//! A rollout plays a position forward from a search-tree leaf to produce a
//! value estimate. Two policies exist, selected by [`RolloutPolicy`]:
//!
//! - [`RolloutPolicy::TerminalAware`] plays uniformly random *legal* moves
//!   (self-check filtered) until a side has no legal reply. That side has
//!   been mated or stalemated and loses either way, so the terminal test is
//!   simply "the legal move list is empty" — no per-ply checkmate scan.
//! - [`RolloutPolicy::FixedHorizonMaterial`] plays a bounded number of
//!   unfiltered in-range moves and then compares surviving piece counts.
//!   It is much cheaper and deliberately approximate: rollout moves can be
//!   illegal, generals can be captured.
//!
//! Values are from a fixed Black perspective: 1.0 a Black win, 0.0 a Red
//! win, 0.5 a draw (ply cap reached without a terminal position).

use crate::board::{GameState, Move, Side};
use crate::constants::{COLS, ROWS};
use crate::rules::legal_moves;

/// Which rollout policy a search uses.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RolloutPolicy {
    /// Random legal moves to a detected terminal position (accurate).
    #[default]
    TerminalAware,
    /// Bounded random in-range moves, then a material count (cheap).
    FixedHorizonMaterial,
}

/// Rollout value for a win by the given side.
#[inline]
fn win_for(side: Side) -> f64 {
    match side {
        Side::Black => 1.0,
        Side::Red => 0.0,
    }
}

/// Play a rollout from `state` and return its Black-perspective value.
pub fn simulate(
    state: &GameState,
    policy: RolloutPolicy,
    max_plies: usize,
    rng: &mut fastrand::Rng,
) -> f64 {
    match policy {
        RolloutPolicy::TerminalAware => terminal_aware(state, max_plies, rng),
        RolloutPolicy::FixedHorizonMaterial => fixed_horizon_material(state, max_plies, rng),
    }
}

fn terminal_aware(state: &GameState, max_plies: usize, rng: &mut fastrand::Rng) -> f64 {
    let mut board = state.board.clone();
    let mut side = state.to_move;

    for _ in 0..max_plies {
        let moves = legal_moves(&board, side);
        if moves.is_empty() {
            // Mate or stalemate: the stuck side loses either way.
            return win_for(side.flip());
        }
        let mv = moves[rng.usize(..moves.len())];
        board.apply(mv);
        side = side.flip();
    }
    0.5
}

fn fixed_horizon_material(state: &GameState, max_plies: usize, rng: &mut fastrand::Rng) -> f64 {
    let mut board = state.board.clone();
    let mut side = state.to_move;

    for _ in 0..max_plies {
        let own = board.pieces(side);
        if own.is_empty() {
            break;
        }
        // Any in-range destination will do; legality is not checked here.
        let (from, _) = own[rng.usize(..own.len())];
        let to = (rng.usize(..ROWS), rng.usize(..COLS));
        board.apply(Move::new(from, to));
        side = side.flip();
    }

    if board.count(Side::Black) > board.count(Side::Red) {
        1.0
    } else {
        0.0
    }
}
