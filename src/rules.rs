//! Xiangqi movement legality, check, and checkmate detection.
//!
//! This module provides the rule core as free functions over a [`Board`]:
//! - pseudo-legal movement tests per piece kind (geometry + blocking)
//! - check detection, including the facing-generals special case
//! - checkmate detection by exhaustive trial
//! - legal move generation (pseudo-legal minus self-check)
//!
//! Pseudo-legal means the move obeys the piece's geometry and blocking
//! rules and does not land on a friendly piece; it says nothing about
//! whether the mover's own general ends up in check. Interactive play and
//! search must go through [`legal_moves`] (or filter with
//! [`leaves_self_in_check`]) to rule out suicidal moves.

use crate::board::{Board, Move, Piece, PieceKind, Side, Square};
use crate::constants::{
    BLACK_PALACE_ROW_MAX, BLACK_RIVER_ROW_MAX, COLS, PALACE_COL_MAX, PALACE_COL_MIN,
    RED_PALACE_ROW_MIN, RED_RIVER_ROW_MIN, ROWS,
};

/// True iff the square lies inside the given side's palace.
#[inline]
pub fn in_palace(side: Side, sq: Square) -> bool {
    let (row, col) = sq;
    if !(PALACE_COL_MIN..=PALACE_COL_MAX).contains(&col) {
        return false;
    }
    match side {
        Side::Red => row >= RED_PALACE_ROW_MIN,
        Side::Black => row <= BLACK_PALACE_ROW_MAX,
    }
}

/// Number of occupied squares strictly between two squares on a shared
/// rank or file, or `None` if the squares share neither.
fn pieces_between(board: &Board, from: Square, to: Square) -> Option<usize> {
    let (fr, fc) = from;
    let (tr, tc) = to;
    if fr == tr {
        let (lo, hi) = (fc.min(tc), fc.max(tc));
        Some(
            (lo + 1..hi)
                .filter(|&col| board.get((fr, col)).is_some())
                .count(),
        )
    } else if fc == tc {
        let (lo, hi) = (fr.min(tr), fr.max(tr));
        Some(
            (lo + 1..hi)
                .filter(|&row| board.get((row, fc)).is_some())
                .count(),
        )
    } else {
        None
    }
}

fn general_ok(side: Side, from: Square, to: Square) -> bool {
    // Confined to the palace, one orthogonal step at a time.
    in_palace(side, to) && from.0.abs_diff(to.0) + from.1.abs_diff(to.1) == 1
}

fn advisor_ok(side: Side, from: Square, to: Square) -> bool {
    in_palace(side, to) && from.0.abs_diff(to.0) == 1 && from.1.abs_diff(to.1) == 1
}

fn elephant_ok(board: &Board, side: Side, from: Square, to: Square) -> bool {
    // May not cross the river.
    let stays_home = match side {
        Side::Red => to.0 >= RED_RIVER_ROW_MIN,
        Side::Black => to.0 <= BLACK_RIVER_ROW_MAX,
    };
    if !stays_home {
        return false;
    }
    if from.0.abs_diff(to.0) != 2 || from.1.abs_diff(to.1) != 2 {
        return false;
    }
    // Blocked if the diagonal midpoint ("elephant eye") is occupied.
    let eye = ((from.0 + to.0) / 2, (from.1 + to.1) / 2);
    board.get(eye).is_none()
}

fn horse_ok(board: &Board, from: Square, to: Square) -> bool {
    let row_diff = from.0.abs_diff(to.0);
    let col_diff = from.1.abs_diff(to.1);
    if !((row_diff == 2 && col_diff == 1) || (row_diff == 1 && col_diff == 2)) {
        return false;
    }
    // Blocked only at the leg: the orthogonal neighbor of the origin in
    // the long-axis direction.
    let leg = if row_diff == 2 {
        ((from.0 + to.0) / 2, from.1)
    } else {
        (from.0, (from.1 + to.1) / 2)
    };
    board.get(leg).is_none()
}

fn chariot_ok(board: &Board, from: Square, to: Square) -> bool {
    pieces_between(board, from, to) == Some(0)
}

fn cannon_ok(board: &Board, from: Square, to: Square) -> bool {
    let Some(between) = pieces_between(board, from, to) else {
        return false;
    };
    // Capturing requires exactly one screen; a quiet move a clear path.
    if board.get(to).is_some() {
        between == 1
    } else {
        between == 0
    }
}

fn soldier_ok(side: Side, from: Square, to: Square) -> bool {
    match side {
        Side::Red => {
            let forward = to.1 == from.1 && to.0 + 1 == from.0;
            if from.0 >= RED_RIVER_ROW_MIN {
                // Not yet across the river: forward only.
                forward
            } else {
                forward || (to.0 == from.0 && from.1.abs_diff(to.1) == 1)
            }
        }
        Side::Black => {
            let forward = to.1 == from.1 && to.0 == from.0 + 1;
            if from.0 <= BLACK_RIVER_ROW_MAX {
                forward
            } else {
                forward || (to.0 == from.0 && from.1.abs_diff(to.1) == 1)
            }
        }
    }
}

/// True iff moving the piece at `from` to `to` obeys that piece's movement
/// geometry and blocking rules and does not land on a friendly piece.
///
/// Out-of-board destinations return `false` so the function is safe to
/// probe speculatively. An empty origin square is a caller error; it is
/// asserted in debug builds and answered with `false` in release builds.
pub fn pseudo_legal(board: &Board, from: Square, to: Square) -> bool {
    if !Board::in_bounds(to.0, to.1) {
        return false;
    }
    debug_assert!(
        board.get(from).is_some(),
        "pseudo_legal probed an empty origin square {from:?}"
    );
    let Some(piece) = board.get(from) else {
        return false;
    };
    if let Some(target) = board.get(to) {
        if target.side == piece.side {
            return false;
        }
    }
    match piece.kind {
        PieceKind::General => general_ok(piece.side, from, to),
        PieceKind::Advisor => advisor_ok(piece.side, from, to),
        PieceKind::Elephant => elephant_ok(board, piece.side, from, to),
        PieceKind::Horse => horse_ok(board, from, to),
        PieceKind::Chariot => chariot_ok(board, from, to),
        PieceKind::Cannon => cannon_ok(board, from, to),
        PieceKind::Soldier => soldier_ok(piece.side, from, to),
    }
}

/// Locate the general of the given side, if it is still on the board.
/// Rollouts can reach degenerate positions with a captured general, so a
/// missing general is an answer here, not an error.
pub fn find_general(board: &Board, side: Side) -> Option<Square> {
    for row in 0..ROWS {
        for col in 0..COLS {
            if board.get((row, col))
                == Some(Piece {
                    side,
                    kind: PieceKind::General,
                })
            {
                return Some((row, col));
            }
        }
    }
    None
}

/// True iff both generals stand on the same file with nothing between
/// them. This is the "facing generals" condition, treated as check against
/// both sides.
pub fn generals_facing(board: &Board) -> bool {
    let (Some(red), Some(black)) = (
        find_general(board, Side::Red),
        find_general(board, Side::Black),
    ) else {
        return false;
    };
    red.1 == black.1 && pieces_between(board, black, red) == Some(0)
}

/// True iff any piece of `by` has a pseudo-legal move onto `target`.
pub fn is_square_attacked(board: &Board, target: Square, by: Side) -> bool {
    board
        .pieces(by)
        .iter()
        .any(|&(from, _)| pseudo_legal(board, from, target))
}

/// True iff the given side's general is in check: either the generals face
/// each other on an open file, or an opposing piece attacks the general's
/// square. With either general missing there is no check.
pub fn is_in_check(board: &Board, side: Side) -> bool {
    let (Some(red), Some(black)) = (
        find_general(board, Side::Red),
        find_general(board, Side::Black),
    ) else {
        return false;
    };
    if generals_facing(board) {
        return true;
    }
    let own = match side {
        Side::Red => red,
        Side::Black => black,
    };
    is_square_attacked(board, own, side.flip())
}

/// True iff `mv` would leave the mover's own general in check. The move is
/// tried on a scratch copy; the origin must hold a piece.
pub fn leaves_self_in_check(board: &Board, mv: Move) -> bool {
    debug_assert!(board.get(mv.from).is_some(), "trial of empty origin {mv}");
    let Some(piece) = board.get(mv.from) else {
        return false;
    };
    let mut scratch = board.clone();
    scratch.apply(mv);
    is_in_check(&scratch, piece.side)
}

/// All pseudo-legal moves for the given side. Cheaper than [`legal_moves`];
/// callers that use it are responsible for self-check filtering.
pub fn pseudo_legal_moves(board: &Board, side: Side) -> Vec<Move> {
    let mut moves = Vec::new();
    for (from, _) in board.pieces(side) {
        for row in 0..ROWS {
            for col in 0..COLS {
                if pseudo_legal(board, from, (row, col)) {
                    moves.push(Move::new(from, (row, col)));
                }
            }
        }
    }
    moves
}

/// All legal moves for the given side: pseudo-legal moves that do not
/// leave the mover's own general in check. Search and interactive play go
/// through this.
pub fn legal_moves(board: &Board, side: Side) -> Vec<Move> {
    pseudo_legal_moves(board, side)
        .into_iter()
        .filter(|&mv| !leaves_self_in_check(board, mv))
        .collect()
}

/// True iff the given side is checkmated: in check, with no pseudo-legal
/// move that escapes it. The not-in-check fast path keeps this out of hot
/// loops for quiet positions; the exhaustive trial behind it is the
/// dominant cost and is only paid when a check is actually on the board.
pub fn is_checkmate(board: &Board, side: Side) -> bool {
    if !is_in_check(board, side) {
        return false;
    }
    for mv in pseudo_legal_moves(board, side) {
        let mut scratch = board.clone();
        scratch.apply(mv);
        if !is_in_check(&scratch, side) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(board: &mut Board, side: Side, kind: PieceKind, sq: Square) {
        board.set(sq, Some(Piece::new(side, kind)));
    }

    /// Both generals on separate files so fixtures are not in spurious
    /// facing-generals check.
    fn bare_kings() -> Board {
        let mut board = Board::empty();
        place(&mut board, Side::Red, PieceKind::General, (9, 4));
        place(&mut board, Side::Black, PieceKind::General, (0, 3));
        board
    }

    #[test]
    fn test_general_single_step_in_palace() {
        let board = bare_kings();
        assert!(pseudo_legal(&board, (9, 4), (8, 4)));
        assert!(pseudo_legal(&board, (9, 4), (9, 3)));
        // Diagonal and double steps are out.
        assert!(!pseudo_legal(&board, (9, 4), (8, 3)));
        assert!(!pseudo_legal(&board, (9, 4), (7, 4)));
    }

    #[test]
    fn test_general_cannot_leave_palace() {
        let mut board = bare_kings();
        board.apply(Move::new((9, 4), (9, 3)));
        // c9 is outside the palace columns.
        assert!(!pseudo_legal(&board, (9, 3), (9, 2)));
    }

    #[test]
    fn test_advisor_diagonal_in_palace() {
        let mut board = bare_kings();
        place(&mut board, Side::Red, PieceKind::Advisor, (9, 3));
        assert!(pseudo_legal(&board, (9, 3), (8, 4)));
        assert!(!pseudo_legal(&board, (9, 3), (8, 3)));
        // Diagonal step out of the palace.
        assert!(!pseudo_legal(&board, (9, 3), (8, 2)));
    }

    #[test]
    fn test_elephant_blocked_by_eye() {
        let mut board = bare_kings();
        place(&mut board, Side::Red, PieceKind::Elephant, (9, 2));
        assert!(pseudo_legal(&board, (9, 2), (7, 0)));

        place(&mut board, Side::Red, PieceKind::Soldier, (8, 1));
        assert!(!pseudo_legal(&board, (9, 2), (7, 0)));
    }

    #[test]
    fn test_elephant_cannot_cross_river() {
        let mut board = bare_kings();
        place(&mut board, Side::Red, PieceKind::Elephant, (5, 2));
        assert!(!pseudo_legal(&board, (5, 2), (3, 0)));
        place(&mut board, Side::Black, PieceKind::Elephant, (4, 6));
        assert!(!pseudo_legal(&board, (4, 6), (6, 8)));
    }

    #[test]
    fn test_horse_leg_block() {
        let mut board = bare_kings();
        place(&mut board, Side::Red, PieceKind::Horse, (5, 4));
        assert!(pseudo_legal(&board, (5, 4), (3, 5)));
        assert!(pseudo_legal(&board, (5, 4), (4, 6)));

        // A piece on the vertical leg blocks the (2,1) jumps upward only.
        place(&mut board, Side::Black, PieceKind::Soldier, (4, 4));
        assert!(!pseudo_legal(&board, (5, 4), (3, 5)));
        assert!(!pseudo_legal(&board, (5, 4), (3, 3)));
        assert!(pseudo_legal(&board, (5, 4), (4, 6)));
    }

    #[test]
    fn test_chariot_path_must_be_clear() {
        let mut board = bare_kings();
        place(&mut board, Side::Red, PieceKind::Chariot, (5, 0));
        assert!(pseudo_legal(&board, (5, 0), (5, 8)));

        place(&mut board, Side::Black, PieceKind::Soldier, (5, 4));
        assert!(!pseudo_legal(&board, (5, 0), (5, 8)));
        // Capturing the blocker itself is fine.
        assert!(pseudo_legal(&board, (5, 0), (5, 4)));
    }

    #[test]
    fn test_cannon_screen_arithmetic() {
        let mut board = bare_kings();
        place(&mut board, Side::Red, PieceKind::Cannon, (5, 0));
        place(&mut board, Side::Black, PieceKind::Horse, (5, 8));

        // No screen: quiet moves yes, capture no.
        assert!(pseudo_legal(&board, (5, 0), (5, 7)));
        assert!(!pseudo_legal(&board, (5, 0), (5, 8)));

        // One screen: capture yes, flying over for a quiet move no.
        place(&mut board, Side::Red, PieceKind::Soldier, (5, 3));
        assert!(pseudo_legal(&board, (5, 0), (5, 8)));
        assert!(!pseudo_legal(&board, (5, 0), (5, 7)));

        // Two screens: capture no.
        place(&mut board, Side::Black, PieceKind::Soldier, (5, 6));
        assert!(!pseudo_legal(&board, (5, 0), (5, 8)));
    }

    #[test]
    fn test_soldier_before_and_after_river() {
        let mut board = bare_kings();
        place(&mut board, Side::Red, PieceKind::Soldier, (6, 2));
        assert!(pseudo_legal(&board, (6, 2), (5, 2)));
        assert!(!pseudo_legal(&board, (6, 2), (6, 1)));
        assert!(!pseudo_legal(&board, (6, 2), (7, 2)));

        // Across the river the soldier gains the sideways step.
        place(&mut board, Side::Red, PieceKind::Soldier, (4, 6));
        assert!(pseudo_legal(&board, (4, 6), (3, 6)));
        assert!(pseudo_legal(&board, (4, 6), (4, 5)));
        assert!(!pseudo_legal(&board, (4, 6), (5, 6)));
    }

    #[test]
    fn test_cannot_capture_own_piece() {
        let mut board = bare_kings();
        place(&mut board, Side::Red, PieceKind::Chariot, (5, 0));
        place(&mut board, Side::Red, PieceKind::Soldier, (5, 5));
        assert!(!pseudo_legal(&board, (5, 0), (5, 5)));
    }

    #[test]
    fn test_out_of_board_rejected() {
        let board = bare_kings();
        assert!(!pseudo_legal(&board, (9, 4), (10, 4)));
        assert!(!pseudo_legal(&board, (9, 4), (9, 9)));
    }

    #[test]
    fn test_facing_generals_is_check_for_both() {
        let mut board = Board::empty();
        place(&mut board, Side::Red, PieceKind::General, (9, 4));
        place(&mut board, Side::Black, PieceKind::General, (0, 4));

        assert!(generals_facing(&board));
        assert!(is_in_check(&board, Side::Red));
        assert!(is_in_check(&board, Side::Black));

        // Any piece in between clears the condition.
        place(&mut board, Side::Red, PieceKind::Soldier, (4, 4));
        assert!(!generals_facing(&board));
        assert!(!is_in_check(&board, Side::Red));
    }

    #[test]
    fn test_chariot_check() {
        let mut board = bare_kings();
        place(&mut board, Side::Black, PieceKind::Chariot, (5, 4));
        assert!(is_in_check(&board, Side::Red));
        assert!(!is_in_check(&board, Side::Black));
    }

    #[test]
    fn test_missing_general_is_never_check() {
        let mut board = Board::empty();
        place(&mut board, Side::Red, PieceKind::General, (9, 4));
        place(&mut board, Side::Black, PieceKind::Chariot, (9, 0));
        assert!(!is_in_check(&board, Side::Red));
        assert!(!is_in_check(&board, Side::Black));
        assert!(!is_checkmate(&board, Side::Red));
    }

    #[test]
    fn test_legal_moves_exclude_self_check() {
        let mut board = bare_kings();
        // Red soldier on e4 shields the red general from the black chariot
        // behind it; the soldier may not step aside.
        place(&mut board, Side::Red, PieceKind::Soldier, (4, 4));
        place(&mut board, Side::Black, PieceKind::Chariot, (2, 4));

        let pinned = Move::new((4, 4), (4, 3));
        assert!(pseudo_legal(&board, pinned.from, pinned.to));
        assert!(leaves_self_in_check(&board, pinned));
        assert!(!legal_moves(&board, Side::Red).contains(&pinned));
        // Pushing straight ahead keeps the shield on the file.
        assert!(legal_moves(&board, Side::Red).contains(&Move::new((4, 4), (3, 4))));
    }

    #[test]
    fn test_checkmate_not_in_check_fast_path() {
        let board = Board::opening();
        assert!(!is_checkmate(&board, Side::Red));
        assert!(!is_checkmate(&board, Side::Black));
    }
}
