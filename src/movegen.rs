//! Legal move generation.
//!
//! Dice are consumed one at a time. When the mover has a checker on the bar
//! only re-entry is considered; otherwise every owned point is tried with the
//! current die and filtered through blocking and bear-off eligibility. A die
//! that cannot be played is skipped and the remaining dice are still tried.
//!
//! The result keeps only sequences that play as many dice as possible (and
//! the larger die when just one of a non-double fits), de-duplicated by the
//! board they reach. An empty result is a forced pass.

use std::collections::HashSet;

use crate::board::{Board, Color, Move, MoveSequence};
use crate::dice::Roll;

/// A finished candidate turn.
struct Candidate {
    moves: Vec<(Move, u8)>,
    board: Board,
}

/// All single-checker moves for one die.
pub fn single_moves(board: &Board, die: u8, color: Color) -> Vec<Move> {
    if board.has_bar(color) {
        let to = color.entry_point(die);
        if board.is_blocked(to, color) {
            return Vec::new();
        }
        return vec![Move::new(color.bar_slot(), to)];
    }

    board
        .occupied(color)
        .filter_map(|from| {
            let to = board.target(from, die, color);
            if to == color.off_slot() {
                board
                    .can_bear_off(from, die, color)
                    .then_some(Move::new(from, to))
            } else if board.is_blocked(to, color) {
                None
            } else {
                Some(Move::new(from, to))
            }
        })
        .collect()
}

/// Every distinct legal turn together with the board it produces.
///
/// Order is deterministic: larger die first, then points in index order.
pub fn legal_successors(board: &Board, roll: Roll, color: Color) -> Vec<(MoveSequence, Board)> {
    let orders: Vec<Vec<u8>> = if roll.is_double() {
        vec![roll.dice()]
    } else {
        vec![
            vec![roll.high(), roll.low()],
            vec![roll.low(), roll.high()],
        ]
    };

    let mut found = Vec::new();
    for dice in &orders {
        let mut visited = HashSet::new();
        let mut path = Vec::with_capacity(dice.len());
        extend(board, dice, 0, color, &mut path, &mut visited, &mut found);
    }

    let longest = found.iter().map(|c| c.moves.len()).max().unwrap_or(0);
    if longest == 0 {
        return Vec::new();
    }
    found.retain(|c| c.moves.len() == longest);

    if !roll.is_double() && longest == 1 {
        let uses_high = |c: &Candidate| c.moves[0].1 == roll.high();
        if found.iter().any(uses_high) {
            found.retain(uses_high);
        }
    }

    let mut seen = HashSet::new();
    found
        .into_iter()
        .filter(|c| seen.insert(c.board))
        .map(|c| (c.moves.into_iter().map(|(mv, _)| mv).collect(), c.board))
        .collect()
}

/// Every distinct legal move sequence for `roll`. Empty means the turn is passed.
pub fn legal_move_sequences(board: &Board, roll: Roll, color: Color) -> Vec<MoveSequence> {
    legal_successors(board, roll, color)
        .into_iter()
        .map(|(seq, _)| seq)
        .collect()
}

/// Whether `color` can play at least one die of `roll`.
pub fn has_legal_move(board: &Board, roll: Roll, color: Color) -> bool {
    roll.dice()
        .iter()
        .any(|&die| !single_moves(board, die, color).is_empty())
}

fn extend(
    board: &Board,
    dice: &[u8],
    depth: usize,
    color: Color,
    path: &mut Vec<(Move, u8)>,
    visited: &mut HashSet<(Board, usize, usize)>,
    out: &mut Vec<Candidate>,
) {
    if depth == dice.len() || board.is_win(color) {
        out.push(Candidate {
            moves: path.clone(),
            board: *board,
        });
        return;
    }
    // Transpositions inside one ordering lead to the same set of final boards.
    if !visited.insert((*board, depth, path.len())) {
        return;
    }

    let die = dice[depth];
    let moves = single_moves(board, die, color);
    if moves.is_empty() {
        extend(board, dice, depth + 1, color, path, visited, out);
        return;
    }
    for mv in moves {
        let mut next = *board;
        next.simulate_move(mv, color);
        path.push((mv, die));
        extend(&next, dice, depth + 1, color, path, visited, out);
        path.pop();
    }
}
