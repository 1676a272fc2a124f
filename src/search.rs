//! One-ply heuristic search, expectiminimax and the random baseline.
//!
//! Every strategy works on copies of the board and returns the chosen move
//! sequence; an empty sequence means there is nothing legal to play.

use std::time::{Duration, Instant};

use log::debug;

use crate::board::{Board, Color, MoveSequence, format_sequence};
use crate::constants::SEARCH_DEPTH;
use crate::dice::{Roll, all_rolls};
use crate::eval::Evaluator;
use crate::movegen::legal_successors;
use crate::tree::{GameNode, GameTree, NodeId};

/// Expectiminimax parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExpectiminimaxConfig {
    /// Plies to search, counting the mover's own ply. Depth 1 equals the heuristic search.
    pub depth: usize,
    /// Optional time limit; once exceeded, remaining nodes are scored statically.
    pub budget_ms: Option<u64>,
}

impl Default for ExpectiminimaxConfig {
    fn default() -> Self {
        Self {
            depth: SEARCH_DEPTH,
            budget_ms: None,
        }
    }
}

/// Score every legal sequence and return the `n` best for `color`, best first.
///
/// Ties keep generation order.
pub fn rank_sequences(
    board: &Board,
    roll: Roll,
    color: Color,
    evaluator: &dyn Evaluator,
    n: usize,
) -> Vec<(MoveSequence, f64)> {
    let mut scored: Vec<(MoveSequence, f64)> = legal_successors(board, roll, color)
        .into_iter()
        .map(|(seq, next)| {
            let score = evaluator.evaluate(&next, color);
            (seq, score)
        })
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(n);
    scored
}

/// Depth-1 search: the sequence whose resulting board scores best for `color`.
pub fn heuristic_search(
    board: &Board,
    roll: Roll,
    color: Color,
    evaluator: &dyn Evaluator,
) -> MoveSequence {
    let mut best: Option<(MoveSequence, f64)> = None;
    for (seq, next) in legal_successors(board, roll, color) {
        let score = evaluator.evaluate(&next, color);
        if best.as_ref().is_none_or(|(_, b)| score > *b) {
            best = Some((seq, score));
        }
    }
    match best {
        Some((seq, score)) => {
            debug!("heuristic {color} plays {} ({score:.4})", format_sequence(&seq));
            seq
        }
        None => Vec::new(),
    }
}

/// A uniformly random legal sequence.
pub fn random_search(
    board: &Board,
    roll: Roll,
    color: Color,
    rng: &mut fastrand::Rng,
) -> MoveSequence {
    let mut candidates = legal_successors(board, roll, color);
    if candidates.is_empty() {
        return Vec::new();
    }
    let idx = rng.usize(..candidates.len());
    candidates.swap_remove(idx).0
}

/// Expectiminimax search to `config.depth` plies.
///
/// The mover's ply uses the actual roll. Every later ply is a chance node over
/// the 21 distinct rolls, weighted by their probability, followed by the best
/// reply of the side to move (max for `color`, min for the opponent).
///
/// The search stops expanding at the earlier of `deadline` and the configured
/// budget; chance nodes reached after that are scored statically.
pub fn expectiminimax_search(
    board: &Board,
    roll: Roll,
    color: Color,
    evaluator: &dyn Evaluator,
    config: &ExpectiminimaxConfig,
    deadline: Option<Instant>,
) -> MoveSequence {
    let budget_end = config.budget_ms.map(|ms| Instant::now() + Duration::from_millis(ms));
    let deadline = match (deadline, budget_end) {
        (Some(d), Some(b)) => Some(d.min(b)),
        (d, b) => d.or(b),
    };
    let mut tree = GameTree::new(*board, color, evaluator.evaluate(board, color));
    let root = tree.root();
    let search = Expectiminimax {
        evaluator,
        deadline,
    };
    let value = search.player_ply(&mut tree, root, roll, config.depth.max(1));
    tree.get_mut(root).evaluation = value;

    let best = tree
        .best_child_by_evaluation(root)
        .and_then(|c| tree.get(c).last_move().cloned())
        .unwrap_or_default();
    debug!(
        "expectiminimax {color} plays {} ({value:.4}, {} nodes)",
        format_sequence(&best),
        tree.len()
    );
    best
}

struct Expectiminimax<'a> {
    evaluator: &'a dyn Evaluator,
    deadline: Option<Instant>,
}

impl Expectiminimax<'_> {
    /// Expand `id` for `roll` and return the value of the best reply.
    fn player_ply(&self, tree: &mut GameTree, id: NodeId, roll: Roll, depth: usize) -> f64 {
        let board = tree.get(id).board;
        let to_move = tree.get(id).to_move;
        let maximize = to_move == tree.reference();

        let mut successors = legal_successors(&board, roll, to_move);
        if successors.is_empty() {
            successors.push((Vec::new(), board));
        }

        let mut best: Option<f64> = None;
        for (seq, next) in successors {
            let mut path = tree.get(id).path.clone();
            path.push(seq);
            let node = GameNode::new(next, 0.0, path, to_move.opponent()).with_roll(roll);
            let child = tree.add_child(id, node);
            let value = self.chance_value(tree, child, depth - 1);
            tree.get_mut(child).evaluation = value;
            best = Some(match best {
                None => value,
                Some(b) if maximize => b.max(value),
                Some(b) => b.min(value),
            });
        }
        tree.mark_fully_expanded(id, roll);
        best.unwrap_or(0.5)
    }

    /// Expected value of `id` before its side to move has rolled.
    fn chance_value(&self, tree: &mut GameTree, id: NodeId, depth: usize) -> f64 {
        let board = tree.get(id).board;
        let out_of_time = self.deadline.is_some_and(|d| Instant::now() >= d);
        if depth == 0 || board.is_game_over() || out_of_time {
            return self.evaluator.evaluate(&board, tree.reference());
        }
        all_rolls()
            .into_iter()
            .map(|roll| roll.probability() * self.player_ply(tree, id, roll, depth))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{BOARD_LEN, WHITE_OFF};
    use crate::eval::WeightedEvaluator;
    use crate::movegen::legal_move_sequences;

    fn roll(a: u8, b: u8) -> Roll {
        Roll::new(a, b).unwrap()
    }

    /// Two black checkers left on White's side, everything else borne off.
    fn blocked_bar_board() -> Board {
        let mut cells = [0i8; BOARD_LEN];
        cells[Color::White.bar_slot()] = 1;
        cells[0] = -2;
        cells[1] = -2;
        cells[2] = -2;
        cells[3] = -2;
        cells[4] = -2;
        cells[5] = -2;
        cells[23] = -3;
        cells[WHITE_OFF] = 14;
        Board::from_slice(&cells).unwrap()
    }

    #[test]
    fn test_heuristic_returns_legal_sequence() {
        let board = Board::new();
        let eval = WeightedEvaluator::default();
        let seq = heuristic_search(&board, roll(3, 1), Color::White, &eval);
        assert!(legal_move_sequences(&board, roll(3, 1), Color::White).contains(&seq));
    }

    #[test]
    fn test_heuristic_prefers_bearing_off_the_last_checker() {
        let mut cells = [0i8; BOARD_LEN];
        cells[22] = 1;
        cells[WHITE_OFF] = 14;
        cells[0] = -15;
        let board = Board::from_slice(&cells).unwrap();
        let eval = WeightedEvaluator::default();
        let seq = heuristic_search(&board, roll(6, 2), Color::White, &eval);
        let after = crate::board::apply_move_sequence(&board, &seq, Color::White).unwrap();
        assert!(after.is_win(Color::White));
    }

    #[test]
    fn test_all_strategies_pass_without_moves() {
        let board = blocked_bar_board();
        let eval = WeightedEvaluator::default();
        let r = roll(6, 6);
        assert!(heuristic_search(&board, r, Color::White, &eval).is_empty());
        let config = ExpectiminimaxConfig { depth: 2, budget_ms: None };
        assert!(expectiminimax_search(&board, r, Color::White, &eval, &config, None).is_empty());
        let mut rng = fastrand::Rng::with_seed(1);
        assert!(random_search(&board, r, Color::White, &mut rng).is_empty());
    }

    #[test]
    fn test_expectiminimax_depth_one_matches_heuristic() {
        let board = Board::new();
        let eval = WeightedEvaluator::default();
        let config = ExpectiminimaxConfig { depth: 1, budget_ms: None };
        for color in Color::ALL {
            let a = heuristic_search(&board, roll(6, 4), color, &eval);
            let b = expectiminimax_search(&board, roll(6, 4), color, &eval, &config, None);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_expectiminimax_depth_two_is_legal() {
        // A short bear-off race keeps the two-ply tree small.
        let mut cells = [0i8; BOARD_LEN];
        cells[20] = 2;
        cells[22] = 1;
        cells[WHITE_OFF] = 12;
        cells[2] = -2;
        cells[Color::Black.off_slot()] = 13;
        let board = Board::from_slice(&cells).unwrap();
        let eval = WeightedEvaluator::default();
        let config = ExpectiminimaxConfig { depth: 2, budget_ms: Some(5_000) };
        let seq = expectiminimax_search(&board, roll(2, 1), Color::White, &eval, &config, None);
        assert!(legal_move_sequences(&board, roll(2, 1), Color::White).contains(&seq));
    }

    #[test]
    fn test_expectiminimax_elapsed_deadline_scores_statically() {
        let board = Board::new();
        let eval = WeightedEvaluator::default();
        let config = ExpectiminimaxConfig { depth: 3, budget_ms: None };
        for r in [roll(6, 4), roll(3, 1), roll(5, 5)] {
            let a = heuristic_search(&board, r, Color::White, &eval);
            let deadline = Some(Instant::now());
            let b = expectiminimax_search(&board, r, Color::White, &eval, &config, deadline);
            assert_eq!(a, b, "{r}");
        }
    }

    #[test]
    fn test_rank_sequences_sorted() {
        let board = Board::new();
        let eval = WeightedEvaluator::default();
        let ranked = rank_sequences(&board, roll(5, 2), Color::Black, &eval, 3);
        assert_eq!(ranked.len(), 3);
        assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
        let best = heuristic_search(&board, roll(5, 2), Color::Black, &eval);
        assert_eq!(ranked[0].0, best);
    }

    #[test]
    fn test_random_search_is_seeded() {
        let board = Board::new();
        let mut a = fastrand::Rng::with_seed(42);
        let mut b = fastrand::Rng::with_seed(42);
        let r = roll(4, 2);
        let seq = random_search(&board, r, Color::White, &mut a);
        assert_eq!(seq, random_search(&board, r, Color::White, &mut b));
        assert!(legal_move_sequences(&board, r, Color::White).contains(&seq));
    }
}
