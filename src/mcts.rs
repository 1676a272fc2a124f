//! Monte Carlo Tree Search with UCB1 selection.
//!
//! Each iteration descends from the root by UCB1, expands the first node that
//! still has unexplored children for the roll in play, scores the new nodes
//! with the static evaluator and backs the scores up to the root.
//!
//! Dice are part of the tree: the root always uses the actual roll, deeper
//! plies draw a random roll per visit, and each child remembers the roll that
//! produced it so selection only compares siblings reachable with that roll.

use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::board::{Board, Color, MoveSequence, format_sequence};
use crate::constants::{DEFAULT_SEED, MCTS_BUDGET, MCTS_C};
use crate::dice::Roll;
use crate::error::ConfigError;
use crate::eval::Evaluator;
use crate::movegen::legal_successors;
use crate::tree::{GameNode, GameTree, NodeId};

/// MCTS parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// UCB1 exploration constant
    pub exploration: f64,
    /// Wall-clock budget in milliseconds
    pub budget_ms: u64,
    /// Expand every child of a node at once instead of one per iteration
    pub expand_all: bool,
    /// Stop after this many iterations even if time remains
    pub max_iterations: Option<usize>,
    /// Seed for the rolls drawn below the root
    pub seed: u64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            exploration: MCTS_C,
            budget_ms: MCTS_BUDGET.as_millis() as u64,
            expand_all: true,
            max_iterations: None,
            seed: DEFAULT_SEED,
        }
    }
}

impl MctsConfig {
    pub fn budget(&self) -> Duration {
        Duration::from_millis(self.budget_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(ConfigError::Validation(format!(
                "exploration constant must be finite and non-negative, got {}",
                self.exploration
            )));
        }
        if self.max_iterations == Some(0) {
            return Err(ConfigError::Validation(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pick a move sequence for `color` with MCTS.
///
/// The search runs until the configured budget or `deadline` (whichever comes
/// first) expires, but always completes at least one iteration. Returns an
/// empty sequence when the roll cannot be played.
pub fn mcts_search(
    board: &Board,
    roll: Roll,
    color: Color,
    evaluator: &dyn Evaluator,
    config: &MctsConfig,
    deadline: Option<Instant>,
) -> MoveSequence {
    let mut tree = GameTree::new(*board, color, evaluator.evaluate(board, color));
    let mut rng = fastrand::Rng::with_seed(config.seed);
    let budget_end = Instant::now() + config.budget();
    let deadline = deadline.map_or(budget_end, |d| d.min(budget_end));

    let iterations = tree_search(&mut tree, roll, evaluator, config, deadline, &mut rng);
    let seq = best_move(&tree, roll, config.exploration);
    debug!(
        "mcts {color} plays {} after {iterations} iterations ({} nodes)",
        format_sequence(&seq),
        tree.len()
    );
    dump_children(&tree, roll);
    seq
}

/// Run iterations on `tree` until `deadline`. Returns the number of iterations.
pub fn tree_search(
    tree: &mut GameTree,
    roll: Roll,
    evaluator: &dyn Evaluator,
    config: &MctsConfig,
    deadline: Instant,
    rng: &mut fastrand::Rng,
) -> usize {
    let mut iterations = 0;
    loop {
        iterate(tree, roll, evaluator, config, rng);
        iterations += 1;
        let capped = config.max_iterations.is_some_and(|max| iterations >= max);
        if capped || Instant::now() >= deadline {
            break;
        }
    }
    iterations
}

/// One selection/expansion/backpropagation pass.
fn iterate(
    tree: &mut GameTree,
    root_roll: Roll,
    evaluator: &dyn Evaluator,
    config: &MctsConfig,
    rng: &mut fastrand::Rng,
) {
    let mut id = tree.root();
    let mut roll = root_roll;
    loop {
        if tree.is_terminal(id) {
            let result = evaluator.evaluate(&tree.get(id).board, tree.reference());
            tree.backpropagate(id, result);
            return;
        }
        if !tree.is_fully_expanded(id, roll)
            && expand(tree, id, roll, evaluator, config.expand_all)
        {
            return;
        }
        let sign = tree.perspective(id);
        match tree.best_child_ucb(id, config.exploration, sign, Some(roll)) {
            Some(child) => id = child,
            None => return,
        }
        roll = Roll::random(rng);
    }
}

/// Add unexplored children of `id` for `roll`, score them and back the scores up.
///
/// With `all` set every missing child is added, otherwise only the first one.
/// When the roll cannot be played a single pass child carries the turn over.
/// Returns false when nothing was left to add.
pub fn expand(
    tree: &mut GameTree,
    id: NodeId,
    roll: Roll,
    evaluator: &dyn Evaluator,
    all: bool,
) -> bool {
    let board = tree.get(id).board;
    let to_move = tree.get(id).to_move;

    let mut successors = legal_successors(&board, roll, to_move);
    if successors.is_empty() {
        successors.push((Vec::new(), board));
    }
    let existing: Vec<Board> = tree
        .children_for_roll(id, roll)
        .map(|c| tree.get(c).board)
        .collect();
    let mut missing = successors
        .into_iter()
        .filter(|(_, next)| !existing.contains(next))
        .peekable();

    let mut added = 0;
    for (seq, next) in missing.by_ref() {
        let evaluation = evaluator.evaluate(&next, tree.reference());
        let mut path = tree.get(id).path.clone();
        path.push(seq);
        let node = GameNode::new(next, evaluation, path, to_move.opponent()).with_roll(roll);
        let child = tree.add_child(id, node);
        tree.backpropagate(child, evaluation);
        added += 1;
        if !all {
            break;
        }
    }
    if missing.peek().is_none() {
        tree.mark_fully_expanded(id, roll);
    }
    trace!("expanded {added} children for {roll}");
    added > 0
}

/// Root child with the best UCB1 bound for the actual roll.
fn best_move(tree: &GameTree, roll: Roll, c: f64) -> MoveSequence {
    let root = tree.root();
    tree.best_child_ucb(root, c, 1.0, Some(roll))
        .and_then(|child| tree.get(child).last_move().cloned())
        .unwrap_or_default()
}

/// Log statistics of the root's children.
pub fn dump_children(tree: &GameTree, roll: Roll) {
    if !log::log_enabled!(log::Level::Trace) {
        return;
    }
    let root = tree.root();
    for child in tree.children_for_roll(root, roll) {
        let node = tree.get(child);
        trace!(
            "move {} v={} mean={:.3} eval={:.3}",
            node.last_move().map(|s| format_sequence(s)).unwrap_or_default(),
            node.visits,
            node.mean(),
            node.evaluation
        );
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

    fn quick(expand_all: bool, iterations: usize) -> MctsConfig {
        MctsConfig {
            budget_ms: 60_000,
            expand_all,
            max_iterations: Some(iterations),
            seed: 3,
            ..MctsConfig::default()
        }
    }

    #[test]
    fn test_zero_budget_still_returns_a_legal_move() {
        let board = Board::new();
        let eval = WeightedEvaluator::default();
        let config = MctsConfig {
            budget_ms: 0,
            ..MctsConfig::default()
        };
        let seq = mcts_search(&board, roll(3, 1), Color::White, &eval, &config, None);
        assert!(legal_move_sequences(&board, roll(3, 1), Color::White).contains(&seq));
    }

    #[test]
    fn test_single_expansion_adds_one_child() {
        let board = Board::new();
        let eval = WeightedEvaluator::default();
        let mut tree = GameTree::new(board, Color::White, 0.5);
        let root = tree.root();
        assert!(expand(&mut tree, root, roll(3, 1), &eval, false));
        assert_eq!(tree.get(root).children.len(), 1);
        assert_eq!(tree.get(root).visits, 1);
        assert!(!tree.is_fully_expanded(root, roll(3, 1)));
    }

    #[test]
    fn test_expand_all_covers_every_sequence() {
        let board = Board::new();
        let eval = WeightedEvaluator::default();
        let mut tree = GameTree::new(board, Color::Black, 0.5);
        let root = tree.root();
        assert!(expand(&mut tree, root, roll(6, 5), &eval, true));
        let expected = legal_move_sequences(&board, roll(6, 5), Color::Black).len();
        assert_eq!(tree.get(root).children.len(), expected);
        assert!(tree.is_fully_expanded(root, roll(6, 5)));
        assert!(!expand(&mut tree, root, roll(6, 5), &eval, true));
    }

    #[test]
    fn test_pass_child_when_blocked() {
        let mut cells = [0i8; BOARD_LEN];
        cells[Color::White.bar_slot()] = 1;
        cells[WHITE_OFF] = 14;
        for p in 0..6 {
            cells[p] = -2;
        }
        cells[23] = -3;
        let board = Board::from_slice(&cells).unwrap();
        let eval = WeightedEvaluator::default();
        let seq = mcts_search(&board, roll(5, 5), Color::White, &eval, &quick(true, 20), None);
        assert!(seq.is_empty());
    }

    #[test]
    fn test_search_is_reproducible() {
        let board = Board::new();
        let eval = WeightedEvaluator::default();
        let config = quick(false, 200);
        let a = mcts_search(&board, roll(6, 1), Color::White, &eval, &config, None);
        let b = mcts_search(&board, roll(6, 1), Color::White, &eval, &config, None);
        assert_eq!(a, b);
        assert!(legal_move_sequences(&board, roll(6, 1), Color::White).contains(&a));
    }

    #[test]
    fn test_root_children_use_actual_roll() {
        let board = Board::new();
        let eval = WeightedEvaluator::default();
        let mut tree = GameTree::new(board, Color::White, 0.5);
        let mut rng = fastrand::Rng::with_seed(9);
        let far = Instant::now() + Duration::from_secs(60);
        let n = tree_search(&mut tree, roll(4, 2), &eval, &quick(true, 50), far, &mut rng);
        assert_eq!(n, 50);
        let root = tree.root();
        assert!(
            tree.get(root)
                .children
                .iter()
                .all(|&c| tree.get(c).roll == Some(roll(4, 2)))
        );
        assert_eq!(tree.get(root).visits as usize, tree.len() - 1);
    }

    #[test]
    fn test_validate() {
        assert!(MctsConfig::default().validate().is_ok());
        let bad = MctsConfig {
            exploration: -1.0,
            ..MctsConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
