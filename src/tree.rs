//! Game tree shared by the expectiminimax and MCTS strategies.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Every node
//! owns its board snapshot and the list of move sequences leading to it from
//! the root. Evaluations and accumulated results are always expressed from the
//! tree's reference color (the side choosing the move at the root).

use crate::board::{Board, Color, MoveSequence};
use crate::dice::Roll;

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the game tree.
#[derive(Debug, Clone)]
pub struct GameNode {
    /// Position at this node
    pub board: Board,
    /// Static or backed-up evaluation for the reference color
    pub evaluation: f64,
    /// Move sequences played from the root to reach this node
    pub path: Vec<MoveSequence>,
    /// Side to move next
    pub to_move: Color,
    /// Roll that produced this node (None for the root)
    pub roll: Option<Roll>,
    /// Number of visits
    pub visits: u32,
    /// Sum of backed-up results
    pub total: f64,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Rolls for which every legal child exists
    expanded: Vec<Roll>,
}

impl GameNode {
    pub fn new(board: Board, evaluation: f64, path: Vec<MoveSequence>, to_move: Color) -> Self {
        Self {
            board,
            evaluation,
            path,
            to_move,
            roll: None,
            visits: 0,
            total: 0.0,
            parent: None,
            children: Vec::new(),
            expanded: Vec::new(),
        }
    }

    /// Tag the node with the roll that produced it.
    pub fn with_roll(mut self, roll: Roll) -> Self {
        self.roll = Some(roll);
        self
    }

    /// The sequence that produced this node.
    pub fn last_move(&self) -> Option<&MoveSequence> {
        self.path.last()
    }

    /// Average backed-up result, 0 when unvisited.
    #[inline]
    pub fn mean(&self) -> f64 {
        if self.visits > 0 {
            self.total / self.visits as f64
        } else {
            0.0
        }
    }
}

/// Arena-backed game tree.
#[derive(Debug)]
pub struct GameTree {
    nodes: Vec<GameNode>,
    reference: Color,
}

impl GameTree {
    /// New tree rooted at `board` with `to_move` choosing at the root.
    pub fn new(board: Board, to_move: Color, evaluation: f64) -> Self {
        Self {
            nodes: vec![GameNode::new(board, evaluation, Vec::new(), to_move)],
            reference: to_move,
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Color all evaluations are expressed for.
    #[inline]
    pub fn reference(&self) -> Color {
        self.reference
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &GameNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut GameNode {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Attach `child` under `parent` and add its statistics to every ancestor.
    pub fn add_child(&mut self, parent: NodeId, mut child: GameNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        child.parent = Some(parent);
        let (visits, total) = (child.visits, child.total);
        self.nodes.push(child);
        self.get_mut(parent).children.push(id);

        if visits > 0 {
            let mut cur = Some(parent);
            while let Some(n) = cur {
                let node = self.get_mut(n);
                node.visits += visits;
                node.total += total;
                cur = node.parent;
            }
        }
        id
    }

    /// Either side has already borne off all checkers.
    #[inline]
    pub fn is_terminal(&self, id: NodeId) -> bool {
        self.get(id).board.is_game_over()
    }

    #[inline]
    pub fn is_fully_expanded(&self, id: NodeId, roll: Roll) -> bool {
        self.get(id).expanded.contains(&roll)
    }

    pub fn mark_fully_expanded(&mut self, id: NodeId, roll: Roll) {
        let node = self.get_mut(id);
        if !node.expanded.contains(&roll) {
            node.expanded.push(roll);
        }
    }

    /// Children of `id` produced by `roll`.
    pub fn children_for_roll(&self, id: NodeId, roll: Roll) -> impl Iterator<Item = NodeId> + '_ {
        self.get(id)
            .children
            .iter()
            .copied()
            .filter(move |&c| self.get(c).roll == Some(roll))
    }

    /// Child with the best evaluation for whoever moves at `id`.
    ///
    /// The reference color picks the maximum, the opponent the minimum. Ties
    /// go to the earliest child.
    pub fn best_child_by_evaluation(&self, id: NodeId) -> Option<NodeId> {
        let maximize = self.get(id).to_move == self.reference;
        let mut best: Option<(NodeId, f64)> = None;
        for &c in &self.get(id).children {
            let e = self.get(c).evaluation;
            let better = match best {
                None => true,
                Some((_, b)) if maximize => e > b,
                Some((_, b)) => e < b,
            };
            if better {
                best = Some((c, e));
            }
        }
        best.map(|(c, _)| c)
    }

    /// UCB1 bound of `child` under `parent`. Unvisited children are infinite.
    pub fn ucb1(&self, parent: NodeId, child: NodeId, c: f64, sign: f64) -> f64 {
        let node = self.get(child);
        if node.visits == 0 {
            return f64::INFINITY;
        }
        let parent_visits = self.get(parent).visits.max(1) as f64;
        sign * node.mean() + c * (parent_visits.ln() / node.visits as f64).sqrt()
    }

    /// Child with the highest UCB1 bound, restricted to `roll` when given.
    ///
    /// `sign` is +1 where the reference color moves and -1 elsewhere.
    pub fn best_child_ucb(
        &self,
        id: NodeId,
        c: f64,
        sign: f64,
        roll: Option<Roll>,
    ) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        for &child in &self.get(id).children {
            if roll.is_some() && self.get(child).roll != roll {
                continue;
            }
            let u = self.ucb1(id, child, c, sign);
            if best.is_none_or(|(_, b)| u > b) {
                best = Some((child, u));
            }
        }
        best.map(|(child, _)| child)
    }

    /// +1 where the reference color is to move, -1 otherwise.
    #[inline]
    pub fn perspective(&self, id: NodeId) -> f64 {
        if self.get(id).to_move == self.reference { 1.0 } else { -1.0 }
    }

    /// Add one visit and `result` to `id` and every ancestor up to the root.
    pub fn backpropagate(&mut self, id: NodeId, result: f64) {
        let mut cur = Some(id);
        while let Some(n) = cur {
            let node = self.get_mut(n);
            node.visits += 1;
            node.total += result;
            cur = node.parent;
        }
    }
}
