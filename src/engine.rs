//! Decision facade and game session.
//!
//! [`Engine`] turns a [`StrategyConfig`] into a move chooser. [`Game`] owns the
//! canonical board, applies exactly one validated sequence per turn and keeps
//! a read-only history.

use std::time::Instant;

use log::{debug, info, warn};

use crate::board::{Board, Color, Move, MoveSequence, apply_move_sequence, format_sequence};
use crate::config::{Strategy, StrategyConfig};
use crate::dice::Roll;
use crate::error::{ConfigError, MoveError};
use crate::eval::{Evaluator, WeightedEvaluator};
use crate::mcts::mcts_search;
use crate::movegen::{has_legal_move, legal_successors};
use crate::search::{expectiminimax_search, heuristic_search, random_search};

/// A configured move chooser.
pub struct Engine {
    config: StrategyConfig,
    evaluator: Box<dyn Evaluator>,
    rng: fastrand::Rng,
}

impl Engine {
    /// Validate `config` and build an engine with the weighted evaluator.
    pub fn new(config: StrategyConfig) -> Result<Self, ConfigError> {
        let mut evaluator = WeightedEvaluator::new(config.weights)?;
        if !config.weighted_blots {
            evaluator = evaluator.with_simple_blots();
        }
        Self::with_evaluator(config, Box::new(evaluator))
    }

    /// Build an engine around a custom evaluator. The configured weights are
    /// still validated but otherwise unused.
    pub fn with_evaluator(
        config: StrategyConfig,
        evaluator: Box<dyn Evaluator>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = fastrand::Rng::with_seed(config.seed());
        Ok(Self {
            config,
            evaluator,
            rng,
        })
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Pick a legal sequence for `color`. Empty means the roll cannot be played.
    pub fn choose_move(&mut self, board: &Board, roll: Roll, color: Color) -> MoveSequence {
        self.choose_move_until(board, roll, color, None)
    }

    /// Like [`Engine::choose_move`], with an external deadline for the searching
    /// strategies. The earlier of `deadline` and the configured budget applies.
    pub fn choose_move_until(
        &mut self,
        board: &Board,
        roll: Roll,
        color: Color,
        deadline: Option<Instant>,
    ) -> MoveSequence {
        if !has_legal_move(board, roll, color) {
            warn!("{color} cannot play {roll}, passing");
            return Vec::new();
        }
        let evaluator = self.evaluator.as_ref();
        match &self.config.strategy {
            Strategy::Random => random_search(board, roll, color, &mut self.rng),
            Strategy::Heuristic => heuristic_search(board, roll, color, evaluator),
            Strategy::Expectiminimax(c) => {
                expectiminimax_search(board, roll, color, evaluator, c, deadline)
            }
            Strategy::Mcts(c) => mcts_search(board, roll, color, evaluator, c, deadline),
        }
    }
}

/// One-shot decision: build an engine from `config` and choose a sequence.
pub fn choose_move(
    board: &Board,
    roll: Roll,
    color: Color,
    config: &StrategyConfig,
) -> Result<MoveSequence, ConfigError> {
    let mut engine = Engine::new(config.clone())?;
    Ok(engine.choose_move(board, roll, color))
}

/// A played turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub color: Color,
    pub roll: Roll,
    pub moves: MoveSequence,
    /// Board after the turn
    pub board: Board,
}

/// A game in progress.
#[derive(Debug, Clone)]
pub struct Game {
    initial: Board,
    board: Board,
    to_move: Color,
    history: Vec<Turn>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Standard starting position, White to move.
    pub fn new() -> Self {
        Self::from_position(Board::new(), Color::White)
    }

    pub fn from_position(board: Board, to_move: Color) -> Self {
        Self {
            initial: board,
            board,
            to_move,
            history: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Color {
        self.to_move
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Board after `turn` turns; 0 is the starting position.
    pub fn board_at(&self, turn: usize) -> Option<&Board> {
        match turn {
            0 => Some(&self.initial),
            n => self.history.get(n - 1).map(|t| &t.board),
        }
    }

    pub fn winner(&self) -> Option<Color> {
        self.board.winner()
    }

    pub fn is_over(&self) -> bool {
        self.board.is_game_over()
    }

    /// Let `engine` choose for the side to move and play the result.
    pub fn play_turn(
        &mut self,
        engine: &mut Engine,
        roll: Roll,
    ) -> Result<MoveSequence, MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        let seq = engine.choose_move(&self.board, roll, self.to_move);
        self.play_sequence(roll, &seq)?;
        Ok(seq)
    }

    /// Play a caller-supplied sequence after checking it against the legal set.
    ///
    /// Any sequence of the same length reaching the same board as a legal one
    /// is accepted. The board is only replaced once the whole sequence has
    /// been validated.
    pub fn play_sequence(&mut self, roll: Roll, seq: &[Move]) -> Result<(), MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        let color = self.to_move;
        let legal = legal_successors(&self.board, roll, color);
        let next = if legal.is_empty() {
            if !seq.is_empty() {
                return Err(MoveError::NotLegal);
            }
            self.board
        } else {
            let next = apply_move_sequence(&self.board, seq, color)?;
            if !legal.iter().any(|(s, b)| *b == next && s.len() == seq.len()) {
                return Err(MoveError::NotLegal);
            }
            next
        };

        debug!("{color} rolls {roll} and plays {}", format_sequence(seq));
        self.board = next;
        self.history.push(Turn {
            color,
            roll,
            moves: seq.to_vec(),
            board: next,
        });
        if let Some(winner) = self.board.winner() {
            info!("{winner} wins after {} turns", self.history.len());
        }
        self.to_move = color.opponent();
        Ok(())
    }
}
