//! Gammon-Rust: a backgammon move engine.
//!
//! This crate generates every legal move sequence for a roll, scores
//! positions with a weighted static evaluator and chooses a move with one of
//! several searches: a one-ply heuristic, expectiminimax over dice outcomes,
//! or Monte Carlo Tree Search with UCB1.
//!
//! ## Modules
//!
//! - [`constants`] - Board layout and engine defaults
//! - [`board`] - Board representation, move primitives and move execution
//! - [`dice`] - Rolls and the 21 distinct outcomes
//! - [`movegen`] - Legal move sequence generation
//! - [`eval`] - Weighted position evaluator
//! - [`tree`] - Arena game tree shared by the searches
//! - [`search`] - Heuristic, expectiminimax and random strategies
//! - [`mcts`] - Monte Carlo Tree Search
//! - [`config`] - Strategy and engine configuration
//! - [`engine`] - Decision facade and game session
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```
//! use gammon_rust::board::{Board, Color};
//! use gammon_rust::config::StrategyConfig;
//! use gammon_rust::dice::Roll;
//! use gammon_rust::engine::choose_move;
//! use gammon_rust::movegen::legal_move_sequences;
//!
//! let board = Board::new();
//! let roll = Roll::new(3, 1).unwrap();
//!
//! let legal = legal_move_sequences(&board, roll, Color::White);
//! let best = choose_move(&board, roll, Color::White, &StrategyConfig::heuristic()).unwrap();
//! assert!(legal.contains(&best));
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod dice;
pub mod engine;
pub mod error;
pub mod eval;
pub mod mcts;
pub mod movegen;
pub mod search;
pub mod tree;
