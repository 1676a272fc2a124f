//! Strategy and engine configuration, loadable from TOML.
//!
//! The library only parses strings; reading files is left to the caller.

use crate::board::Color;
use crate::constants::DEFAULT_SEED;
use crate::error::ConfigError;
use crate::eval::EvalWeights;
use crate::mcts::MctsConfig;
use crate::search::ExpectiminimaxConfig;

/// Which search a player uses.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    Random,
    #[default]
    Heuristic,
    Expectiminimax(ExpectiminimaxConfig),
    Mcts(MctsConfig),
}

/// Everything needed to choose a move for one player.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub strategy: Strategy,
    pub weights: EvalWeights,
    /// Score blots by their chance of being hit rather than by count
    pub weighted_blots: bool,
    /// Seed for the random strategy
    pub seed: Option<u64>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            weights: EvalWeights::default(),
            weighted_blots: true,
            seed: None,
        }
    }
}

impl StrategyConfig {
    pub fn random(seed: u64) -> Self {
        Self {
            strategy: Strategy::Random,
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn heuristic() -> Self {
        Self::default()
    }

    pub fn expectiminimax(depth: usize) -> Self {
        Self {
            strategy: Strategy::Expectiminimax(ExpectiminimaxConfig {
                depth,
                ..ExpectiminimaxConfig::default()
            }),
            ..Self::default()
        }
    }

    pub fn mcts(config: MctsConfig) -> Self {
        Self {
            strategy: Strategy::Mcts(config),
            ..Self::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: StrategyConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        match &self.strategy {
            Strategy::Expectiminimax(c) if c.depth == 0 => Err(ConfigError::Validation(
                "expectiminimax depth must be >= 1".into(),
            )),
            Strategy::Mcts(c) => c.validate(),
            _ => Ok(()),
        }
    }
}

/// Settings for a full game: one strategy per color.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub white: StrategyConfig,
    pub black: StrategyConfig,
    /// Seed for the dice in self-play
    pub dice_seed: u64,
    /// Turn limit for self-play, 0 for none
    pub max_turns: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            white: StrategyConfig::default(),
            black: StrategyConfig::default(),
            dice_seed: DEFAULT_SEED,
            max_turns: 0,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn for_color(&self, color: Color) -> &StrategyConfig {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.white.validate()?;
        self.black.validate()
    }
}
