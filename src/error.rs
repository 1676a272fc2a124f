use crate::board::{Color, Move};

/// Errors raised when building an evaluator or search configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("expected {expected} evaluator weights, got {got}")]
    WeightCount { expected: usize, got: usize },

    #[error("evaluator weight {name} must be finite and non-negative (got {value})")]
    NegativeWeight { name: &'static str, value: f64 },

    #[error("evaluator weights must sum to 1 (got {0})")]
    WeightSum(f64),

    #[error("failed to parse TOML: {0}")]
    TomlParse(String),

    #[error("config validation error: {0}")]
    Validation(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::TomlParse(e.to_string())
    }
}

/// A move that cannot be executed on the live board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("{color} has no checker at {from}")]
    NoChecker { color: Color, from: usize },

    #[error("{color} must enter from the bar before moving {mv}")]
    MustEnter { color: Color, mv: Move },

    #[error("point {to} is blocked for {color}")]
    Blocked { color: Color, to: usize },

    #[error("{color} cannot bear off until all checkers are home")]
    NotAllHome { color: Color },

    #[error("{mv} is not a legal direction or slot for {color}")]
    BadSlot { color: Color, mv: Move },

    #[error("sequence is not legal for this roll")]
    NotLegal,

    #[error("the game is already over")]
    GameOver,
}

/// A board array that violates the layout or checker-count invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("board must have {expected} slots, got {got}")]
    Length { expected: usize, got: usize },

    #[error("{color} has {count} checkers, expected 15")]
    CheckerCount { color: Color, count: u32 },

    #[error("slot {slot} holds a negative count")]
    NegativeSlot { slot: usize },

    #[error("cannot parse board value {0:?}")]
    Parse(String),
}

/// Dice values outside 1..=6.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RollError {
    #[error("die value {0} out of range 1..=6")]
    OutOfRange(u8),

    #[error("cannot parse roll from {0:?}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::WeightCount { expected: 6, got: 5 };
        assert_eq!(err.to_string(), "expected 6 evaluator weights, got 5");
    }

    #[test]
    fn test_move_error_display() {
        let err = MoveError::Blocked {
            color: Color::Black,
            to: 7,
        };
        assert_eq!(err.to_string(), "point 7 is blocked for black");
    }

    #[test]
    fn test_roll_error_display() {
        assert_eq!(
            RollError::OutOfRange(7).to_string(),
            "die value 7 out of range 1..=6"
        );
    }
}
