//! Static position evaluation.
//!
//! [`WeightedEvaluator`] scores a board in `[0, 1]` for a reference color as a
//! weighted sum of six normalized features. Each feature compares the two
//! sides with [`normalize`], so 0.5 means "even" on that feature.
//!
//! Anything implementing [`Evaluator`] can replace it, including plain
//! closures `Fn(&Board, Color) -> f64`, as long as it keeps the same range and
//! orientation (1.0 = certain win for `color`).

use std::sync::OnceLock;

use crate::board::{Board, Color, Point};
use crate::constants::{
    BAR_PIPS, DEFAULT_WEIGHTS, DIE_FACES, MAX_HIT_DISTANCE, NUM_FEATURES, NUM_POINTS,
    PRIME_MIN_LEN, WEIGHT_EPSILON,
};
use crate::error::ConfigError;

/// A position scorer. Returns a value in `[0, 1]`, 1 being a certain win for `color`.
pub trait Evaluator {
    fn evaluate(&self, board: &Board, color: Color) -> f64;
}

impl<F> Evaluator for F
where
    F: Fn(&Board, Color) -> f64,
{
    fn evaluate(&self, board: &Board, color: Color) -> f64 {
        self(board, color)
    }
}

const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "prime_structure",
    "anchors",
    "blots",
    "race_advantage",
    "home_board_strength",
    "captured_pieces",
];

/// Feature weights. Must be non-negative and sum to 1.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EvalWeights {
    pub prime_structure: f64,
    pub anchors: f64,
    pub blots: f64,
    pub race_advantage: f64,
    pub home_board_strength: f64,
    pub captured_pieces: f64,
}

impl Default for EvalWeights {
    fn default() -> Self {
        let [p, a, b, r, h, c] = DEFAULT_WEIGHTS;
        Self {
            prime_structure: p,
            anchors: a,
            blots: b,
            race_advantage: r,
            home_board_strength: h,
            captured_pieces: c,
        }
    }
}

impl EvalWeights {
    /// Build weights from a slice in feature order, validating count and sum.
    pub fn from_slice(values: &[f64]) -> Result<Self, ConfigError> {
        let [p, a, b, r, h, c]: [f64; NUM_FEATURES] =
            values.try_into().map_err(|_| ConfigError::WeightCount {
                expected: NUM_FEATURES,
                got: values.len(),
            })?;
        let weights = Self {
            prime_structure: p,
            anchors: a,
            blots: b,
            race_advantage: r,
            home_board_strength: h,
            captured_pieces: c,
        };
        weights.validate()?;
        Ok(weights)
    }

    pub fn as_array(&self) -> [f64; NUM_FEATURES] {
        [
            self.prime_structure,
            self.anchors,
            self.blots,
            self.race_advantage,
            self.home_board_strength,
            self.captured_pieces,
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = self.as_array();
        for (name, value) in FEATURE_NAMES.into_iter().zip(values) {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NegativeWeight { name, value });
            }
        }
        let sum: f64 = values.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_EPSILON {
            return Err(ConfigError::WeightSum(sum));
        }
        Ok(())
    }
}

/// Per-feature scores for one side, each in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Features {
    pub prime_structure: f64,
    pub anchors: f64,
    pub blots: f64,
    pub race_advantage: f64,
    pub home_board_strength: f64,
    pub captured_pieces: f64,
}

impl Features {
    fn as_array(&self) -> [f64; NUM_FEATURES] {
        [
            self.prime_structure,
            self.anchors,
            self.blots,
            self.race_advantage,
            self.home_board_strength,
            self.captured_pieces,
        ]
    }
}

/// The built-in weighted heuristic.
#[derive(Clone, Debug)]
pub struct WeightedEvaluator {
    weights: EvalWeights,
    /// Weight blots by the chance of being hit instead of counting them.
    weighted_blots: bool,
}

impl Default for WeightedEvaluator {
    fn default() -> Self {
        Self {
            weights: EvalWeights::default(),
            weighted_blots: true,
        }
    }
}

impl WeightedEvaluator {
    /// Create an evaluator, failing fast on invalid weights.
    pub fn new(weights: EvalWeights) -> Result<Self, ConfigError> {
        weights.validate()?;
        Ok(Self {
            weights,
            weighted_blots: true,
        })
    }

    /// Count blots plainly instead of by hit probability.
    pub fn with_simple_blots(mut self) -> Self {
        self.weighted_blots = false;
        self
    }

    pub fn weights(&self) -> &EvalWeights {
        &self.weights
    }

    /// Feature breakdown of `board` from `color`'s side.
    pub fn features(&self, board: &Board, color: Color) -> Features {
        let opp = color.opponent();
        Features {
            prime_structure: normalize(count_primes(board, opp), count_primes(board, color)),
            anchors: normalize(count_anchors(board, opp), count_anchors(board, color)),
            blots: normalize(
                self.blot_value(board, color),
                self.blot_value(board, opp),
            ),
            race_advantage: normalize(
                board.pip_count(color) as f64,
                board.pip_count(opp) as f64,
            ),
            home_board_strength: normalize(home_points(board, opp), home_points(board, color)),
            captured_pieces: normalize(
                captured_penalty(board, color),
                captured_penalty(board, opp),
            ),
        }
    }

    fn blot_value(&self, board: &Board, color: Color) -> f64 {
        if self.weighted_blots {
            weighted_blots(board, color)
        } else {
            count_blots(board, color) as f64
        }
    }
}

impl Evaluator for WeightedEvaluator {
    fn evaluate(&self, board: &Board, color: Color) -> f64 {
        if board.is_win(color) {
            return 1.0;
        }
        if board.is_win(color.opponent()) {
            return 0.0;
        }
        let features = self.features(board, color);
        if is_race(board) {
            return features.race_advantage;
        }
        features
            .as_array()
            .iter()
            .zip(self.weights.as_array())
            .map(|(f, w)| f * w)
            .sum()
    }
}

/// `own / (own + opponent)`, or 0.5 when both are zero.
#[inline]
pub fn normalize(opponent: f64, own: f64) -> f64 {
    if opponent + own == 0.0 {
        0.5
    } else {
        own / (own + opponent)
    }
}

/// Contact is broken: no checker of either side still has to pass the other.
pub fn is_race(board: &Board) -> bool {
    if board.has_bar(Color::White) || board.has_bar(Color::Black) {
        return false;
    }
    let white_back = board.occupied(Color::White).next();
    let black_back = board.occupied(Color::Black).last();
    match (white_back, black_back) {
        (Some(w), Some(b)) => w > b,
        _ => true,
    }
}

/// Maximal runs of at least [`PRIME_MIN_LEN`] consecutive made points.
fn count_primes(board: &Board, color: Color) -> f64 {
    let mut primes = 0;
    let mut run = 0;
    for p in 0..=NUM_POINTS {
        if p < NUM_POINTS && board.count(p, color) >= 2 {
            run += 1;
        } else {
            if run >= PRIME_MIN_LEN {
                primes += 1;
            }
            run = 0;
        }
    }
    primes as f64
}

fn count_anchors(board: &Board, color: Color) -> f64 {
    let opp = color.opponent();
    board.occupied(color).filter(|&p| opp.is_home(p)).count() as f64
}

fn home_points(board: &Board, color: Color) -> f64 {
    (0..NUM_POINTS)
        .filter(|&p| color.is_home(p) && board.count(p, color) >= 2)
        .count() as f64
}

fn count_blots(board: &Board, color: Color) -> usize {
    board.occupied(color).filter(|&p| board.count(p, color) == 1).count()
}

/// Sum over `color`'s blots of the chance the nearest attacker hits it.
fn weighted_blots(board: &Board, color: Color) -> f64 {
    let opp = color.opponent();
    board
        .occupied(color)
        .filter(|&p| board.count(p, color) == 1)
        .map(|p| hit_probability(nearest_attacker(board, p, opp)))
        .sum()
}

/// Shortest forward distance from an `attacker` checker to `target`.
fn nearest_attacker(board: &Board, target: Point, attacker: Color) -> usize {
    let target_dist = attacker.distance_home(target);
    let from_bar = board
        .has_bar(attacker)
        .then(|| BAR_PIPS as usize - target_dist);
    board
        .occupied(attacker)
        .map(|q| attacker.distance_home(q))
        .filter(|&d| d > target_dist)
        .map(|d| d - target_dist)
        .chain(from_bar)
        .min()
        .unwrap_or(usize::MAX)
}

fn captured_penalty(board: &Board, color: Color) -> f64 {
    let bar = board.bar(color) as f64;
    if bar == 0.0 {
        return 0.0;
    }
    let blocked = (1..=DIE_FACES)
        .filter(|&die| board.is_blocked(color.entry_point(die), color))
        .count() as f64;
    bar * (1.0 + blocked)
}

static HIT_TABLE: OnceLock<[f64; MAX_HIT_DISTANCE + 1]> = OnceLock::new();

/// Chance (out of the 36 throws) that a checker `distance` pips away can be hit,
/// ignoring intermediate blocks. Zero beyond 12 pips.
pub fn hit_probability(distance: usize) -> f64 {
    if distance == 0 || distance > MAX_HIT_DISTANCE {
        return 0.0;
    }
    HIT_TABLE.get_or_init(build_hit_table)[distance]
}

fn build_hit_table() -> [f64; MAX_HIT_DISTANCE + 1] {
    let mut counts = [0u32; MAX_HIT_DISTANCE + 1];
    for a in 1..=DIE_FACES as usize {
        for b in 1..=DIE_FACES as usize {
            let reach: Vec<usize> = if a == b {
                (1..=4).map(|k| k * a).collect()
            } else {
                vec![a, b, a + b]
            };
            for d in 1..=MAX_HIT_DISTANCE {
                if reach.contains(&d) {
                    counts[d] += 1;
                }
            }
        }
    }
    counts.map(|c| c as f64 / 36.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{BOARD_LEN, WHITE_OFF};

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(0.0, 0.0), 0.5);
        assert_eq!(normalize(1.0, 3.0), 0.75);
    }

    #[test]
    fn test_hit_table() {
        assert!((hit_probability(1) - 11.0 / 36.0).abs() < 1e-12);
        assert!((hit_probability(6) - 17.0 / 36.0).abs() < 1e-12);
        assert!((hit_probability(7) - 6.0 / 36.0).abs() < 1e-12);
        assert!((hit_probability(12) - 3.0 / 36.0).abs() < 1e-12);
        assert_eq!(hit_probability(13), 0.0);
        assert_eq!(hit_probability(0), 0.0);
    }

    #[test]
    fn test_weights_validation() {
        assert!(EvalWeights::default().validate().is_ok());
        assert_eq!(
            EvalWeights::from_slice(&[0.5, 0.5]),
            Err(ConfigError::WeightCount {
                expected: 6,
                got: 2
            })
        );
        assert!(matches!(
            EvalWeights::from_slice(&[0.5, 0.5, 0.5, 0.0, 0.0, 0.0]),
            Err(ConfigError::WeightSum(_))
        ));
        assert!(matches!(
            EvalWeights::from_slice(&[1.5, -0.5, 0.0, 0.0, 0.0, 0.0]),
            Err(ConfigError::NegativeWeight { name: "anchors", .. })
        ));
    }

    #[test]
    fn test_start_position_is_even() {
        let eval = WeightedEvaluator::default();
        let board = Board::new();
        let w = eval.evaluate(&board, Color::White);
        let b = eval.evaluate(&board, Color::Black);
        assert!((w - 0.5).abs() < 1e-9);
        assert!((w + b - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_win_short_circuit() {
        let mut cells = [0i8; BOARD_LEN];
        cells[WHITE_OFF] = 15;
        cells[0] = -15;
        let board = Board::from_slice(&cells).unwrap();
        let eval = WeightedEvaluator::default();
        assert_eq!(eval.evaluate(&board, Color::White), 1.0);
        assert_eq!(eval.evaluate(&board, Color::Black), 0.0);
    }

    #[test]
    fn test_primes_counted_per_run() {
        let mut cells = [0i8; BOARD_LEN];
        for p in [2, 3, 4, 8, 9, 10, 11] {
            cells[p] = 2;
        }
        cells[20] = 1;
        cells[23] = -15;
        let board = Board::from_slice(&cells).unwrap();
        assert_eq!(count_primes(&board, Color::White), 2.0);
        assert_eq!(count_primes(&board, Color::Black), 0.0);
    }

    #[test]
    fn test_race_detection() {
        assert!(!is_race(&Board::new()));
        let mut cells = [0i8; BOARD_LEN];
        cells[20] = 15;
        cells[3] = -15;
        assert!(is_race(&Board::from_slice(&cells).unwrap()));
    }

    #[test]
    fn test_closure_is_an_evaluator() {
        let pip_ratio = |board: &Board, color: Color| {
            normalize(
                board.pip_count(color) as f64,
                board.pip_count(color.opponent()) as f64,
            )
        };
        assert_eq!(pip_ratio.evaluate(&Board::new(), Color::White), 0.5);
    }

    #[test]
    fn test_plain_and_weighted_blots_differ() {
        // White blots on 3 and 10, Black blot on 13. Both 10 and 13 are three
        // pips from an attacker, 3 is ten pips from the checker on 13.
        let mut cells = [0i8; BOARD_LEN];
        cells[2] = 13;
        cells[3] = 1;
        cells[10] = 1;
        cells[13] = -1;
        cells[20] = -14;
        let board = Board::from_slice(&cells).unwrap();

        let weighted = WeightedEvaluator::default().features(&board, Color::White);
        let plain = WeightedEvaluator::default()
            .with_simple_blots()
            .features(&board, Color::White);
        assert!((plain.blots - 1.0 / 3.0).abs() < 1e-12);
        assert!((weighted.blots - 14.0 / 31.0).abs() < 1e-12);
        assert_ne!(
            WeightedEvaluator::default().evaluate(&board, Color::White),
            WeightedEvaluator::default()
                .with_simple_blots()
                .evaluate(&board, Color::White)
        );
    }

    #[test]
    fn test_exposed_blot_scores_worse() {
        let eval = WeightedEvaluator::default();
        // White slots 19 from 18, four pips from the black checkers on 23.
        let safe = Board::new();
        let mut exposed = safe;
        exposed.apply_move(crate::board::Move::new(18, 19), Color::White).unwrap();
        let f_safe = eval.features(&safe, Color::White);
        let f_exposed = eval.features(&exposed, Color::White);
        assert!(f_exposed.blots < f_safe.blots);
    }
}
