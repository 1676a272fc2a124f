//! Dice rolls.
//!
//! A [`Roll`] stores the two faces; doubles expand to four dice when played.

use std::fmt;
use std::str::FromStr;

use crate::constants::DIE_FACES;
use crate::error::RollError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Roll {
    a: u8,
    b: u8,
}

impl Roll {
    /// Build a roll from two faces in 1..=6. The order of faces is irrelevant.
    pub fn new(a: u8, b: u8) -> Result<Self, RollError> {
        for d in [a, b] {
            if !(1..=DIE_FACES).contains(&d) {
                return Err(RollError::OutOfRange(d));
            }
        }
        Ok(Self {
            a: a.max(b),
            b: a.min(b),
        })
    }

    /// Draw a roll from `rng`.
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        let a = rng.u8(1..=DIE_FACES);
        let b = rng.u8(1..=DIE_FACES);
        Self {
            a: a.max(b),
            b: a.min(b),
        }
    }

    #[inline]
    pub fn is_double(&self) -> bool {
        self.a == self.b
    }

    /// Larger face.
    #[inline]
    pub fn high(&self) -> u8 {
        self.a
    }

    /// Smaller face.
    #[inline]
    pub fn low(&self) -> u8 {
        self.b
    }

    /// The dice to play: two values, or four for doubles.
    pub fn dice(&self) -> Vec<u8> {
        if self.is_double() {
            vec![self.a; 4]
        } else {
            vec![self.a, self.b]
        }
    }

    /// Chance of this outcome among the 36 ordered throws.
    pub fn probability(&self) -> f64 {
        if self.is_double() { 1.0 / 36.0 } else { 2.0 / 36.0 }
    }
}

/// The 21 distinct rolls: 15 non-doubles and 6 doubles.
pub fn all_rolls() -> Vec<Roll> {
    let mut rolls = Vec::with_capacity(crate::constants::DISTINCT_ROLLS);
    for a in 1..=DIE_FACES {
        for b in 1..=a {
            rolls.push(Roll { a, b });
        }
    }
    rolls
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

impl FromStr for Roll {
    type Err = RollError;

    /// Parse `3,1`, `3-1`, `31` or `[3, 1]`; four equal dice are accepted for doubles.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: Vec<u8> = s
            .chars()
            .filter(|c| !matches!(c, ',' | '-' | '[' | ']') && !c.is_whitespace())
            .map(|c| {
                c.to_digit(10)
                    .map(|d| d as u8)
                    .ok_or_else(|| RollError::Parse(s.to_string()))
            })
            .collect::<Result<_, _>>()?;
        match digits.as_slice() {
            [a, b] => Roll::new(*a, *b),
            [a, b, c, d] if a == b && b == c && c == d => Roll::new(*a, *a),
            _ => Err(RollError::Parse(s.to_string())),
        }
    }
}
