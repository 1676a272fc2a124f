//! Board model and move execution.
//!
//! A [`Board`] is a 28-slot value type (see [`crate::constants`] for the
//! layout). It is `Copy`, so every search branch works on its own copy and the
//! live board is only touched through the strict [`Board::apply_move`] path.

use std::fmt;
use std::str::FromStr;

use crate::constants::{
    BAR_PIPS, BLACK_BAR, BLACK_OFF, BOARD_LEN, CHECKERS, DIE_FACES, NUM_POINTS, QUADRANT,
    START_BOARD, WHITE_BAR, WHITE_OFF,
};
use crate::error::{BoardError, MoveError};

/// A point index (0..24) or one of the bar/off slots.
pub type Point = usize;

/// One full turn: up to four single-checker moves.
pub type MoveSequence = Vec<Move>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Sign of this color's checkers on the points.
    #[inline]
    pub fn sign(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Bar slot, also used as the `from` sentinel for re-entry moves.
    #[inline]
    pub fn bar_slot(self) -> Point {
        match self {
            Color::White => WHITE_BAR,
            Color::Black => BLACK_BAR,
        }
    }

    /// Borne-off slot, also used as the `to` sentinel for bear-off moves.
    #[inline]
    pub fn off_slot(self) -> Point {
        match self {
            Color::White => WHITE_OFF,
            Color::Black => BLACK_OFF,
        }
    }

    /// Whether `point` lies in this color's home quadrant.
    #[inline]
    pub fn is_home(self, point: Point) -> bool {
        match self {
            Color::White => (NUM_POINTS - QUADRANT..NUM_POINTS).contains(&point),
            Color::Black => point < QUADRANT,
        }
    }

    /// The point a checker enters on from the bar with `die`.
    #[inline]
    pub fn entry_point(self, die: u8) -> Point {
        match self {
            Color::White => die as usize - 1,
            Color::Black => NUM_POINTS - die as usize,
        }
    }

    /// Pips a checker on `point` still has to travel to be borne off.
    #[inline]
    pub fn distance_home(self, point: Point) -> usize {
        match self {
            Color::White => NUM_POINTS - point,
            Color::Black => point + 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => f.pad("white"),
            Color::Black => f.pad("black"),
        }
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(Color::White),
            "black" | "b" => Ok(Color::Black),
            other => Err(format!("unknown color {other:?}")),
        }
    }
}

/// A single checker move. `from` may be a bar slot, `to` may be an off slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Point,
    pub to: Point,
}

impl Move {
    pub const fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    #[inline]
    pub fn is_entry(&self) -> bool {
        self.from == WHITE_BAR || self.from == BLACK_BAR
    }

    #[inline]
    pub fn is_bear_off(&self) -> bool {
        self.to == WHITE_OFF || self.to == BLACK_OFF
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_entry() {
            write!(f, "bar/")?;
        } else {
            write!(f, "{}/", self.from)?;
        }
        if self.is_bear_off() {
            write!(f, "off")
        } else {
            write!(f, "{}", self.to)
        }
    }
}

/// Format a move sequence as `16/19 18/19`, or `pass` when empty.
pub fn format_sequence(seq: &[Move]) -> String {
    if seq.is_empty() {
        return "pass".to_string();
    }
    seq.iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Backgammon position.
///
/// Points hold signed counts (White positive, Black negative); the four
/// trailing slots hold unsigned bar and off counts.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [i8; BOARD_LEN],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// The standard starting position.
    pub fn new() -> Self {
        Self { cells: START_BOARD }
    }

    /// Build a board from 28 raw values, checking the layout invariants.
    pub fn from_slice(values: &[i8]) -> Result<Self, BoardError> {
        let cells: [i8; BOARD_LEN] = values.try_into().map_err(|_| BoardError::Length {
            expected: BOARD_LEN,
            got: values.len(),
        })?;
        if let Some(slot) = (NUM_POINTS..BOARD_LEN).find(|&s| cells[s] < 0) {
            return Err(BoardError::NegativeSlot { slot });
        }
        let board = Self { cells };
        for color in Color::ALL {
            let count = board.checker_total(color);
            if count != CHECKERS as u32 {
                return Err(BoardError::CheckerCount { color, count });
            }
        }
        Ok(board)
    }

    /// Raw slot values.
    #[inline]
    pub fn cells(&self) -> &[i8; BOARD_LEN] {
        &self.cells
    }

    /// Number of `color` checkers standing on `point` (0 for bar/off slots).
    #[inline]
    pub fn count(&self, point: Point, color: Color) -> u8 {
        if point >= NUM_POINTS {
            return 0;
        }
        let v = i16::from(self.cells[point]) * i16::from(color.sign());
        u8::try_from(v).unwrap_or(0)
    }

    /// Whether `color` has at least one checker on `point`.
    #[inline]
    pub fn owns(&self, point: Point, color: Color) -> bool {
        self.count(point, color) > 0
    }

    /// Whether `point` holds exactly one opposing checker (a blot `color` can hit).
    #[inline]
    pub fn is_opponent_vulnerable(&self, point: Point, color: Color) -> bool {
        self.count(point, color.opponent()) == 1
    }

    /// Whether `point` holds two or more opposing checkers.
    #[inline]
    pub fn is_blocked(&self, point: Point, color: Color) -> bool {
        self.count(point, color.opponent()) >= 2
    }

    #[inline]
    pub fn bar(&self, color: Color) -> u8 {
        self.cells[color.bar_slot()] as u8
    }

    #[inline]
    pub fn off(&self, color: Color) -> u8 {
        self.cells[color.off_slot()] as u8
    }

    #[inline]
    pub fn has_bar(&self, color: Color) -> bool {
        self.bar(color) > 0
    }

    /// Every checker of `color` is in its home quadrant or already borne off.
    pub fn all_home(&self, color: Color) -> bool {
        !self.has_bar(color) && (0..NUM_POINTS).all(|p| color.is_home(p) || !self.owns(p, color))
    }

    #[inline]
    pub fn is_win(&self, color: Color) -> bool {
        self.off(color) == CHECKERS
    }

    /// Either side has borne off all of its checkers.
    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.is_win(Color::White) || self.is_win(Color::Black)
    }

    pub fn winner(&self) -> Option<Color> {
        Color::ALL.into_iter().find(|&c| self.is_win(c))
    }

    /// Checkers on points, bar and off. Always 15 for a consistent board.
    pub fn checker_total(&self, color: Color) -> u32 {
        let on_points: u32 = (0..NUM_POINTS).map(|p| self.count(p, color) as u32).sum();
        on_points + self.bar(color) as u32 + self.off(color) as u32
    }

    /// Total distance to bear off every remaining checker.
    pub fn pip_count(&self, color: Color) -> u32 {
        let on_points: u32 = (0..NUM_POINTS)
            .map(|p| self.count(p, color) as u32 * color.distance_home(p) as u32)
            .sum();
        on_points + self.bar(color) as u32 * BAR_PIPS
    }

    /// Points occupied by `color`, in index order.
    pub fn occupied(&self, color: Color) -> impl Iterator<Item = Point> + '_ {
        (0..NUM_POINTS).filter(move |&p| self.owns(p, color))
    }

    /// Destination reached by moving from `from` with `die`, ignoring legality.
    ///
    /// Moves past the last point land on the off slot.
    pub fn target(&self, from: Point, die: u8, color: Color) -> Point {
        if from == color.bar_slot() {
            return color.entry_point(die);
        }
        let d = die as usize;
        match color {
            Color::White if from + d >= NUM_POINTS => color.off_slot(),
            Color::White => from + d,
            Color::Black if from < d => color.off_slot(),
            Color::Black => from - d,
        }
    }

    /// Bear-off eligibility for a checker on `from` using `die`.
    ///
    /// Requires all checkers home and either an exact die or a larger die with
    /// no checker of `color` farther from home than `from`.
    pub fn can_bear_off(&self, from: Point, die: u8, color: Color) -> bool {
        if from >= NUM_POINTS || !self.owns(from, color) || !self.all_home(color) {
            return false;
        }
        let distance = color.distance_home(from);
        let die = die as usize;
        if die == distance {
            return true;
        }
        die > distance
            && !self
                .occupied(color)
                .any(|p| color.distance_home(p) > distance)
    }

    /// Strict legality check of a single move, independent of the dice rolled.
    pub fn check_move(&self, mv: Move, color: Color) -> Result<(), MoveError> {
        let bar = color.bar_slot();
        let off = color.off_slot();

        if mv.from == bar {
            if !self.has_bar(color) {
                return Err(MoveError::NoChecker { color, from: mv.from });
            }
        } else if mv.from >= NUM_POINTS || !self.owns(mv.from, color) {
            return Err(MoveError::NoChecker { color, from: mv.from });
        } else if self.has_bar(color) {
            return Err(MoveError::MustEnter { color, mv });
        }

        if mv.to == off {
            if mv.from == bar {
                return Err(MoveError::BadSlot { color, mv });
            }
            if !self.all_home(color) {
                return Err(MoveError::NotAllHome { color });
            }
            return Ok(());
        }
        if mv.to >= NUM_POINTS {
            return Err(MoveError::BadSlot { color, mv });
        }

        let reachable = (1..=DIE_FACES).any(|die| self.target(mv.from, die, color) == mv.to);
        if !reachable {
            return Err(MoveError::BadSlot { color, mv });
        }
        if self.is_blocked(mv.to, color) {
            return Err(MoveError::Blocked { color, to: mv.to });
        }
        Ok(())
    }

    /// Execute a move on the live board, rejecting anything illegal.
    ///
    /// The board is left untouched when an error is returned.
    pub fn apply_move(&mut self, mv: Move, color: Color) -> Result<(), MoveError> {
        self.check_move(mv, color)?;
        self.play_unchecked(mv, color);
        Ok(())
    }

    /// Non-failing variant for generator internals: a move whose source holds
    /// no checker of `color` is ignored.
    pub(crate) fn simulate_move(&mut self, mv: Move, color: Color) {
        let has_source = if mv.from == color.bar_slot() {
            self.has_bar(color)
        } else {
            self.owns(mv.from, color)
        };
        if has_source {
            self.play_unchecked(mv, color);
        }
    }

    /// Board reached after playing `seq` in simulation mode.
    #[cfg(test)]
    pub(crate) fn after(&self, seq: &[Move], color: Color) -> Board {
        let mut next = *self;
        for &mv in seq {
            next.simulate_move(mv, color);
        }
        next
    }

    fn play_unchecked(&mut self, mv: Move, color: Color) {
        let sign = color.sign();
        if mv.from == color.bar_slot() {
            self.cells[mv.from] -= 1;
        } else {
            self.cells[mv.from] -= sign;
        }

        if mv.to == color.off_slot() {
            self.cells[mv.to] += 1;
            return;
        }
        if self.is_opponent_vulnerable(mv.to, color) {
            // Hit: the blot goes to the opponent's bar.
            self.cells[mv.to] = 0;
            self.cells[color.opponent().bar_slot()] += 1;
        }
        self.cells[mv.to] += sign;
    }
}

/// Apply a full sequence strictly, returning the resulting board.
///
/// The input board is not modified; on error nothing is applied.
pub fn apply_move_sequence(board: &Board, seq: &[Move], color: Color) -> Result<Board, MoveError> {
    let mut next = *board;
    for &mv in seq {
        next.apply_move(mv, color)?;
    }
    Ok(next)
}

impl std::ops::Index<usize> for Board {
    type Output = i8;

    fn index(&self, idx: usize) -> &i8 {
        &self.cells[idx]
    }
}

impl FromStr for Board {
    type Err = BoardError;

    /// Parse 28 comma- or space-separated integers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(|t| t.parse::<i8>().map_err(|_| BoardError::Parse(t.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        Board::from_slice(&values)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:?})", self.cells)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = |p: Point| match self.cells[p] {
            0 => " . ".to_string(),
            v if v > 0 => format!("W{v:<2}"),
            v => format!("B{:<2}", -v),
        };
        for p in (NUM_POINTS / 2..NUM_POINTS).rev() {
            write!(f, "{p:>3} ")?;
        }
        writeln!(f)?;
        for p in (NUM_POINTS / 2..NUM_POINTS).rev() {
            write!(f, "{} ", cell(p))?;
        }
        writeln!(f)?;
        for p in 0..NUM_POINTS / 2 {
            write!(f, "{} ", cell(p))?;
        }
        writeln!(f)?;
        for p in 0..NUM_POINTS / 2 {
            write!(f, "{p:>3} ")?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "bar W{} B{}  off W{} B{}",
            self.bar(Color::White),
            self.bar(Color::Black),
            self.off(Color::White),
            self.off(Color::Black)
        )
    }
}
