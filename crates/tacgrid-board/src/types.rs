//! Value types shared by the board and the wire protocol.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// A board coordinate.
///
/// The board has no rectangular bound, so both axes are full `i64`.
/// Serializes as `{"Row": r, "Column": c}`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "PascalCase")]
pub struct Cell {
    pub row: i64,
    pub column: i64,
}

impl Cell {
    pub const fn new(row: i64, column: i64) -> Self {
        Self { row, column }
    }

    /// The cell `steps` positions away along `direction`, or `None` if that
    /// would leave the `i64` coordinate space.
    pub fn step(self, direction: Direction, steps: i64) -> Option<Cell> {
        let (dr, dc) = direction.delta();
        Some(Cell {
            row: self.row.checked_add(dr.checked_mul(steps)?)?,
            column: self.column.checked_add(dc.checked_mul(steps)?)?,
        })
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

// ---------------------------------------------------------------------------
// Symbol
// ---------------------------------------------------------------------------

/// The marker a participant places on the board (`X`, `O`, `1`..`9`).
///
/// Serializes as a one-character string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(pub char);

impl Symbol {
    pub fn as_char(self) -> char {
        self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// One of the four axes a winning line can run along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Along a row: `(r, c + k)`.
    Horizontal,
    /// Along a column: `(r + k, c)`.
    Vertical,
    /// Top-left to bottom-right: `(r + k, c + k)`.
    MainDiagonal,
    /// Bottom-left to top-right: `(r - k, c + k)`.
    SideDiagonal,
}

impl Direction {
    /// All four directions, in reporting order.
    pub const ALL: [Direction; 4] = [
        Direction::Horizontal,
        Direction::Vertical,
        Direction::MainDiagonal,
        Direction::SideDiagonal,
    ];

    /// `(row, column)` delta of one step along this direction.
    pub fn delta(self) -> (i64, i64) {
        match self {
            Self::Horizontal => (0, 1),
            Self::Vertical => (1, 0),
            Self::MainDiagonal => (1, 1),
            Self::SideDiagonal => (-1, 1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Horizontal => write!(f, "horizontal"),
            Self::Vertical => write!(f, "vertical"),
            Self::MainDiagonal => write!(f, "main diagonal"),
            Self::SideDiagonal => write!(f, "side diagonal"),
        }
    }
}

// ---------------------------------------------------------------------------
// WinResult
// ---------------------------------------------------------------------------

/// Winning runs found so far, one optional sequence per direction.
///
/// All four `None` means nobody has won. A `Some` sequence lists, in line
/// order, every cell of a run at least the winning length long. Directions
/// without a win are omitted from the JSON form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WinResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<Vec<Cell>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<Vec<Cell>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_diagonal: Option<Vec<Cell>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_diagonal: Option<Vec<Cell>>,
}

impl WinResult {
    /// Returns `true` if any direction holds a winning run.
    pub fn has_win(&self) -> bool {
        Direction::ALL.iter().any(|d| self.line(*d).is_some())
    }

    /// The winning run along `direction`, if there is one.
    pub fn line(&self, direction: Direction) -> Option<&[Cell]> {
        self.slot(direction).as_deref()
    }

    /// Iterates over the directions that hold a winning run.
    pub fn lines(&self) -> impl Iterator<Item = (Direction, &[Cell])> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(|d| self.line(d).map(|cells| (d, cells)))
    }

    pub(crate) fn set(&mut self, direction: Direction, cells: Vec<Cell>) {
        *self.slot_mut(direction) = Some(cells);
    }

    fn slot(&self, direction: Direction) -> &Option<Vec<Cell>> {
        match direction {
            Direction::Horizontal => &self.horizontal,
            Direction::Vertical => &self.vertical,
            Direction::MainDiagonal => &self.main_diagonal,
            Direction::SideDiagonal => &self.side_diagonal,
        }
    }

    fn slot_mut(&mut self, direction: Direction) -> &mut Option<Vec<Cell>> {
        match direction {
            Direction::Horizontal => &mut self.horizontal,
            Direction::Vertical => &mut self.vertical,
            Direction::MainDiagonal => &mut self.main_diagonal,
            Direction::SideDiagonal => &mut self.side_diagonal,
        }
    }
}
