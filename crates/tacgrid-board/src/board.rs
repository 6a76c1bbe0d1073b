//! The sparse occupancy grid and its win detection.

use std::collections::HashMap;
use std::ops::Range;

use crate::{Cell, Direction, Symbol, WinResult};

/// Minimum run length that wins a game unless configured otherwise.
pub const DEFAULT_WINNING_LENGTH: usize = 5;

/// Longest winning run a board accepts. Each win check scans four lines of
/// `2L - 1` cells, so the length stays small.
pub const MAX_WINNING_LENGTH: usize = 64;

/// Sentinel rendered for unoccupied cells when a line is printed.
pub const EMPTY_MARK: char = '-';

/// The game board.
///
/// Holds which symbol occupies which cell, plus the outcome of the win
/// checks run so far. A cell, once occupied, keeps its symbol until
/// [`reset`](Board::reset).
#[derive(Debug, Clone)]
pub struct Board {
    cells: HashMap<Cell, Symbol>,
    win: WinResult,
    winner: Option<Symbol>,
    winning_length: usize,
}

impl Board {
    /// Creates an empty board where `winning_length` in a row wins.
    ///
    /// The length is clamped to `1..=MAX_WINNING_LENGTH`.
    pub fn new(winning_length: usize) -> Self {
        Self {
            cells: HashMap::new(),
            win: WinResult::default(),
            winner: None,
            winning_length: winning_length.clamp(1, MAX_WINNING_LENGTH),
        }
    }

    pub fn winning_length(&self) -> usize {
        self.winning_length
    }

    /// Returns `true` if no symbol occupies `cell`.
    pub fn is_free(&self, cell: Cell) -> bool {
        !self.cells.contains_key(&cell)
    }

    /// The symbol occupying `cell`, if any.
    pub fn occupant(&self, cell: Cell) -> Option<Symbol> {
        self.cells.get(&cell).copied()
    }

    /// The occupant of `cell` as a character, or `default` when free.
    pub fn occupant_or(&self, cell: Cell, default: char) -> char {
        self.occupant(cell).map_or(default, Symbol::as_char)
    }

    /// Puts `symbol` on `cell`.
    ///
    /// # Panics
    ///
    /// Panics if `cell` is already occupied. Callers check
    /// [`is_free`](Board::is_free) first; overwriting a cell would break
    /// the board's one-symbol-per-cell invariant.
    pub fn place(&mut self, cell: Cell, symbol: Symbol) {
        assert!(
            self.is_free(cell),
            "cell {cell} already holds {}",
            self.occupant_or(cell, EMPTY_MARK)
        );
        self.cells.insert(cell, symbol);
    }

    /// Scans the four lines through `cell` for a winning run of the symbol
    /// on `cell`.
    ///
    /// Each line spans `2L - 1` cells centered on `cell`. When the longest
    /// run in a line reaches the winning length, exactly those cells of
    /// that line are recorded for that direction and the symbol becomes
    /// the winner. Checking a free cell changes nothing.
    pub fn check_win(&mut self, cell: Cell) -> &WinResult {
        let Some(symbol) = self.occupant(cell) else {
            return &self.win;
        };
        let Ok(reach) = i64::try_from(self.winning_length - 1) else {
            return &self.win;
        };

        for direction in Direction::ALL {
            let line: Vec<Option<Cell>> = (-reach..=reach)
                .map(|k| cell.step(direction, k))
                .collect();
            let marks: Vec<Option<Symbol>> = line
                .iter()
                .map(|c| c.and_then(|c| self.occupant(c)))
                .collect();
            tracing::trace!(
                %cell,
                %direction,
                line = %self.render(&line),
                "scanning line"
            );

            let run = longest_run(&marks, &Some(symbol));
            if run.len() >= self.winning_length {
                let cells: Vec<Cell> =
                    line[run].iter().flatten().copied().collect();
                tracing::debug!(
                    %symbol,
                    %direction,
                    from = %cells[0],
                    to = %cells[cells.len() - 1],
                    len = cells.len(),
                    "winning line"
                );
                self.win.set(direction, cells);
                self.winner = Some(symbol);
            }
        }

        &self.win
    }

    /// Clears every cell, every winning line and the winner.
    pub fn reset(&mut self) {
        self.cells.clear();
        self.win = WinResult::default();
        self.winner = None;
    }

    /// All occupied cells with their symbols, ordered by row then column.
    pub fn occupied(&self) -> Vec<(Cell, Symbol)> {
        let mut cells: Vec<(Cell, Symbol)> =
            self.cells.iter().map(|(c, s)| (*c, *s)).collect();
        cells.sort_by_key(|(cell, _)| *cell);
        cells
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The symbol that completed a winning run, if any.
    pub fn winner(&self) -> Option<Symbol> {
        self.winner
    }

    pub fn win_result(&self) -> &WinResult {
        &self.win
    }

    fn render(&self, line: &[Option<Cell>]) -> String {
        line.iter()
            .map(|c| c.map_or(EMPTY_MARK, |c| self.occupant_or(c, EMPTY_MARK)))
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_WINNING_LENGTH)
    }
}

/// Finds the longest contiguous run of `target` in `items`.
///
/// Scans left to right with a counter that resets on every mismatch. When
/// several runs share the maximum length the last one wins. Returns an
/// empty range when `target` does not occur.
pub(crate) fn longest_run<T: PartialEq>(items: &[T], target: &T) -> Range<usize> {
    let mut best_len = 0;
    let mut best_end = 0;
    let mut counter = 0;

    for (i, item) in items.iter().enumerate() {
        if item == target {
            counter += 1;
        } else {
            counter = 0;
        }
        if counter > 0 && counter >= best_len {
            best_len = counter;
            best_end = i + 1;
        }
    }

    best_end - best_len..best_end
}
