//! This module provides the `Tape`, an unbounded row of symbols under a read/write head.
//!
//! The tape grows by `TAPE_CHUNK` cells whenever the head would step off either end. Every
//! cell also carries an optional `Mark` naming the transition that last wrote it; marks exist
//! for display only and never influence execution.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::palette::Color;
use crate::symbol::Symbol;
use crate::types::{Direction, TuringMachineError, DEFAULT_TAPE_SIZE, TAPE_CHUNK};

/// Display annotation of a cell: which transition wrote it last, and its colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    /// Position of the transition in definition order.
    pub rule: usize,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<Symbol>,
    marks: Vec<Option<Mark>>,
    head: usize,
    fill: Symbol,
    cells_in_use: usize,
}

impl Tape {
    /// Creates a tape of `size` fill cells (at least one) with the head on the first cell.
    pub fn new(size: usize, fill: Symbol) -> Self {
        Self::from_symbols(Vec::new(), size, fill)
    }

    /// Creates a tape holding `symbols`, padded with `fill` up to `size` cells.
    pub fn from_symbols(mut symbols: Vec<Symbol>, size: usize, fill: Symbol) -> Self {
        let len = symbols.len().max(size).max(1);
        symbols.resize(len, fill);

        Self {
            cells: symbols,
            marks: vec![None; len],
            head: 0,
            fill,
            cells_in_use: 0,
        }
    }

    /// Creates a tape from symbol tokens separated by whitespace or commas, e.g. `S1, S1, S0`.
    pub fn from_tokens(input: &str, size: usize, fill: Symbol) -> Result<Self, TuringMachineError> {
        let symbols = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(Symbol::from_token)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_symbols(symbols, size, fill))
    }

    /// Returns the symbol under the head.
    pub fn read(&self) -> Symbol {
        self.cells[self.head]
    }

    /// Returns the symbol at absolute position `index`.
    pub fn read_at(&self, index: usize) -> Result<Symbol, TuringMachineError> {
        self.cells
            .get(index)
            .copied()
            .ok_or(TuringMachineError::IndexOutOfRange {
                index,
                len: self.cells.len(),
            })
    }

    /// Overwrites the cell under the head. Never grows the tape.
    pub fn write(&mut self, symbol: Symbol) {
        self.cells[self.head] = symbol;
    }

    /// Annotates the cell under the head, returning `true` if the cell had never been marked.
    pub fn mark(&mut self, mark: Mark) -> bool {
        let first_touch = self.marks[self.head].replace(mark).is_none();
        if first_touch {
            self.cells_in_use += 1;
        }
        first_touch
    }

    /// Returns the annotation at absolute position `index`.
    pub fn mark_at(&self, index: usize) -> Result<Option<Mark>, TuringMachineError> {
        self.marks
            .get(index)
            .copied()
            .ok_or(TuringMachineError::IndexOutOfRange {
                index,
                len: self.marks.len(),
            })
    }

    /// Moves the head one cell to the right, appending a chunk if it is on the last cell.
    pub fn move_right(&mut self) {
        if self.head + 1 == self.cells.len() {
            self.grow_right();
        }
        self.head += 1;
    }

    /// Moves the head one cell to the left. On the first cell a chunk is prepended, every
    /// existing cell and mark shifts by `TAPE_CHUNK`, and the head lands on the last new cell.
    pub fn move_left(&mut self) {
        if self.head == 0 {
            self.grow_left();
            self.head = TAPE_CHUNK - 1;
        } else {
            self.head -= 1;
        }
    }

    /// Moves the head according to `direction`.
    pub fn shift(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.move_left(),
            Direction::Right => self.move_right(),
            Direction::Stay => {}
        }
    }

    fn grow_right(&mut self) {
        let len = self.cells.len() + TAPE_CHUNK;
        self.cells.resize(len, self.fill);
        self.marks.resize(len, None);
    }

    fn grow_left(&mut self) {
        self.cells
            .splice(0..0, std::iter::repeat(self.fill).take(TAPE_CHUNK));
        self.marks.splice(0..0, std::iter::repeat(None).take(TAPE_CHUNK));
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// A tape always holds at least one cell.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn fill(&self) -> Symbol {
        self.fill
    }

    /// Number of distinct cells written at least once.
    pub fn cells_in_use(&self) -> usize {
        self.cells_in_use
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.cells
    }

    pub fn marks(&self) -> &[Option<Mark>] {
        &self.marks
    }

    /// Counts the cells holding `symbol`.
    pub fn count(&self, symbol: Symbol) -> usize {
        self.cells.iter().filter(|&&s| s == symbol).count()
    }

    /// Range of at most `len` cells centred on the head, clipped to the tape.
    ///
    /// An even `len` puts the extra cell on the left of the head.
    pub fn window(&self, len: usize) -> std::ops::Range<usize> {
        let size = self.cells.len();
        if len >= size {
            return 0..size;
        }
        let half = len / 2;
        let start = self.head.saturating_sub(half);
        start..(self.head + half + 1).min(start + len).min(size)
    }

    /// Renders `len` cells centred on the head as `|a|b|[c]|d|`.
    ///
    /// Cells cut off on either side are summarised as `......[n]......`.
    pub fn render(&self, len: usize) -> String {
        let size = self.cells.len();
        let std::ops::Range { start, end } = self.window(len);

        let mut out = String::new();
        if start > 0 {
            out.push_str(&format!("......[{start}]......"));
        }

        out.push('|');
        for (i, symbol) in self.cells[start..end].iter().enumerate() {
            if start + i == self.head {
                out.push_str(&format!("[{symbol}]"));
            } else {
                out.push(symbol.as_char());
            }
            out.push('|');
        }

        if end < size {
            out.push_str(&format!("......[{}]......", size - end));
        }

        out
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new(DEFAULT_TAPE_SIZE, Symbol::Blank)
    }
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(self.cells.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mark(rule: usize) -> Mark {
        Mark {
            rule,
            color: Color::new(255, 0, 0),
        }
    }

    #[test]
    fn test_default_tape() {
        let tape = Tape::default();
        assert_eq!(tape.len(), DEFAULT_TAPE_SIZE);
        assert_eq!(tape.head(), 0);
        assert_eq!(tape.read(), Symbol::Blank);
        assert_eq!(tape.cells_in_use(), 0);
    }

    #[test]
    fn test_write_and_read() {
        let mut tape = Tape::new(3, Symbol::Blank);
        tape.write(Symbol::One);
        tape.move_right();
        tape.write(Symbol::Zero);

        assert_eq!(tape.read(), Symbol::Zero);
        assert_eq!(tape.read_at(0).unwrap(), Symbol::One);
        assert_eq!(tape.read_at(2).unwrap(), Symbol::Blank);
        assert_eq!(tape.len(), 3);
    }

    #[test]
    fn test_read_at_out_of_range() {
        let tape = Tape::new(3, Symbol::Blank);
        let error = tape.read_at(3).unwrap_err();
        assert_eq!(error, TuringMachineError::IndexOutOfRange { index: 3, len: 3 });
        assert!(tape.mark_at(7).is_err());
    }

    #[test]
    fn test_move_right_grows_by_chunk() {
        let mut tape = Tape::new(2, Symbol::Zero);
        tape.move_right();
        assert_eq!(tape.len(), 2);

        tape.move_right();
        assert_eq!(tape.len(), 2 + TAPE_CHUNK);
        assert_eq!(tape.head(), 2);
        assert!(tape.symbols()[2..].iter().all(|&s| s == Symbol::Zero));
        assert!(tape.marks()[2..].iter().all(Option::is_none));
    }

    #[test]
    fn test_move_left_grows_and_rebases() {
        let mut tape = Tape::new(5, Symbol::Blank);
        tape.write(Symbol::One);
        tape.mark(mark(0));
        tape.move_right();
        tape.write(Symbol::Zero);
        tape.mark(mark(1));
        tape.move_left();

        tape.move_left();

        assert_eq!(tape.head(), 9);
        assert_eq!(tape.len(), 5 + TAPE_CHUNK);
        assert_eq!(tape.read(), Symbol::Blank);
        assert_eq!(tape.read_at(10).unwrap(), Symbol::One);
        assert_eq!(tape.read_at(11).unwrap(), Symbol::Zero);
        assert_eq!(tape.mark_at(10).unwrap(), Some(mark(0)));
        assert_eq!(tape.mark_at(11).unwrap(), Some(mark(1)));
        assert!(tape.marks()[..10].iter().all(Option::is_none));
    }

    #[test]
    fn test_size_never_shrinks() {
        let mut tape = Tape::new(1, Symbol::Blank);
        let mut last = tape.len();
        let moves = [
            Direction::Left,
            Direction::Left,
            Direction::Right,
            Direction::Stay,
        ];

        for i in 0..200 {
            tape.shift(moves[(i * 7) % moves.len()]);
            assert!(tape.len() >= last);
            assert!(tape.head() < tape.len());
            assert_eq!((tape.len() - 1) % TAPE_CHUNK, 0);
            last = tape.len();
        }
    }

    #[test]
    fn test_cells_in_use_counts_first_touch_only() {
        let mut tape = Tape::new(4, Symbol::Blank);

        assert!(tape.mark(mark(0)));
        assert!(!tape.mark(mark(1)));
        tape.move_right();
        assert!(tape.mark(mark(1)));

        assert_eq!(tape.cells_in_use(), 2);
        assert_eq!(tape.mark_at(0).unwrap(), Some(mark(1)));
    }

    #[test]
    fn test_from_tokens() {
        let tape = Tape::from_tokens("S1, S1 S0", 5, Symbol::Blank).unwrap();
        assert_eq!(
            tape.symbols(),
            &[
                Symbol::One,
                Symbol::One,
                Symbol::Zero,
                Symbol::Blank,
                Symbol::Blank
            ]
        );

        let error = Tape::from_tokens("S1 S9", 5, Symbol::Blank).unwrap_err();
        assert!(matches!(error, TuringMachineError::UnknownSymbol(ref t) if t == "S9"));
    }

    #[test]
    fn test_window_never_exceeds_len() {
        let mut tape = Tape::new(20, Symbol::Blank);
        for _ in 0..10 {
            tape.move_right();
        }

        assert_eq!(tape.window(4), 8..12);
        assert_eq!(tape.window(5), 8..13);
        assert_eq!(tape.window(1), 10..11);
        assert_eq!(tape.window(0).len(), 0);
        for len in 0..30 {
            assert!(tape.window(len).len() <= len);
        }
        assert_eq!(tape.render(4), "......[8]......| | |[ ]| |......[8]......");
    }

    #[test]
    fn test_render_window() {
        let mut tape = Tape::from_tokens("S1 S0 S1 S1 S0 S0 S1", 0, Symbol::Blank).unwrap();
        assert_eq!(tape.to_string(), "|[1]|0|1|1|0|0|1|");

        tape.move_right();
        tape.move_right();
        tape.move_right();
        assert_eq!(tape.render(3), "......[2]......|1|[1]|0|......[2]......");
        assert_eq!(tape.render(100), "|1|0|1|[1]|0|0|1|");
    }
}
