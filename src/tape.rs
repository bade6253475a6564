//! This module defines the `Tape` type: logically unbounded bidirectional
//! symbol storage backed by contiguous memory. Rightward growth appends
//! blanks on demand; leftward growth prepends a blank and shifts the logical
//! origin, so the head index is always a valid physical index.

use serde::{Deserialize, Serialize};

use crate::types::TAPE_LOAD_PADDING;

/// The machine's symbol storage. Cells outside the materialized range are
/// implicitly blank; any index the head addresses is materialized before it
/// is read or written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tape {
    cells: Vec<char>,
    blank: char,
}

impl Tape {
    /// Creates a tape from the initial contents followed by a short run of
    /// trailing blanks. The padding only amortizes reallocation; extension
    /// past it happens on demand.
    pub fn from_input(input: &str, blank: char) -> Self {
        let mut cells: Vec<char> = input.chars().collect();
        cells.extend(std::iter::repeat(blank).take(TAPE_LOAD_PADDING));

        Self { cells, blank }
    }

    /// Reads the symbol at `index`, materializing the cell first if it lies
    /// beyond the current storage.
    pub fn read(&mut self, index: usize) -> char {
        self.materialize(index);
        self.cells[index]
    }

    /// Writes `symbol` at `index`, materializing the cell first if needed.
    pub fn write(&mut self, index: usize, symbol: char) {
        self.materialize(index);
        self.cells[index] = symbol;
    }

    /// Extends the tape to the left by one blank cell, shifting every
    /// materialized cell one physical position to the right. Previously
    /// written contents are preserved exactly; the caller's logical index 0
    /// now refers to the new blank.
    pub fn grow_left(&mut self) {
        self.cells.insert(0, self.blank);
    }

    /// Ensures storage exists for `index`, padding with blanks.
    pub fn materialize(&mut self, index: usize) {
        if index >= self.cells.len() {
            self.cells.resize(index + 1, self.blank);
        }
    }

    /// The materialized cells.
    pub fn cells(&self) -> &[char] {
        &self.cells
    }

    /// The number of materialized cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell has been materialized.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The blank symbol this tape pads with.
    pub fn blank(&self) -> char {
        self.blank
    }

    /// The contents with trailing blanks stripped.
    pub fn trimmed(&self) -> String {
        let end = self
            .cells
            .iter()
            .rposition(|&c| c != self.blank)
            .map_or(0, |i| i + 1);

        self.cells[..end].iter().collect()
    }
}

impl std::fmt::Display for Tape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for c in &self.cells {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}
