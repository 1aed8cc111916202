//! This module implements the problem model for a crossword fill: the slot variables found in a
//! structure template, the overlap map between crossing variables, and the shared word
//! vocabulary. Everything here is computed once at construction time and is read-only for the
//! solver.

use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

use crate::types::{Assignment, VariableId};
use crate::word_list::WordList;
use crate::MAX_SLOT_LENGTH;

/// Zero-indexed row and column coords for a cell in the grid, where row 0 is the top row.
pub type GridCoord = (usize, usize);

/// The direction that a slot is facing.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    Across,
    Down,
}

/// A struct identifying a slot in the grid by its origin cell, direction, and length. Immutable
/// once constructed; equality and hashing cover all four fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub length: usize,
}

impl Variable {
    /// Generate the coords for each cell of this variable.
    #[must_use]
    pub fn cell_coords(&self) -> Vec<GridCoord> {
        (0..self.length)
            .map(|cell_idx| match self.direction {
                Direction::Across => (self.row, self.col + cell_idx),
                Direction::Down => (self.row + cell_idx, self.col),
            })
            .collect()
    }

    /// Parse a string like "1,2,down,5" into a `Variable` struct.
    pub fn from_key(key: &str) -> Result<Variable, GridError> {
        let key_parts: Vec<&str> = key.split(',').collect();
        if key_parts.len() != 4 {
            return Err(GridError::InvalidKey(key.into()));
        }

        let row: Result<usize, _> = key_parts[0].parse();
        let col: Result<usize, _> = key_parts[1].parse();
        let direction: Option<Direction> = match key_parts[2] {
            "across" => Some(Direction::Across),
            "down" => Some(Direction::Down),
            _ => None,
        };
        let length: Result<usize, _> = key_parts[3].parse();

        if let (Ok(row), Ok(col), Some(direction), Ok(length)) = (row, col, direction, length) {
            Ok(Variable {
                row,
                col,
                direction,
                length,
            })
        } else {
            Err(GridError::InvalidKey(key.into()))
        }
    }

    /// Represent this variable as a string like "1,2,down,5".
    #[must_use]
    pub fn to_key(&self) -> String {
        let direction = match self.direction {
            Direction::Across => "across",
            Direction::Down => "down",
        };
        format!("{},{},{},{}", self.row, self.col, direction, self.length)
    }
}

/// Serialize a `Variable` into a string key.
#[cfg(feature = "serde")]
impl Serialize for Variable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_key())
    }
}

/// Deserialize a `Variable` from a string key.
#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Variable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw_string = String::deserialize(deserializer)?;
        Variable::from_key(&raw_string).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Error)]
pub enum GridError {
    #[error("structure must contain at least one row")]
    EmptyStructure,

    #[error("rows in structure must all be the same length")]
    RaggedRows,

    #[error("slot starting at ({row}, {col}) has unsupported length {length}")]
    SlotTooLong {
        row: usize,
        col: usize,
        length: usize,
    },

    #[error("invalid variable key: “{0}”")]
    InvalidKey(String),
}

/// A struct holding everything needed as input to a fill: the grid geometry, the variables and
/// their crossings, and the vocabulary.
#[derive(Debug)]
pub struct Crossword {
    /// The word list used to fill the grid; see `word_list.rs`.
    pub word_list: WordList,

    /// The width and height of the grid.
    pub width: usize,
    pub height: usize,

    /// Which cells are open (as opposed to blocks), in order of row and then column.
    open_cells: Vec<bool>,

    /// All variables in the grid, sorted by `(row, col, direction, length)` so that
    /// `VariableId`s provide a deterministic total order.
    pub variables: Vec<Variable>,

    /// For each ordered pair of distinct crossing variables `(x, y)`, the cell indices
    /// `(i, j)` such that `x`'s word at `i` must match `y`'s word at `j`. Non-crossing pairs
    /// are absent.
    overlaps: HashMap<(VariableId, VariableId), (usize, usize)>,

    /// For each variable, the ids of every variable it shares a cell with, in ascending order.
    neighbor_lists: Vec<Vec<VariableId>>,
}

impl Crossword {
    /// Build a `Crossword` from a structure template with `#` representing blocks and any other
    /// character representing an open cell. Variables are maximal runs of at least two open
    /// cells, across and down.
    pub fn new(template: &str, word_list: WordList) -> Result<Crossword, GridError> {
        let rows: Vec<Vec<bool>> = template
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                if line.is_empty() {
                    None
                } else {
                    Some(line.chars().map(|c| c != '#').collect())
                }
            })
            .collect();

        if rows.is_empty() {
            return Err(GridError::EmptyStructure);
        }

        let width = rows[0].len();
        let height = rows.len();
        if rows.iter().any(|row| row.len() != width) {
            return Err(GridError::RaggedRows);
        }

        let mut variables = collect_variables(&rows, width, height);
        variables.sort_unstable();

        for variable in &variables {
            if variable.length > MAX_SLOT_LENGTH {
                return Err(GridError::SlotTooLong {
                    row: variable.row,
                    col: variable.col,
                    length: variable.length,
                });
            }
        }

        // Build a map from cell location to the variables covering it, which determines the
        // crossings. A cell can be covered by at most one variable per direction.
        let mut entries_by_cell: HashMap<GridCoord, Vec<(VariableId, usize)>> = HashMap::new();
        for (var_id, variable) in variables.iter().enumerate() {
            for (cell_idx, coord) in variable.cell_coords().into_iter().enumerate() {
                entries_by_cell.entry(coord).or_default().push((var_id, cell_idx));
            }
        }

        let mut overlaps: HashMap<(VariableId, VariableId), (usize, usize)> = HashMap::new();
        let mut neighbor_sets: Vec<BTreeSet<VariableId>> = vec![BTreeSet::new(); variables.len()];

        for entries in entries_by_cell.values() {
            if let [(x, x_cell), (y, y_cell)] = entries[..] {
                overlaps.insert((x, y), (x_cell, y_cell));
                overlaps.insert((y, x), (y_cell, x_cell));
                neighbor_sets[x].insert(y);
                neighbor_sets[y].insert(x);
            }
        }

        Ok(Crossword {
            word_list,
            width,
            height,
            open_cells: rows.into_iter().flatten().collect(),
            variables,
            overlaps,
            neighbor_lists: neighbor_sets
                .into_iter()
                .map(|set| set.into_iter().collect())
                .collect(),
        })
    }

    /// Borrow a variable using its id.
    #[must_use]
    pub fn variable(&self, var_id: VariableId) -> &Variable {
        &self.variables[var_id]
    }

    /// If the two variables cross, the cell indices `(i, j)` of the shared cell within each
    /// word; `None` if they don't share a cell.
    #[must_use]
    pub fn overlap(&self, x: VariableId, y: VariableId) -> Option<(usize, usize)> {
        self.overlaps.get(&(x, y)).copied()
    }

    /// The ids of every variable sharing a cell with the given one, in ascending order.
    #[must_use]
    pub fn neighbors(&self, var_id: VariableId) -> &[VariableId] {
        &self.neighbor_lists[var_id]
    }

    /// Turn the given assignment into a rendered string, with blocks as `#` and unfilled open
    /// cells as `.`.
    #[must_use]
    pub fn render(&self, assignment: &Assignment) -> String {
        let mut cells: Vec<char> = self
            .open_cells
            .iter()
            .map(|&open| if open { '.' } else { '#' })
            .collect();

        for (&var_id, &word_id) in assignment {
            let word = self.word_list.get(word_id);
            for (cell_idx, (row, col)) in
                self.variables[var_id].cell_coords().into_iter().enumerate()
            {
                if let Some(&ch) = word.chars.get(cell_idx) {
                    cells[row * self.width + col] = ch;
                }
            }
        }

        cells
            .chunks(self.width)
            .map(|line| line.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Scan the open-cell mask for maximal runs of at least two open cells, across and down.
fn collect_variables(rows: &[Vec<bool>], width: usize, height: usize) -> Vec<Variable> {
    let mut variables: Vec<Variable> = vec![];

    let mut push_run = |row: usize, col: usize, direction: Direction, length: usize| {
        if length > 1 {
            variables.push(Variable {
                row,
                col,
                direction,
                length,
            });
        }
    };

    for (row, cells) in rows.iter().enumerate() {
        let mut run_start: Option<usize> = None;
        for (col, &open) in cells.iter().enumerate() {
            match (open, run_start) {
                (true, None) => run_start = Some(col),
                (false, Some(start)) => {
                    push_run(row, start, Direction::Across, col - start);
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            push_run(row, start, Direction::Across, width - start);
        }
    }

    for col in 0..width {
        let mut run_start: Option<usize> = None;
        for (row, cells) in rows.iter().enumerate() {
            match (cells[col], run_start) {
                (true, None) => run_start = Some(row),
                (false, Some(start)) => {
                    push_run(start, col, Direction::Down, row - start);
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            push_run(start, col, Direction::Down, height - start);
        }
    }

    variables
}
