//! Court, grid position and court layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a court.
pub type CourtId = Uuid;

/// Rows covered by one court on the layout grid.
pub const COURT_ROWS: usize = 4;
/// Columns covered by one court on the layout grid.
pub const COURT_COLS: usize = 8;

/// Top-left cell (anchor) of a court's footprint.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct GridPosition {
    pub row: usize,
    pub col: usize,
}

impl GridPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// True if cell `(row, col)` lies inside the footprint anchored here.
    pub fn covers(&self, row: usize, col: usize) -> bool {
        row >= self.row && row < self.row + COURT_ROWS && col >= self.col && col < self.col + COURT_COLS
    }

    /// True if the footprints anchored at `self` and `other` share a cell.
    pub fn overlaps(&self, other: &GridPosition) -> bool {
        self.row < other.row + COURT_ROWS
            && other.row < self.row + COURT_ROWS
            && self.col < other.col + COURT_COLS
            && other.col < self.col + COURT_COLS
    }

    /// All cells of the footprint anchored here.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let (row, col) = (self.row, self.col);
        (row..row + COURT_ROWS).flat_map(move |r| (col..col + COURT_COLS).map(move |c| (r, c)))
    }
}

/// A physical court. Which match is on it is derived from the match table
/// (the active match whose `court_id` is this court).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub id: CourtId,
    pub name: String,
    /// None until the placement search finds a slot.
    pub position: Option<GridPosition>,
    /// Rotation in degrees: 0, 90, 180 or 270. Display only; the footprint never changes.
    pub rotation: u16,
    /// When the court last became free through play (completion or undo to queue).
    pub empty_since: Option<DateTime<Utc>>,
}

impl Court {
    pub fn new(id: CourtId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            position: None,
            rotation: 0,
            empty_since: None,
        }
    }

    pub fn rotate(&mut self) {
        self.rotation = (self.rotation + 90) % 360;
    }
}

/// Grid dimensions and the number of courts laid out on it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CourtLayout {
    pub rows: usize,
    pub cols: usize,
    pub num_courts: usize,
}

impl CourtLayout {
    /// How many courts fit when anchored on the fixed stride.
    pub fn capacity(&self) -> usize {
        grid_capacity(self.rows, self.cols)
    }
}

pub fn grid_capacity(rows: usize, cols: usize) -> usize {
    (rows / COURT_ROWS) * (cols / COURT_COLS)
}
