//! Court grid: slot search for new courts, manual moves, resizing and occupancy queries.
//!
//! Every court covers a fixed block of `COURT_ROWS x COURT_COLS` cells anchored at its
//! top-left cell. Committed positions never overlap; overlap is only reported by
//! [`preview_move`] so a drag can show it before the drop.

use crate::ids::IdGenerator;
use crate::models::{
    grid_capacity, Court, CourtId, GridPosition, MatchStatus, ScheduleError, Tournament, COURT_COLS,
    COURT_ROWS,
};
use serde::Serialize;
use std::collections::HashSet;

/// Result of a move preview: where the court would land and which courts it would cover.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MovePreview {
    pub position: GridPosition,
    pub overlaps: Vec<CourtId>,
}

/// Reject `requested` courts if the grid cannot hold them.
pub fn check_capacity(requested: usize, rows: usize, cols: usize) -> Result<(), ScheduleError> {
    let capacity = grid_capacity(rows, cols);
    if requested > capacity {
        return Err(ScheduleError::CapacityExceeded { requested, capacity });
    }
    Ok(())
}

/// True if the whole block anchored at `pos` lies inside a `rows x cols` grid.
pub fn fits(pos: GridPosition, rows: usize, cols: usize) -> bool {
    pos.row + COURT_ROWS <= rows && pos.col + COURT_COLS <= cols
}

/// Snap a requested anchor to the nearest one whose block stays on the grid.
pub fn clamp_anchor(row: i64, col: i64, rows: usize, cols: usize) -> GridPosition {
    let max_row = rows.saturating_sub(COURT_ROWS) as i64;
    let max_col = cols.saturating_sub(COURT_COLS) as i64;
    GridPosition::new(row.clamp(0, max_row) as usize, col.clamp(0, max_col) as usize)
}

/// Court occupying cell `(row, col)`. When blocks overlap, the earliest court in `courts` wins.
pub fn court_at(courts: &[Court], row: usize, col: usize) -> Option<&Court> {
    courts
        .iter()
        .find(|c| c.position.map_or(false, |p| p.covers(row, col)))
}

/// Courts other than `court_id` whose block would share a cell with one anchored at `pos`.
pub fn overlapping(courts: &[Court], court_id: CourtId, pos: GridPosition) -> Vec<CourtId> {
    courts
        .iter()
        .filter(|c| c.id != court_id)
        .filter(|c| c.position.map_or(false, |p| p.overlaps(&pos)))
        .map(|c| c.id)
        .collect()
}

/// Give a position to every court that lacks one. Courts already placed keep their
/// anchor and their cells are reserved first, so calling this again changes nothing.
///
/// Candidates are tried in row-major order on the court stride (`cols / COURT_COLS`
/// courts per row). If every stride slot is blocked by a manually moved court, every
/// remaining anchor is scanned row-major. Returns how many courts were placed.
pub fn place_unplaced(courts: &mut [Court], rows: usize, cols: usize) -> usize {
    let mut occupied: HashSet<(usize, usize)> = HashSet::new();
    for pos in courts.iter().filter_map(|c| c.position) {
        occupied.extend(pos.cells());
    }

    let per_row = cols / COURT_COLS;
    let stride: Vec<GridPosition> = (0..grid_capacity(rows, cols))
        .map(|i| GridPosition::new((i / per_row) * COURT_ROWS, (i % per_row) * COURT_COLS))
        .collect();

    let mut placed = 0;
    for court in courts.iter_mut().filter(|c| c.position.is_none()) {
        let is_free = |pos: &GridPosition| fits(*pos, rows, cols) && pos.cells().all(|cell| !occupied.contains(&cell));
        let found = stride.iter().copied().find(|p| is_free(p)).or_else(|| {
            (0..=rows.saturating_sub(COURT_ROWS))
                .flat_map(|r| (0..=cols.saturating_sub(COURT_COLS)).map(move |c| GridPosition::new(r, c)))
                .find(|p| is_free(p))
        });
        match found {
            Some(pos) => {
                occupied.extend(pos.cells());
                court.position = Some(pos);
                placed += 1;
                log::debug!("Placed {} at row {}, col {}", court.name, pos.row, pos.col);
            }
            None => log::warn!("No free slot for {} on a {}x{} grid", court.name, rows, cols),
        }
    }
    placed
}

/// Grow or shrink the court list to `n` courts. New courts are named "Court k" and placed
/// with [`place_unplaced`]; shrinking drops courts from the end and is refused while any
/// of them hosts an active match.
pub fn set_num_courts(
    tournament: &mut Tournament,
    n: usize,
    ids: &mut dyn IdGenerator,
) -> Result<(), ScheduleError> {
    let (rows, cols) = (tournament.layout.rows, tournament.layout.cols);
    check_capacity(n, rows, cols)?;

    let current = tournament.courts.len();
    if n < current {
        if let Some(busy) = tournament.courts[n..]
            .iter()
            .find(|c| tournament.current_match(c.id).is_some())
        {
            return Err(ScheduleError::CourtInUse(busy.id));
        }
        tournament.courts.truncate(n);
    } else {
        for k in current..n {
            tournament
                .courts
                .push(Court::new(ids.next_id(), format!("Court {}", k + 1)));
        }
        place_unplaced(&mut tournament.courts, rows, cols);
    }
    tournament.layout.num_courts = n;
    log::info!("Court count {} -> {}", current, n);
    Ok(())
}

/// Resize the grid. Courts whose block no longer fits lose their position and go
/// through the slot search again.
pub fn set_grid_size(tournament: &mut Tournament, rows: usize, cols: usize) -> Result<(), ScheduleError> {
    check_capacity(tournament.courts.len(), rows, cols)?;
    for court in tournament.courts.iter_mut() {
        if court.position.map_or(false, |p| !fits(p, rows, cols)) {
            court.position = None;
        }
    }
    tournament.layout.rows = rows;
    tournament.layout.cols = cols;
    place_unplaced(&mut tournament.courts, rows, cols);
    log::info!("Grid resized to {}x{}", rows, cols);
    Ok(())
}

/// Where a court would land if dropped at `(row, col)`, and what it would cover.
pub fn preview_move(
    tournament: &Tournament,
    court_id: CourtId,
    row: i64,
    col: i64,
) -> Result<MovePreview, ScheduleError> {
    tournament.court(court_id)?;
    let position = clamp_anchor(row, col, tournament.layout.rows, tournament.layout.cols);
    let overlaps = overlapping(&tournament.courts, court_id, position);
    Ok(MovePreview { position, overlaps })
}

/// Commit a court to the clamped anchor. Refused if the block would overlap another court.
pub fn move_court(
    tournament: &mut Tournament,
    court_id: CourtId,
    row: i64,
    col: i64,
) -> Result<GridPosition, ScheduleError> {
    let preview = preview_move(tournament, court_id, row, col)?;
    if let Some(&other) = preview.overlaps.first() {
        return Err(ScheduleError::CourtOverlap { court: court_id, other });
    }
    let court = tournament.court_mut(court_id)?;
    court.position = Some(preview.position);
    log::debug!("Moved {} to row {}, col {}", court.name, preview.position.row, preview.position.col);
    Ok(preview.position)
}

pub fn rename_court(tournament: &mut Tournament, court_id: CourtId, name: &str) -> Result<(), ScheduleError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ScheduleError::EmptyName);
    }
    tournament.court_mut(court_id)?.name = name.to_string();
    Ok(())
}

pub fn rotate_court(tournament: &mut Tournament, court_id: CourtId) -> Result<u16, ScheduleError> {
    let court = tournament.court_mut(court_id)?;
    court.rotate();
    Ok(court.rotation)
}

/// Courts with no active match, in grid order.
pub fn free_courts(tournament: &Tournament) -> Vec<CourtId> {
    let busy: HashSet<CourtId> = tournament
        .matches
        .iter()
        .filter(|m| m.status == MatchStatus::Active)
        .filter_map(|m| m.court_id)
        .collect();
    tournament
        .courts
        .iter()
        .filter(|c| !busy.contains(&c.id))
        .map(|c| c.id)
        .collect()
}
