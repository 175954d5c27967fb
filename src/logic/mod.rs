//! Scheduling logic: court grid, match lifecycle, roster, timers and conflict checks.

pub mod conflicts;
pub mod lifecycle;
pub mod placement;
pub mod roster;
pub mod timer;

pub use conflicts::{conflicts_for, is_player_available, Conflict};
pub use lifecycle::UndoOutcome;
pub use placement::{clamp_anchor, court_at, place_unplaced, MovePreview};
pub use timer::{
    derive_timer_state, empty_court_elapsed_ms, format_clock, green_flash_between, match_timer_state,
    TimerPhase, TimerState,
};
