//! Court scheduler for racket tournaments: library with models, scheduling logic and the facade.

pub mod clock;
pub mod config;
pub mod ids;
pub mod interchange;
pub mod logic;
pub mod models;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SchedulerConfig;
pub use ids::{IdGenerator, RandomIds, SequentialIds};
pub use logic::{
    clamp_anchor, conflicts_for, court_at, derive_timer_state, format_clock, green_flash_between,
    match_timer_state, place_unplaced, Conflict, MovePreview, TimerPhase, TimerState, UndoOutcome,
};
pub use models::{
    CheckIn, Court, CourtId, CourtLayout, ErrorKind, EventType, GameMatch, Gender, GridPosition,
    MatchDetailsUpdate, MatchId, MatchStatus, Player, PlayerId, PlayerUpdate, Score, ScheduleError,
    SetScore, Side, TimingEnvelope, Tournament, COURT_COLS, COURT_ROWS,
};
pub use scheduler::{CourtView, MatchView, NewMatch, Scheduler, Snapshot};
