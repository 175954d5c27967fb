//! Data structures for the court scheduler: players, matches, courts, tournament store.

mod court;
mod game;
mod player;
mod tournament;

pub use court::{grid_capacity, Court, CourtId, CourtLayout, GridPosition, COURT_COLS, COURT_ROWS};
pub use game::{
    CheckIn, EventType, GameMatch, MatchDetailsUpdate, MatchId, MatchStatus, Score, SetScore, Side,
    TimingEnvelope,
};
pub use player::{Gender, Player, PlayerId, PlayerUpdate};
pub use tournament::{
    ErrorKind, MatchNumberAllocator, RecentlyCompleted, ScheduleError, Tournament,
};

use serde::{Deserialize, Deserializer};

/// Lets a present-but-null JSON field mean "clear" (`Some(None)`) while an absent one means "keep" (`None`).
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
