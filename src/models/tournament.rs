//! Tournament store: players, matches and courts, plus the error type shared by all operations.

use crate::models::court::{Court, CourtId, CourtLayout};
use crate::models::game::{EventType, GameMatch, MatchId, MatchStatus};
use crate::models::player::{Player, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Broad category of a [`ScheduleError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Input rejected before any mutation.
    Validation,
    /// Unknown match, court or player id.
    NotFound,
    /// Operation not allowed in the match's current state.
    InvalidTransition,
}

/// Errors that can occur during scheduling operations. State is unchanged whenever one is returned.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScheduleError {
    /// Singles events need 2 players, doubles events need 4.
    WrongPlayerCount { event: EventType, expected: usize, got: usize },
    /// The same player appears twice in one match.
    DuplicatePlayerInMatch(PlayerId),
    /// A live match already carries this number.
    DuplicateMatchNumber(u32),
    /// Match numbers stop below `u32::MAX`.
    MatchNumberOutOfRange(u32),
    /// More courts requested than the grid can hold.
    CapacityExceeded { requested: usize, capacity: usize },
    /// Scores hold at most three sets.
    TooManySets(usize),
    /// Names must not be blank.
    EmptyName,
    /// The court's block would share cells with another court.
    CourtOverlap { court: CourtId, other: CourtId },
    /// Court is hosting a match and cannot be removed.
    CourtInUse(CourtId),
    /// Court already hosts another active match.
    CourtOccupied { court: CourtId, by: MatchId },
    PlayerNotFound(PlayerId),
    MatchNotFound(MatchId),
    CourtNotFound(CourtId),
    /// The match is not in a state that allows this action.
    InvalidTransition { match_id: MatchId, status: MatchStatus, action: &'static str },
    /// Match timer can only start while the match is warming up.
    NotInWarmup(MatchId),
}

impl ScheduleError {
    pub fn kind(&self) -> ErrorKind {
        use ScheduleError::*;
        match self {
            WrongPlayerCount { .. }
            | DuplicatePlayerInMatch(_)
            | DuplicateMatchNumber(_)
            | MatchNumberOutOfRange(_)
            | CapacityExceeded { .. }
            | TooManySets(_)
            | EmptyName
            | CourtOverlap { .. }
            | CourtInUse(_)
            | CourtOccupied { .. } => ErrorKind::Validation,
            PlayerNotFound(_) | MatchNotFound(_) | CourtNotFound(_) => ErrorKind::NotFound,
            InvalidTransition { .. } | NotInWarmup(_) => ErrorKind::InvalidTransition,
        }
    }
}

impl std::fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleError::WrongPlayerCount { event, expected, got } => {
                write!(f, "{} needs {} players (got {})", event.code(), expected, got)
            }
            ScheduleError::DuplicatePlayerInMatch(_) => write!(f, "A player cannot appear twice in one match"),
            ScheduleError::DuplicateMatchNumber(n) => write!(f, "Match number {} is already in use", n),
            ScheduleError::MatchNumberOutOfRange(n) => write!(f, "Match number {} is out of range", n),
            ScheduleError::CapacityExceeded { requested, capacity } => {
                write!(f, "Grid holds at most {} courts (requested {})", capacity, requested)
            }
            ScheduleError::TooManySets(n) => write!(f, "A score has at most 3 sets (got {})", n),
            ScheduleError::EmptyName => write!(f, "Name must not be empty"),
            ScheduleError::CourtOverlap { .. } => write!(f, "Court would overlap another court"),
            ScheduleError::CourtInUse(_) => write!(f, "Court has a match in progress"),
            ScheduleError::CourtOccupied { .. } => write!(f, "Court already has a match in progress"),
            ScheduleError::PlayerNotFound(_) => write!(f, "Player not found"),
            ScheduleError::MatchNotFound(_) => write!(f, "Match not found"),
            ScheduleError::CourtNotFound(_) => write!(f, "Court not found"),
            ScheduleError::InvalidTransition { status, action, .. } => {
                write!(f, "Cannot {} a {} match", action, status.as_str())
            }
            ScheduleError::NotInWarmup(_) => write!(f, "Match is not in warmup"),
        }
    }
}

impl std::error::Error for ScheduleError {}

/// Hands out match numbers. Numbers only ever grow, so a number is never reused,
/// and `observe` skips past numbers supplied from outside.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchNumberAllocator {
    next: u32,
}

impl Default for MatchNumberAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl MatchNumberAllocator {
    /// Hand out the next number, or `None` once the range is used up.
    pub fn next(&mut self) -> Option<u32> {
        let n = self.next;
        self.next = n.checked_add(1)?;
        Some(n)
    }

    /// Make sure numbers handed out later are greater than `n`.
    pub fn observe(&mut self, n: u32) {
        if n >= self.next {
            self.next = n.saturating_add(1);
        }
    }

    pub fn peek(&self) -> u32 {
        self.next
    }
}

/// Recently completed match ids, most recent first. Best-effort memory for undo.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RecentlyCompleted {
    ids: VecDeque<MatchId>,
}

impl RecentlyCompleted {
    pub const CAPACITY: usize = 10;

    pub fn push(&mut self, id: MatchId) {
        self.ids.retain(|x| *x != id);
        self.ids.push_front(id);
        self.ids.truncate(Self::CAPACITY);
    }

    /// Remove `id` wherever it sits. Returns whether it was present.
    pub fn take(&mut self, id: MatchId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|x| *x != id);
        self.ids.len() != before
    }

    pub fn contains(&self, id: MatchId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = MatchId> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Full scheduling state. Matches are kept in queue order.
///
/// Court occupancy is not stored on the court: the active match whose
/// `court_id` names a court is that court's current match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub(crate) players: Vec<Player>,
    pub(crate) matches: Vec<GameMatch>,
    pub(crate) courts: Vec<Court>,
    pub(crate) layout: CourtLayout,
    pub(crate) match_numbers: MatchNumberAllocator,
    pub(crate) recently_completed: RecentlyCompleted,
}

impl Tournament {
    /// Empty tournament on a `rows x cols` grid with no courts yet.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            players: Vec::new(),
            matches: Vec::new(),
            courts: Vec::new(),
            layout: CourtLayout { rows, cols, num_courts: 0 },
            match_numbers: MatchNumberAllocator::default(),
            recently_completed: RecentlyCompleted::default(),
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn matches(&self) -> &[GameMatch] {
        &self.matches
    }

    pub fn courts(&self) -> &[Court] {
        &self.courts
    }

    pub fn layout(&self) -> CourtLayout {
        self.layout
    }

    pub fn capacity(&self) -> usize {
        self.layout.capacity()
    }

    pub fn recently_completed(&self) -> &RecentlyCompleted {
        &self.recently_completed
    }

    pub fn next_match_number(&self) -> u32 {
        self.match_numbers.peek()
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, ScheduleError> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or(ScheduleError::PlayerNotFound(id))
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player, ScheduleError> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ScheduleError::PlayerNotFound(id))
    }

    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        let name = name.trim();
        self.players.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn game(&self, id: MatchId) -> Result<&GameMatch, ScheduleError> {
        self.matches
            .iter()
            .find(|m| m.id == id)
            .ok_or(ScheduleError::MatchNotFound(id))
    }

    pub(crate) fn game_mut(&mut self, id: MatchId) -> Result<&mut GameMatch, ScheduleError> {
        self.matches
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(ScheduleError::MatchNotFound(id))
    }

    pub fn court(&self, id: CourtId) -> Result<&Court, ScheduleError> {
        self.courts
            .iter()
            .find(|c| c.id == id)
            .ok_or(ScheduleError::CourtNotFound(id))
    }

    pub(crate) fn court_mut(&mut self, id: CourtId) -> Result<&mut Court, ScheduleError> {
        self.courts
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(ScheduleError::CourtNotFound(id))
    }

    /// The active match currently on `court_id`, if any.
    pub fn current_match(&self, court_id: CourtId) -> Option<&GameMatch> {
        self.matches
            .iter()
            .find(|m| m.status == MatchStatus::Active && m.court_id == Some(court_id))
    }

    pub fn matches_with_status(&self, status: MatchStatus) -> impl Iterator<Item = &GameMatch> {
        self.matches.iter().filter(move |m| m.status == status)
    }
}
