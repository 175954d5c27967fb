//! Match (game), its event type, status, score and timing envelope.

use crate::models::court::CourtId;
use crate::models::player::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Event category. Singles events take 2 players, doubles events take 4.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum EventType {
    /// Men's singles.
    MS,
    /// Women's singles.
    WS,
    /// Men's doubles.
    MD,
    /// Women's doubles.
    WD,
    /// Mixed doubles.
    XD,
}

impl EventType {
    pub fn is_doubles(self) -> bool {
        matches!(self, EventType::MD | EventType::WD | EventType::XD)
    }

    pub fn players_required(self) -> usize {
        if self.is_doubles() {
            4
        } else {
            2
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            EventType::MS => "MS",
            EventType::WS => "WS",
            EventType::MD => "MD",
            EventType::WD => "WD",
            EventType::XD => "XD",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    Active,
    Completed,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Active => "active",
            MatchStatus::Completed => "completed",
        }
    }
}

impl std::str::FromStr for MatchStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(MatchStatus::Pending),
            "active" => Ok(MatchStatus::Active),
            "completed" => Ok(MatchStatus::Completed),
            _ => Err(()),
        }
    }
}

/// One side of the net. Side One is slots 1 and 3, side Two is slots 2 and 4.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    One,
    Two,
}

/// Checked-in flags, one per side.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    pub side_1: bool,
    pub side_2: bool,
}

impl CheckIn {
    pub fn toggle(&mut self, side: Side) {
        match side {
            Side::One => self.side_1 = !self.side_1,
            Side::Two => self.side_2 = !self.side_2,
        }
    }
}

/// Points in a single set.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SetScore {
    pub side_1: u32,
    pub side_2: u32,
}

/// Match score: up to [`Score::MAX_SETS`] sets.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub sets: Vec<SetScore>,
}

impl Score {
    pub const MAX_SETS: usize = 3;

    pub fn new(sets: Vec<SetScore>) -> Self {
        Self { sets }
    }
}

/// Timestamps and pause bookkeeping for a match that has been put on court.
///
/// Durations are integer milliseconds. While `timer_paused` is set,
/// `last_pause_time` holds the instant the pause began.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TimingEnvelope {
    pub start_time: Option<DateTime<Utc>>,
    pub warmup_start_time: Option<DateTime<Utc>>,
    pub match_start_time: Option<DateTime<Utc>>,
    pub timer_paused: bool,
    pub paused_duration_ms: i64,
    pub last_pause_time: Option<DateTime<Utc>>,
}

impl TimingEnvelope {
    /// Fresh envelope for a match put on court at `now`: warmup starts immediately.
    pub fn started_at(now: DateTime<Utc>) -> Self {
        Self {
            start_time: Some(now),
            warmup_start_time: Some(now),
            ..Self::default()
        }
    }

    pub fn in_warmup(&self) -> bool {
        self.warmup_start_time.is_some() && self.match_start_time.is_none()
    }

    pub fn pause(&mut self, now: DateTime<Utc>) {
        if !self.timer_paused {
            self.timer_paused = true;
            self.last_pause_time = Some(now);
        }
    }

    pub fn resume(&mut self, now: DateTime<Utc>) {
        if self.timer_paused {
            let paused_at = self.last_pause_time.unwrap_or(now);
            self.paused_duration_ms += (now - paused_at).num_milliseconds().max(0);
            self.timer_paused = false;
            self.last_pause_time = None;
        }
    }

    /// Leave warmup: match phase starts at `now` with no paused time carried over.
    pub fn begin_match(&mut self, now: DateTime<Utc>) {
        self.match_start_time = Some(now);
        self.timer_paused = false;
        self.paused_duration_ms = 0;
        self.last_pause_time = None;
    }
}

/// A scheduled match between two sides.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    /// Display number; unique among live matches and never reused.
    pub match_number: u32,
    pub event_type: EventType,
    /// Player slots 1..4 in order (2 for singles, 4 for doubles).
    pub player_ids: Vec<PlayerId>,
    pub status: MatchStatus,
    pub scheduled_time: Option<DateTime<Utc>>,
    /// Court the match is playing on; set iff status is active.
    pub court_id: Option<CourtId>,
    pub timing: TimingEnvelope,
    pub end_time: Option<DateTime<Utc>>,
    pub checked_in: Option<CheckIn>,
    pub score: Option<Score>,
}

impl GameMatch {
    pub fn new(
        id: MatchId,
        match_number: u32,
        event_type: EventType,
        player_ids: Vec<PlayerId>,
        scheduled_time: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            match_number,
            event_type,
            player_ids,
            status: MatchStatus::Pending,
            scheduled_time,
            court_id: None,
            timing: TimingEnvelope::default(),
            end_time: None,
            checked_in: None,
            score: None,
        }
    }

    pub fn involves(&self, player_id: PlayerId) -> bool {
        self.player_ids.contains(&player_id)
    }

    /// Player ids on one side of the net.
    pub fn side(&self, side: Side) -> Vec<PlayerId> {
        let offset = match side {
            Side::One => 0,
            Side::Two => 1,
        };
        self.player_ids.iter().skip(offset).step_by(2).copied().collect()
    }

    /// Back to the queue: status pending, court and timing cleared.
    pub(crate) fn reset_to_pending(&mut self) {
        self.status = MatchStatus::Pending;
        self.court_id = None;
        self.timing = TimingEnvelope::default();
        self.end_time = None;
    }
}

/// Edits to a match's participants and schedule. Slots 3 and 4 accept
/// `Some(None)` to clear them.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MatchDetailsUpdate {
    pub event_type: Option<EventType>,
    pub player1: Option<PlayerId>,
    pub player2: Option<PlayerId>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub player3: Option<Option<PlayerId>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub player4: Option<Option<PlayerId>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub scheduled_time: Option<Option<DateTime<Utc>>>,
}
