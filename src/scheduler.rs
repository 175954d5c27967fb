//! Scheduling facade: the one entry point that mutates players, matches and courts.
//!
//! Every write goes through a `Scheduler` method, which reads the clock once, hands the
//! instant to the logic layer and either applies the whole change or returns an error
//! with nothing changed. Court occupancy is derived from the match table, so a court and
//! its match can never disagree.

use crate::clock::{Clock, SystemClock};
use crate::config::SchedulerConfig;
use crate::ids::{IdGenerator, RandomIds};
use crate::logic::{conflicts, lifecycle, placement, roster, timer};
use crate::logic::{Conflict, MovePreview, TimerState, UndoOutcome};
use crate::models::{
    Court, CourtId, CourtLayout, EventType, GameMatch, GridPosition, MatchDetailsUpdate, MatchId,
    MatchStatus, Player, PlayerId, PlayerUpdate, Score, ScheduleError, Side, Tournament,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to create a match.
#[derive(Clone, Debug, Deserialize)]
pub struct NewMatch {
    pub event_type: EventType,
    pub player_ids: Vec<PlayerId>,
    #[serde(default)]
    pub scheduled_time: Option<DateTime<Utc>>,
    /// Explicit number, e.g. from an import. Allocated when absent.
    #[serde(default)]
    pub match_number: Option<u32>,
}

impl NewMatch {
    pub fn new(event_type: EventType, player_ids: Vec<PlayerId>) -> Self {
        Self {
            event_type,
            player_ids,
            scheduled_time: None,
            match_number: None,
        }
    }

    pub fn scheduled_at(mut self, time: DateTime<Utc>) -> Self {
        self.scheduled_time = Some(time);
        self
    }

    pub fn numbered(mut self, number: u32) -> Self {
        self.match_number = Some(number);
        self
    }
}

/// A match plus the values derived from it at snapshot time.
#[derive(Clone, Debug, Serialize)]
pub struct MatchView {
    #[serde(flatten)]
    pub game: GameMatch,
    pub timer: Option<TimerState>,
    pub conflicts: Vec<Conflict>,
}

/// A court plus the match currently on it.
#[derive(Clone, Debug, Serialize)]
pub struct CourtView {
    #[serde(flatten)]
    pub court: Court,
    pub current_match: Option<MatchId>,
    pub empty_for_ms: Option<i64>,
}

/// Everything a front end needs to redraw, taken at one instant.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub taken_at: DateTime<Utc>,
    pub config: SchedulerConfig,
    pub layout: CourtLayout,
    pub players: Vec<Player>,
    pub matches: Vec<MatchView>,
    pub courts: Vec<CourtView>,
    pub recently_completed: Vec<MatchId>,
    pub next_match_number: u32,
}

pub struct Scheduler {
    tournament: Tournament,
    config: SchedulerConfig,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
}

impl Scheduler {
    /// Scheduler on the wall clock with random ids.
    pub fn new(config: SchedulerConfig) -> Result<Self, ScheduleError> {
        Self::with_sources(config, Box::new(SystemClock), Box::new(RandomIds))
    }

    /// Scheduler with an injected clock and id source. Creates `config.initial_courts` courts.
    pub fn with_sources(
        config: SchedulerConfig,
        clock: Box<dyn Clock>,
        ids: Box<dyn IdGenerator>,
    ) -> Result<Self, ScheduleError> {
        let mut scheduler = Self {
            tournament: Tournament::new(config.grid_rows, config.grid_cols),
            config,
            clock,
            ids,
        };
        scheduler.set_num_courts(scheduler.config.initial_courts)?;
        Ok(scheduler)
    }

    pub fn tournament(&self) -> &Tournament {
        &self.tournament
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn set_warmup_seconds(&mut self, seconds: u32) {
        self.config.warmup_seconds = seconds;
    }

    pub fn set_flash_seconds(&mut self, seconds: u32) {
        self.config.flash_seconds = seconds;
    }

    pub fn set_match_interval_minutes(&mut self, minutes: u32) {
        self.config.match_interval_minutes = minutes;
    }

    // Players

    pub fn create_player(&mut self, name: &str) -> Result<PlayerId, ScheduleError> {
        let id = self.ids.next_id();
        roster::create_player(&mut self.tournament, id, name)
    }

    pub fn update_player(&mut self, id: PlayerId, update: PlayerUpdate) -> Result<(), ScheduleError> {
        roster::update_player(&mut self.tournament, id, update)
    }

    /// Remove a player and their matches. Returns the ids of the removed matches.
    pub fn remove_player(&mut self, id: PlayerId) -> Result<Vec<MatchId>, ScheduleError> {
        let removed = roster::remove_player(&mut self.tournament, id)?;
        Ok(removed.into_iter().map(|m| m.id).collect())
    }

    // Matches

    pub fn create_match(&mut self, new: NewMatch) -> Result<MatchId, ScheduleError> {
        lifecycle::validate_participants(&self.tournament, new.event_type, &new.player_ids)?;
        let id = self.ids.next_id();
        lifecycle::create_match(
            &mut self.tournament,
            id,
            new.event_type,
            new.player_ids,
            new.scheduled_time,
            new.match_number,
        )
    }

    pub fn update_match_details(&mut self, id: MatchId, update: MatchDetailsUpdate) -> Result<(), ScheduleError> {
        lifecycle::update_match_details(&mut self.tournament, id, update)
    }

    pub fn remove_match(&mut self, id: MatchId) -> Result<(), ScheduleError> {
        lifecycle::remove_match(&mut self.tournament, id).map(|_| ())
    }

    pub fn activate_match(&mut self, match_id: MatchId, court_id: CourtId) -> Result<(), ScheduleError> {
        let now = self.clock.now();
        lifecycle::activate(&mut self.tournament, match_id, court_id, now)
    }

    pub fn deactivate_match(&mut self, match_id: MatchId) -> Result<(), ScheduleError> {
        let now = self.clock.now();
        lifecycle::deactivate(&mut self.tournament, match_id, now)
    }

    pub fn complete_match(&mut self, match_id: MatchId, score: Option<Score>) -> Result<(), ScheduleError> {
        let now = self.clock.now();
        lifecycle::complete(&mut self.tournament, match_id, score, now)
    }

    pub fn undo_complete_match(&mut self, match_id: MatchId) -> UndoOutcome {
        lifecycle::undo_complete(&mut self.tournament, match_id)
    }

    pub fn start_match_timer(&mut self, match_id: MatchId) -> Result<(), ScheduleError> {
        let now = self.clock.now();
        lifecycle::start_match_timer(&mut self.tournament, match_id, now)
    }

    /// Returns whether the timer is paused after the toggle.
    pub fn toggle_pause(&mut self, match_id: MatchId) -> Result<bool, ScheduleError> {
        let now = self.clock.now();
        lifecycle::toggle_pause(&mut self.tournament, match_id, now)
    }

    pub fn update_match_score(&mut self, match_id: MatchId, score: Score) -> Result<(), ScheduleError> {
        lifecycle::update_score(&mut self.tournament, match_id, score)
    }

    pub fn toggle_check_in(&mut self, match_id: MatchId, side: Side) -> Result<bool, ScheduleError> {
        lifecycle::toggle_check_in(&mut self.tournament, match_id, side)
    }

    pub fn reorder_queue(&mut self, moved: MatchId, target: MatchId) -> Result<(), ScheduleError> {
        lifecycle::reorder_queue(&mut self.tournament, moved, target)
    }

    pub fn conflicts_for(&self, match_id: MatchId) -> Result<Vec<Conflict>, ScheduleError> {
        let game = self.tournament.game(match_id)?;
        Ok(conflicts::conflicts_for(
            game,
            self.tournament.matches(),
            self.tournament.players(),
        ))
    }

    pub fn is_player_available(&self, player_id: PlayerId) -> bool {
        conflicts::is_player_available(player_id, self.tournament.matches())
    }

    /// Timer values for a match right now; `None` if it has never been on court.
    /// Completed matches stay frozen at their end time.
    pub fn timer_state(&self, match_id: MatchId) -> Result<Option<TimerState>, ScheduleError> {
        let game = self.tournament.game(match_id)?;
        Ok(timer::match_timer_state(game, &self.config, self.clock.now()))
    }

    /// Active matches whose warmup ran out in `(earlier, later]`.
    pub fn warmups_finished_between(&self, earlier: DateTime<Utc>, later: DateTime<Utc>) -> Vec<MatchId> {
        self.tournament
            .matches_with_status(MatchStatus::Active)
            .filter(|m| timer::green_flash_between(&m.timing, &self.config, earlier, later))
            .map(|m| m.id)
            .collect()
    }

    // Courts

    pub fn set_num_courts(&mut self, n: usize) -> Result<(), ScheduleError> {
        placement::set_num_courts(&mut self.tournament, n, self.ids.as_mut())
    }

    pub fn set_grid_size(&mut self, rows: usize, cols: usize) -> Result<(), ScheduleError> {
        placement::set_grid_size(&mut self.tournament, rows, cols)
    }

    pub fn move_court(&mut self, court_id: CourtId, row: i64, col: i64) -> Result<GridPosition, ScheduleError> {
        placement::move_court(&mut self.tournament, court_id, row, col)
    }

    pub fn preview_move(&self, court_id: CourtId, row: i64, col: i64) -> Result<MovePreview, ScheduleError> {
        placement::preview_move(&self.tournament, court_id, row, col)
    }

    pub fn rename_court(&mut self, court_id: CourtId, name: &str) -> Result<(), ScheduleError> {
        placement::rename_court(&mut self.tournament, court_id, name)
    }

    pub fn rotate_court(&mut self, court_id: CourtId) -> Result<u16, ScheduleError> {
        placement::rotate_court(&mut self.tournament, court_id)
    }

    pub fn court_at(&self, row: usize, col: usize) -> Option<&Court> {
        placement::court_at(self.tournament.courts(), row, col)
    }

    pub fn free_courts(&self) -> Vec<CourtId> {
        placement::free_courts(&self.tournament)
    }

    pub fn empty_court_elapsed(&self, court_id: CourtId) -> Result<Option<i64>, ScheduleError> {
        let court = self.tournament.court(court_id)?;
        Ok(timer::empty_court_elapsed_ms(court, self.clock.now()))
    }

    pub fn snapshot(&self) -> Snapshot {
        let now = self.clock.now();
        let t = &self.tournament;
        let matches = t
            .matches()
            .iter()
            .map(|m| MatchView {
                game: m.clone(),
                timer: timer::match_timer_state(m, &self.config, now),
                conflicts: conflicts::conflicts_for(m, t.matches(), t.players()),
            })
            .collect();
        let courts = t
            .courts()
            .iter()
            .map(|c| CourtView {
                court: c.clone(),
                current_match: t.current_match(c.id).map(|m| m.id),
                empty_for_ms: timer::empty_court_elapsed_ms(c, now),
            })
            .collect();
        Snapshot {
            taken_at: now,
            config: self.config.clone(),
            layout: t.layout(),
            players: t.players().to_vec(),
            matches,
            courts,
            recently_completed: t.recently_completed().ids().collect(),
            next_match_number: t.next_match_number(),
        }
    }
}
