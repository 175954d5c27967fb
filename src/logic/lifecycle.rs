//! Match lifecycle: creation, editing, and the pending -> active -> completed state machine
//! with its two undo edges (active -> pending, completed -> pending).
//!
//! Each function validates everything before touching state, so an `Err` leaves the
//! tournament exactly as it was.

use crate::models::{
    CourtId, EventType, GameMatch, MatchDetailsUpdate, MatchId, MatchStatus, PlayerId, Score,
    ScheduleError, Side, TimingEnvelope, Tournament,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

/// Outcome of undoing a completion. A miss is not an error: the history is best-effort.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UndoOutcome {
    Restored,
    NotInHistory,
}

/// Check that `player_ids` is the right size for `event`, has no repeats, and names known players.
pub fn validate_participants(
    tournament: &Tournament,
    event: EventType,
    player_ids: &[PlayerId],
) -> Result<(), ScheduleError> {
    let expected = event.players_required();
    if player_ids.len() != expected {
        return Err(ScheduleError::WrongPlayerCount {
            event,
            expected,
            got: player_ids.len(),
        });
    }
    let mut seen = HashSet::new();
    for &id in player_ids {
        if !seen.insert(id) {
            return Err(ScheduleError::DuplicatePlayerInMatch(id));
        }
        tournament.player(id)?;
    }
    Ok(())
}

fn check_score(score: &Score) -> Result<(), ScheduleError> {
    if score.sets.len() > Score::MAX_SETS {
        return Err(ScheduleError::TooManySets(score.sets.len()));
    }
    Ok(())
}

fn require_status(m: &GameMatch, status: MatchStatus, action: &'static str) -> Result<(), ScheduleError> {
    if m.status != status {
        return Err(ScheduleError::InvalidTransition {
            match_id: m.id,
            status: m.status,
            action,
        });
    }
    Ok(())
}

/// Add a pending match at the end of the queue. Without `match_number` the next number is
/// allocated; with one, it must be unused among live matches and the allocator skips past it.
pub fn create_match(
    tournament: &mut Tournament,
    id: MatchId,
    event: EventType,
    player_ids: Vec<PlayerId>,
    scheduled_time: Option<DateTime<Utc>>,
    match_number: Option<u32>,
) -> Result<MatchId, ScheduleError> {
    validate_participants(tournament, event, &player_ids)?;
    let number = match match_number {
        Some(n) => {
            if n == u32::MAX {
                return Err(ScheduleError::MatchNumberOutOfRange(n));
            }
            if tournament.matches.iter().any(|m| m.match_number == n) {
                return Err(ScheduleError::DuplicateMatchNumber(n));
            }
            tournament.match_numbers.observe(n);
            n
        }
        None => tournament
            .match_numbers
            .next()
            .ok_or(ScheduleError::MatchNumberOutOfRange(u32::MAX))?,
    };
    tournament
        .matches
        .push(GameMatch::new(id, number, event, player_ids, scheduled_time));
    log::info!("Created match #{} ({})", number, event.code());
    Ok(id)
}

/// Edit participants, event type or scheduled time. Allowed in any status; never changes it.
pub fn update_match_details(
    tournament: &mut Tournament,
    match_id: MatchId,
    update: MatchDetailsUpdate,
) -> Result<(), ScheduleError> {
    let current = tournament.game(match_id)?;
    let event = update.event_type.unwrap_or(current.event_type);

    let mut slots: [Option<PlayerId>; 4] = [None; 4];
    for (slot, id) in slots.iter_mut().zip(current.player_ids.iter()) {
        *slot = Some(*id);
    }
    if let Some(p) = update.player1 {
        slots[0] = Some(p);
    }
    if let Some(p) = update.player2 {
        slots[1] = Some(p);
    }
    if let Some(p) = update.player3 {
        slots[2] = p;
    }
    if let Some(p) = update.player4 {
        slots[3] = p;
    }
    // Singles only use the first two slots.
    let used = event.players_required();
    let player_ids: Vec<PlayerId> = slots.iter().take(used).flatten().copied().collect();
    validate_participants(tournament, event, &player_ids)?;

    let m = tournament.game_mut(match_id)?;
    m.event_type = event;
    m.player_ids = player_ids;
    if let Some(time) = update.scheduled_time {
        m.scheduled_time = time;
    }
    log::debug!("Updated details of match #{}", m.match_number);
    Ok(())
}

/// Delete a match in any status. An active match simply vacates its court; the court is
/// not stamped empty because the match was cancelled, not played.
pub fn remove_match(tournament: &mut Tournament, match_id: MatchId) -> Result<GameMatch, ScheduleError> {
    let idx = tournament
        .matches
        .iter()
        .position(|m| m.id == match_id)
        .ok_or(ScheduleError::MatchNotFound(match_id))?;
    let removed = tournament.matches.remove(idx);
    tournament.recently_completed.take(match_id);
    log::info!("Removed match #{} ({})", removed.match_number, removed.status.as_str());
    Ok(removed)
}

/// Put a pending match on a free court. Warmup starts at `now` with a fresh timing envelope.
pub fn activate(
    tournament: &mut Tournament,
    match_id: MatchId,
    court_id: CourtId,
    now: DateTime<Utc>,
) -> Result<(), ScheduleError> {
    require_status(tournament.game(match_id)?, MatchStatus::Pending, "activate")?;
    tournament.court(court_id)?;
    if let Some(other) = tournament.current_match(court_id) {
        return Err(ScheduleError::CourtOccupied {
            court: court_id,
            by: other.id,
        });
    }

    let m = tournament.game_mut(match_id)?;
    m.status = MatchStatus::Active;
    m.court_id = Some(court_id);
    m.timing = TimingEnvelope::started_at(now);
    m.end_time = None;
    let number = m.match_number;

    let court = tournament.court_mut(court_id)?;
    court.empty_since = None;
    log::info!("Match #{} started warmup on {}", number, court.name);
    Ok(())
}

/// Send an active match back to the queue, wiping its timing, and mark its court empty.
pub fn deactivate(tournament: &mut Tournament, match_id: MatchId, now: DateTime<Utc>) -> Result<(), ScheduleError> {
    let m = tournament.game(match_id)?;
    require_status(m, MatchStatus::Active, "return to queue")?;
    let court_id = m.court_id;

    let m = tournament.game_mut(match_id)?;
    m.reset_to_pending();
    let number = m.match_number;
    if let Some(court_id) = court_id {
        tournament.court_mut(court_id)?.empty_since = Some(now);
    }
    log::info!("Match #{} returned to the queue", number);
    Ok(())
}

/// Record the result of an active match. Its court becomes empty and the match is
/// remembered for undo.
pub fn complete(
    tournament: &mut Tournament,
    match_id: MatchId,
    score: Option<Score>,
    now: DateTime<Utc>,
) -> Result<(), ScheduleError> {
    let m = tournament.game(match_id)?;
    require_status(m, MatchStatus::Active, "complete")?;
    if let Some(score) = &score {
        check_score(score)?;
    }
    let court_id = m.court_id;

    let m = tournament.game_mut(match_id)?;
    m.status = MatchStatus::Completed;
    m.court_id = None;
    m.end_time = Some(now);
    if score.is_some() {
        m.score = score;
    }
    let number = m.match_number;
    if let Some(court_id) = court_id {
        tournament.court_mut(court_id)?.empty_since = Some(now);
    }
    tournament.recently_completed.push(match_id);
    log::info!("Match #{} completed", number);
    Ok(())
}

/// Return a recently completed match to the back of the queue. Score and check-in survive;
/// court and timing do not. Matches no longer in the history are left alone.
pub fn undo_complete(tournament: &mut Tournament, match_id: MatchId) -> UndoOutcome {
    let completed = tournament
        .matches
        .iter()
        .any(|m| m.id == match_id && m.status == MatchStatus::Completed);
    if !completed || !tournament.recently_completed.take(match_id) {
        log::debug!("Undo requested for {} but it is not in recent history", match_id);
        return UndoOutcome::NotInHistory;
    }
    if let Some(idx) = tournament.matches.iter().position(|m| m.id == match_id) {
        let mut m = tournament.matches.remove(idx);
        m.reset_to_pending();
        log::info!("Match #{} restored to the end of the queue", m.match_number);
        tournament.matches.push(m);
    }
    UndoOutcome::Restored
}

/// End warmup and start the match clock. Pause time from warmup is discarded.
pub fn start_match_timer(tournament: &mut Tournament, match_id: MatchId, now: DateTime<Utc>) -> Result<(), ScheduleError> {
    let m = tournament.game_mut(match_id)?;
    if m.status != MatchStatus::Active || !m.timing.in_warmup() {
        return Err(ScheduleError::NotInWarmup(match_id));
    }
    m.timing.begin_match(now);
    log::info!("Match #{} started play", m.match_number);
    Ok(())
}

/// Pause a running timer or resume a paused one. Returns whether the timer is now paused.
pub fn toggle_pause(tournament: &mut Tournament, match_id: MatchId, now: DateTime<Utc>) -> Result<bool, ScheduleError> {
    let m = tournament.game_mut(match_id)?;
    require_status(m, MatchStatus::Active, "pause")?;
    if m.timing.timer_paused {
        m.timing.resume(now);
    } else {
        m.timing.pause(now);
    }
    Ok(m.timing.timer_paused)
}

pub fn update_score(tournament: &mut Tournament, match_id: MatchId, score: Score) -> Result<(), ScheduleError> {
    check_score(&score)?;
    tournament.game_mut(match_id)?.score = Some(score);
    Ok(())
}

/// Flip one side's checked-in flag. Returns the new value.
pub fn toggle_check_in(tournament: &mut Tournament, match_id: MatchId, side: Side) -> Result<bool, ScheduleError> {
    let m = tournament.game_mut(match_id)?;
    let check_in = m.checked_in.get_or_insert_with(Default::default);
    check_in.toggle(side);
    Ok(match side {
        Side::One => check_in.side_1,
        Side::Two => check_in.side_2,
    })
}

/// Move pending match `moved` to the queue position held by pending match `target`.
/// Pending matches stay after all others, as in the order-of-play view.
pub fn reorder_queue(tournament: &mut Tournament, moved: MatchId, target: MatchId) -> Result<(), ScheduleError> {
    for id in [moved, target] {
        require_status(tournament.game(id)?, MatchStatus::Pending, "reorder")?;
    }
    let (mut pending, others): (Vec<GameMatch>, Vec<GameMatch>) = std::mem::take(&mut tournament.matches)
        .into_iter()
        .partition(|m| m.status == MatchStatus::Pending);

    if let (Some(from), Some(to)) = (
        pending.iter().position(|m| m.id == moved),
        pending.iter().position(|m| m.id == target),
    ) {
        let m = pending.remove(from);
        pending.insert(to, m);
    }
    tournament.matches = others;
    tournament.matches.extend(pending);
    Ok(())
}
