//! Timer accounting for matches on court.
//!
//! Everything here is a pure function of a match's [`TimingEnvelope`] and an instant.
//! A periodic tick only decides how often these are called; evaluating at any instant
//! gives the value for that instant, and while a timer is paused the result is frozen
//! at the moment the pause began.

use crate::config::SchedulerConfig;
use crate::models::{Court, GameMatch, TimingEnvelope};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Warmup,
    Match,
}

/// Derived timer values for one instant.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct TimerState {
    pub phase: TimerPhase,
    pub warmup_elapsed_ms: i64,
    /// Never negative; stays at 0 once warmup has run out.
    pub warmup_remaining_ms: i64,
    pub match_elapsed_ms: i64,
    /// Inside the final flash window of warmup (remaining > 0).
    pub flashing: bool,
    pub paused: bool,
}

/// The instant the timer reads at `now`: the pause start while paused.
fn reading_instant(envelope: &TimingEnvelope, now: DateTime<Utc>) -> DateTime<Utc> {
    match (envelope.timer_paused, envelope.last_pause_time) {
        (true, Some(paused_at)) => paused_at.min(now),
        _ => now,
    }
}

fn since_ms(start: DateTime<Utc>, at: DateTime<Utc>, paused_ms: i64) -> i64 {
    ((at - start).num_milliseconds() - paused_ms).max(0)
}

/// Warmup time left at `now`, not clamped. `None` unless the match is still warming up.
pub fn raw_warmup_remaining_ms(envelope: &TimingEnvelope, config: &SchedulerConfig, now: DateTime<Utc>) -> Option<i64> {
    if envelope.match_start_time.is_some() {
        return None;
    }
    let warmup_start = envelope.warmup_start_time?;
    let at = reading_instant(envelope, now);
    Some(config.warmup_ms() - since_ms(warmup_start, at, envelope.paused_duration_ms))
}

/// Timer values at `now`, or `None` if the match has not been put on court.
pub fn derive_timer_state(envelope: &TimingEnvelope, config: &SchedulerConfig, now: DateTime<Utc>) -> Option<TimerState> {
    let warmup_start = envelope.warmup_start_time?;
    let at = reading_instant(envelope, now);
    let paused = envelope.timer_paused;

    let state = match envelope.match_start_time {
        Some(match_start) => TimerState {
            phase: TimerPhase::Match,
            warmup_elapsed_ms: config.warmup_ms(),
            warmup_remaining_ms: 0,
            match_elapsed_ms: since_ms(match_start, at, envelope.paused_duration_ms),
            flashing: false,
            paused,
        },
        None => {
            let elapsed = since_ms(warmup_start, at, envelope.paused_duration_ms);
            let remaining = config.warmup_ms() - elapsed;
            TimerState {
                phase: TimerPhase::Warmup,
                warmup_elapsed_ms: elapsed,
                warmup_remaining_ms: remaining.max(0),
                match_elapsed_ms: 0,
                flashing: remaining > 0 && remaining <= config.flash_ms(),
                paused,
            }
        }
    };
    Some(state)
}

/// Timer values for `game` at `now`. A completed match reads as of its end time, so its
/// clock stops when it leaves the court.
pub fn match_timer_state(game: &GameMatch, config: &SchedulerConfig, now: DateTime<Utc>) -> Option<TimerState> {
    let at = game.end_time.map_or(now, |end| end.min(now));
    derive_timer_state(&game.timing, config, at)
}

/// True iff warmup ran out somewhere in `(earlier, later]` while the match had not started.
/// Calling this over back-to-back tick intervals reports the end of warmup exactly once.
pub fn green_flash_between(
    envelope: &TimingEnvelope,
    config: &SchedulerConfig,
    earlier: DateTime<Utc>,
    later: DateTime<Utc>,
) -> bool {
    match (
        raw_warmup_remaining_ms(envelope, config, earlier),
        raw_warmup_remaining_ms(envelope, config, later),
    ) {
        (Some(before), Some(after)) => before > 0 && after <= 0,
        _ => false,
    }
}

/// How long a court has stood empty since its last match left it.
pub fn empty_court_elapsed_ms(court: &Court, now: DateTime<Utc>) -> Option<i64> {
    court
        .empty_since
        .map(|since| (now - since).num_milliseconds().max(0))
}

/// `m:ss` rendering of a millisecond count.
pub fn format_clock(ms: i64) -> String {
    let total_seconds = ms.max(0) / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}
