//! Scheduler settings: warmup timing and court grid dimensions.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Length of the warmup countdown.
    #[serde(default = "default_warmup_seconds")]
    pub warmup_seconds: u32,
    /// Final stretch of warmup during which the court flashes.
    #[serde(default = "default_flash_seconds")]
    pub flash_seconds: u32,
    #[serde(default = "default_grid_rows")]
    pub grid_rows: usize,
    #[serde(default = "default_grid_cols")]
    pub grid_cols: usize,
    /// Courts created when the scheduler starts.
    #[serde(default = "default_initial_courts")]
    pub initial_courts: usize,
    /// Spacing between consecutive scheduled times in the order of play.
    #[serde(default = "default_match_interval_minutes")]
    pub match_interval_minutes: u32,
}

fn default_warmup_seconds() -> u32 {
    300
}

fn default_flash_seconds() -> u32 {
    10
}

fn default_grid_rows() -> usize {
    40
}

fn default_grid_cols() -> usize {
    30
}

fn default_initial_courts() -> usize {
    4
}

fn default_match_interval_minutes() -> u32 {
    30
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            warmup_seconds: default_warmup_seconds(),
            flash_seconds: default_flash_seconds(),
            grid_rows: default_grid_rows(),
            grid_cols: default_grid_cols(),
            initial_courts: default_initial_courts(),
            match_interval_minutes: default_match_interval_minutes(),
        }
    }
}

impl SchedulerConfig {
    /// Defaults overridden by WARMUP_SECONDS, FLASH_SECONDS, GRID_ROWS, GRID_COLS,
    /// NUM_COURTS and MATCH_INTERVAL_MINUTES. Values that fail to parse are ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            warmup_seconds: env_or("WARMUP_SECONDS", defaults.warmup_seconds),
            flash_seconds: env_or("FLASH_SECONDS", defaults.flash_seconds),
            grid_rows: env_or("GRID_ROWS", defaults.grid_rows),
            grid_cols: env_or("GRID_COLS", defaults.grid_cols),
            initial_courts: env_or("NUM_COURTS", defaults.initial_courts),
            match_interval_minutes: env_or("MATCH_INTERVAL_MINUTES", defaults.match_interval_minutes),
        }
    }

    pub fn warmup_ms(&self) -> i64 {
        i64::from(self.warmup_seconds) * 1000
    }

    pub fn flash_ms(&self) -> i64 {
        i64::from(self.flash_seconds) * 1000
    }

    /// Times of day a match can be scheduled at: midnight onwards in steps of
    /// `match_interval_minutes`, restarting at the top of each hour.
    pub fn time_slots(&self) -> Vec<NaiveTime> {
        let step = self.match_interval_minutes.clamp(1, 60);
        (0..24)
            .flat_map(|hour| (0..60).step_by(step as usize).map(move |minute| (hour, minute)))
            .filter_map(|(hour, minute)| NaiveTime::from_hms_opt(hour, minute, 0))
            .collect()
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                log::warn!("Ignoring {}={:?}: not a valid number", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}
