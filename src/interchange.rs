//! CSV and JSON import/export of the match list.
//!
//! Records use the columns `MatchID, Player1, Player2, ScheduledTime, Court, Status`.
//! These adapters sit outside the scheduling core: importing only calls
//! [`Scheduler`] operations, exporting only reads a [`Tournament`].

use crate::models::{EventType, MatchId, MatchStatus, PlayerId, ScheduleError, Side, Tournament};
use crate::scheduler::{NewMatch, Scheduler};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;

/// Errors from reading or writing interchange files.
#[derive(Debug)]
pub enum InterchangeError {
    Csv(csv::Error),
    Json(serde_json::Error),
    Io(io::Error),
}

impl std::fmt::Display for InterchangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterchangeError::Csv(e) => write!(f, "Invalid CSV: {}", e),
            InterchangeError::Json(e) => write!(f, "Invalid JSON: {}", e),
            InterchangeError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for InterchangeError {}

impl From<csv::Error> for InterchangeError {
    fn from(e: csv::Error) -> Self {
        InterchangeError::Csv(e)
    }
}

impl From<serde_json::Error> for InterchangeError {
    fn from(e: serde_json::Error) -> Self {
        InterchangeError::Json(e)
    }
}

impl From<io::Error> for InterchangeError {
    fn from(e: io::Error) -> Self {
        InterchangeError::Io(e)
    }
}

/// One row of an exported or imported match list.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "MatchID", alias = "Match ID", alias = "matchId")]
    pub match_id: String,
    #[serde(rename = "Player1", alias = "Player 1", alias = "player1Name")]
    pub player1: String,
    #[serde(rename = "Player2", alias = "Player 2", alias = "player2Name")]
    pub player2: String,
    #[serde(rename = "ScheduledTime", alias = "Scheduled Time", alias = "scheduledTime", default)]
    pub scheduled_time: Option<String>,
    #[serde(rename = "Court", alias = "court", default)]
    pub court: Option<String>,
    #[serde(rename = "Status", alias = "status", default)]
    pub status: Option<String>,
}

/// JSON export document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduleExport {
    pub tournament: String,
    pub date: DateTime<Utc>,
    pub matches: Vec<MatchRecord>,
}

/// What an import did.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ImportReport {
    pub created: Vec<MatchId>,
    pub players_created: usize,
    /// Rows that could not be imported: (MatchID, reason).
    pub skipped: Vec<(String, String)>,
}

pub fn read_csv<R: io::Read>(reader: R) -> Result<Vec<MatchRecord>, InterchangeError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();
    for row in rdr.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

pub fn write_csv<W: io::Write>(writer: W, records: &[MatchRecord]) -> Result<(), InterchangeError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_json(export: &ScheduleExport) -> Result<String, InterchangeError> {
    Ok(serde_json::to_string_pretty(export)?)
}

pub fn from_json(text: &str) -> Result<ScheduleExport, InterchangeError> {
    Ok(serde_json::from_str(text)?)
}

/// Like [`from_json`] for a raw body. Invalid UTF-8 is an error, not replaced.
pub fn from_json_bytes(bytes: &[u8]) -> Result<ScheduleExport, InterchangeError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Accepts RFC 3339, or `YYYY-MM-DD HH:MM[:SS]` / `YYYY-MM-DDTHH:MM[:SS]` read as UTC.
pub fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Create matches from records. Players are matched by name (case-insensitive) and
/// created when missing. A side written as "A / B" makes the row a doubles match (MD),
/// otherwise it is singles (MS). A numeric MatchID becomes the match number. Every match
/// is queued as pending; court and non-pending status columns are not replayed.
///
/// A skipped row leaves nothing behind: players created for it are removed again.
pub fn import_records(scheduler: &mut Scheduler, records: &[MatchRecord]) -> ImportReport {
    let mut report = ImportReport::default();
    for record in records {
        let mut new_players = Vec::new();
        match import_one(scheduler, record, &mut new_players) {
            Ok(id) => {
                report.created.push(id);
                report.players_created += new_players.len();
            }
            Err(e) => {
                for id in new_players {
                    if let Err(undo) = scheduler.remove_player(id) {
                        log::warn!("Could not roll back player {}: {}", id, undo);
                    }
                }
                log::warn!("Skipping imported match {}: {}", record.match_id, e);
                report.skipped.push((record.match_id.clone(), e.to_string()));
            }
        }
    }
    log::info!(
        "Imported {} match(es), skipped {}, created {} player(s)",
        report.created.len(),
        report.skipped.len(),
        report.players_created
    );
    report
}

/// Names in player-slot order: side one's first, side two's first, then the partners.
fn slot_names<'a>(side_1: &'a str, side_2: &'a str) -> Vec<&'a str> {
    let side_1: Vec<&str> = side_1.split(" / ").map(str::trim).collect();
    let side_2: Vec<&str> = side_2.split(" / ").map(str::trim).collect();
    let mut names = Vec::with_capacity(4);
    for i in 0..side_1.len().max(side_2.len()) {
        names.extend(side_1.get(i));
        names.extend(side_2.get(i));
    }
    names
}

fn import_one(
    scheduler: &mut Scheduler,
    record: &MatchRecord,
    new_players: &mut Vec<PlayerId>,
) -> Result<MatchId, ScheduleError> {
    let names = slot_names(&record.player1, &record.player2);
    let event = if names.len() > 2 { EventType::MD } else { EventType::MS };

    let mut player_ids = Vec::with_capacity(names.len());
    for name in names {
        let existing = scheduler.tournament().player_by_name(name).map(|p| p.id);
        let id = match existing {
            Some(id) => id,
            None => {
                let id = scheduler.create_player(name)?;
                new_players.push(id);
                id
            }
        };
        player_ids.push(id);
    }

    let status = record.status.as_deref().and_then(|s| s.parse::<MatchStatus>().ok());
    if matches!(status, Some(s) if s != MatchStatus::Pending) || record.court.is_some() {
        log::warn!("Match {} imported as pending; court and status are not replayed", record.match_id);
    }

    let mut new = NewMatch::new(event, player_ids);
    new.scheduled_time = record.scheduled_time.as_deref().and_then(parse_time);
    new.match_number = record.match_id.trim().parse().ok();
    scheduler.create_match(new)
}

/// Records for every match in queue order. Doubles sides are written as "A / B", which
/// [`import_records`] reads back as a doubles match. The event type itself is not a column,
/// so singles come back as MS and doubles as MD.
pub fn export_records(tournament: &Tournament) -> Vec<MatchRecord> {
    let side_names = |ids: Vec<PlayerId>| {
        ids.iter()
            .map(|id| tournament.player(*id).map_or("?", |p| p.name.as_str()))
            .collect::<Vec<_>>()
            .join(" / ")
    };
    tournament
        .matches()
        .iter()
        .map(|m| MatchRecord {
            match_id: m.match_number.to_string(),
            player1: side_names(m.side(Side::One)),
            player2: side_names(m.side(Side::Two)),
            scheduled_time: m
                .scheduled_time
                .or(m.timing.start_time)
                .map(|t| t.to_rfc3339()),
            court: m
                .court_id
                .and_then(|id| tournament.court(id).ok())
                .map(|c| c.name.clone()),
            status: Some(m.status.as_str().to_string()),
        })
        .collect()
}

pub fn export_json(tournament: &Tournament, name: &str, date: DateTime<Utc>) -> ScheduleExport {
    ScheduleExport {
        tournament: name.to_string(),
        date,
        matches: export_records(tournament),
    }
}
