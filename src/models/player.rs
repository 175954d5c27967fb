//! Player data structure.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::game::EventType;

/// Unique identifier for a player (used in matches and lookups).
pub type PlayerId = Uuid;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

/// A player registered for the tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub gender: Option<Gender>,
    /// Events the player is entered in. Informational only, not enforced when building matches.
    pub events: Vec<EventType>,
    pub notes: Option<String>,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            gender: None,
            events: Vec::new(),
            notes: None,
        }
    }

    /// Apply the fields present in `update`; absent fields keep their value.
    pub fn apply(&mut self, update: PlayerUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(events) = update.events {
            self.events = events;
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
    }
}

/// Partial update for a player. `Some(None)` clears an optional attribute.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PlayerUpdate {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub gender: Option<Option<Gender>>,
    pub events: Option<Vec<EventType>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub notes: Option<Option<String>>,
}
