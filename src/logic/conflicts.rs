//! Double-booking check: which players of a queued match are on court right now.

use crate::models::{GameMatch, MatchId, MatchStatus, Player, PlayerId};
use serde::Serialize;

/// A player who cannot start a match because they are playing elsewhere.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Conflict {
    pub player_id: PlayerId,
    /// Active match the player is in.
    pub busy_in: MatchId,
    pub reason: String,
}

/// Conflicts for `game` against the active matches in `matches`. Only pending matches
/// can conflict; anything else yields an empty list. Nothing is cached.
pub fn conflicts_for(game: &GameMatch, matches: &[GameMatch], players: &[Player]) -> Vec<Conflict> {
    if game.status != MatchStatus::Pending {
        return Vec::new();
    }
    game.player_ids
        .iter()
        .filter_map(|&player_id| {
            let busy = matches
                .iter()
                .filter(|m| m.status == MatchStatus::Active && m.id != game.id)
                .find(|m| m.involves(player_id))?;
            let name = players
                .iter()
                .find(|p| p.id == player_id)
                .map_or("Unknown player", |p| p.name.as_str());
            Some(Conflict {
                player_id,
                busy_in: busy.id,
                reason: format!("{} is currently playing", name),
            })
        })
        .collect()
}

/// True if `player_id` is in no active match.
pub fn is_player_available(player_id: PlayerId, matches: &[GameMatch]) -> bool {
    !matches
        .iter()
        .any(|m| m.status == MatchStatus::Active && m.involves(player_id))
}
