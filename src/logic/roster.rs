//! Player roster: add, edit, remove (removal takes the player's matches with it).

use crate::models::{GameMatch, Player, PlayerId, PlayerUpdate, ScheduleError, Tournament};

/// Add a player. Names are trimmed and must not be blank; duplicates are allowed
/// since two entrants can share a name.
pub fn create_player(tournament: &mut Tournament, id: PlayerId, name: &str) -> Result<PlayerId, ScheduleError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ScheduleError::EmptyName);
    }
    tournament.players.push(Player::new(id, name));
    log::info!("Added player {}", name);
    Ok(id)
}

pub fn update_player(tournament: &mut Tournament, id: PlayerId, mut update: PlayerUpdate) -> Result<(), ScheduleError> {
    if let Some(name) = update.name.as_mut() {
        *name = name.trim().to_string();
        if name.is_empty() {
            return Err(ScheduleError::EmptyName);
        }
    }
    tournament.player_mut(id)?.apply(update);
    Ok(())
}

/// Remove a player and every match that references them. Active matches among those
/// simply leave their courts. Returns the removed matches.
pub fn remove_player(tournament: &mut Tournament, id: PlayerId) -> Result<Vec<GameMatch>, ScheduleError> {
    let idx = tournament
        .players
        .iter()
        .position(|p| p.id == id)
        .ok_or(ScheduleError::PlayerNotFound(id))?;
    let player = tournament.players.remove(idx);

    let (removed, kept): (Vec<GameMatch>, Vec<GameMatch>) = std::mem::take(&mut tournament.matches)
        .into_iter()
        .partition(|m| m.involves(id));
    tournament.matches = kept;
    for m in &removed {
        tournament.recently_completed.take(m.id);
    }
    log::info!("Removed player {} and {} match(es)", player.name, removed.len());
    Ok(removed)
}
