//! Integration tests for the match lifecycle: activation, undo paths, completion and editing.

mod common;

use common::{doubles, players, scheduler, singles};
use court_scheduler::{
    ErrorKind, EventType, MatchDetailsUpdate, MatchStatus, NewMatch, PlayerUpdate, ScheduleError,
    Score, SetScore, Side, TimingEnvelope, UndoOutcome,
};
use uuid::Uuid;

fn score(sets: &[(u32, u32)]) -> Score {
    Score::new(
        sets.iter()
            .map(|&(a, b)| SetScore { side_1: a, side_2: b })
            .collect(),
    )
}

#[test]
fn activation_links_match_and_court_and_starts_warmup() {
    let (mut s, clock) = scheduler(2);
    let p = players(&mut s, &["Ann", "Bea"]);
    let m = singles(&mut s, p[0], p[1]);
    let court = s.tournament().courts()[1].id;

    clock.set_secs(5);
    s.activate_match(m, court).unwrap();

    let game = s.tournament().game(m).unwrap();
    assert_eq!(game.status, MatchStatus::Active);
    assert_eq!(game.court_id, Some(court));
    assert_eq!(game.timing, TimingEnvelope::started_at(clock.at_secs(5)));
    assert_eq!(s.tournament().current_match(court).map(|g| g.id), Some(m));
    assert_eq!(s.tournament().court(court).unwrap().empty_since, None);
}

#[test]
fn activation_is_refused_without_changing_state() {
    let (mut s, _) = scheduler(1);
    let p = players(&mut s, &["Ann", "Bea", "Cat", "Dee"]);
    let first = singles(&mut s, p[0], p[1]);
    let second = singles(&mut s, p[2], p[3]);
    let court = s.tournament().courts()[0].id;
    let ghost = Uuid::from_u128(999);

    assert_eq!(s.activate_match(first, ghost), Err(ScheduleError::CourtNotFound(ghost)));
    assert_eq!(s.tournament().game(first).unwrap().status, MatchStatus::Pending);

    s.activate_match(first, court).unwrap();
    let before = s.tournament().matches().to_vec();
    assert_eq!(
        s.activate_match(second, court),
        Err(ScheduleError::CourtOccupied { court, by: first })
    );
    let err = s.activate_match(first, court).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    assert_eq!(s.tournament().matches(), before.as_slice());
}

#[test]
fn deactivation_clears_timing_and_stamps_court_empty() {
    let (mut s, clock) = scheduler(1);
    let p = players(&mut s, &["Ann", "Bea"]);
    let m = singles(&mut s, p[0], p[1]);
    let court = s.tournament().courts()[0].id;

    s.activate_match(m, court).unwrap();
    clock.set_secs(30);
    s.toggle_pause(m).unwrap();
    clock.set_secs(45);
    s.deactivate_match(m).unwrap();

    let game = s.tournament().game(m).unwrap();
    assert_eq!(game.status, MatchStatus::Pending);
    assert_eq!(game.court_id, None);
    assert_eq!(game.timing, TimingEnvelope::default());
    assert!(s.tournament().current_match(court).is_none());
    assert_eq!(s.tournament().court(court).unwrap().empty_since, Some(clock.at_secs(45)));

    assert_eq!(s.deactivate_match(m).unwrap_err().kind(), ErrorKind::InvalidTransition);
}

#[test]
fn reactivation_starts_a_fresh_envelope() {
    let (mut s, clock) = scheduler(2);
    let p = players(&mut s, &["Ann", "Bea"]);
    let m = singles(&mut s, p[0], p[1]);
    let courts: Vec<_> = s.tournament().courts().iter().map(|c| c.id).collect();

    s.activate_match(m, courts[0]).unwrap();
    clock.set_secs(10);
    s.toggle_pause(m).unwrap();
    clock.set_secs(20);
    s.start_match_timer(m).unwrap();
    s.toggle_pause(m).unwrap();
    s.deactivate_match(m).unwrap();

    clock.set_secs(100);
    s.activate_match(m, courts[1]).unwrap();
    let game = s.tournament().game(m).unwrap();
    assert_eq!(game.timing, TimingEnvelope::started_at(clock.at_secs(100)));
    assert_eq!(game.court_id, Some(courts[1]));
    assert_eq!(s.tournament().court(courts[1]).unwrap().empty_since, None);
}

#[test]
fn completion_frees_court_and_records_score() {
    let (mut s, clock) = scheduler(1);
    let p = players(&mut s, &["Ann", "Bea"]);
    let m = singles(&mut s, p[0], p[1]);
    let court = s.tournament().courts()[0].id;

    assert_eq!(s.complete_match(m, None).unwrap_err().kind(), ErrorKind::InvalidTransition);

    s.activate_match(m, court).unwrap();
    clock.set_secs(1200);
    s.complete_match(m, Some(score(&[(21, 15), (19, 21), (21, 18)]))).unwrap();

    let game = s.tournament().game(m).unwrap();
    assert_eq!(game.status, MatchStatus::Completed);
    assert_eq!(game.end_time, Some(clock.at_secs(1200)));
    assert_eq!(game.score.as_ref().map(|sc| sc.sets.len()), Some(3));
    assert!(s.tournament().current_match(court).is_none());
    assert_eq!(s.tournament().court(court).unwrap().empty_since, Some(clock.at_secs(1200)));
    assert!(s.tournament().recently_completed().contains(m));

    clock.set_secs(1290);
    assert_eq!(s.empty_court_elapsed(court), Ok(Some(90_000)));
}

#[test]
fn score_with_more_than_three_sets_is_rejected() {
    let (mut s, _) = scheduler(1);
    let p = players(&mut s, &["Ann", "Bea"]);
    let m = singles(&mut s, p[0], p[1]);
    let court = s.tournament().courts()[0].id;
    s.activate_match(m, court).unwrap();

    let four = score(&[(21, 1), (21, 2), (21, 3), (21, 4)]);
    assert_eq!(s.complete_match(m, Some(four.clone())), Err(ScheduleError::TooManySets(4)));
    assert_eq!(s.tournament().game(m).unwrap().status, MatchStatus::Active);
    assert_eq!(s.update_match_score(m, four), Err(ScheduleError::TooManySets(4)));
}

#[test]
fn undo_complete_restores_pending_and_keeps_score() {
    let (mut s, _) = scheduler(1);
    let p = players(&mut s, &["Ann", "Bea"]);
    let m = singles(&mut s, p[0], p[1]);
    let court = s.tournament().courts()[0].id;

    s.toggle_check_in(m, Side::One).unwrap();
    s.activate_match(m, court).unwrap();
    s.complete_match(m, Some(score(&[(21, 10), (21, 12)]))).unwrap();

    assert_eq!(s.undo_complete_match(m), UndoOutcome::Restored);
    let game = s.tournament().game(m).unwrap();
    assert_eq!(game.status, MatchStatus::Pending);
    assert_eq!(game.court_id, None);
    assert_eq!(game.end_time, None);
    assert_eq!(game.timing, TimingEnvelope::default());
    assert_eq!(game.score, Some(score(&[(21, 10), (21, 12)])));
    assert!(game.checked_in.map_or(false, |c| c.side_1));
    assert_eq!(s.tournament().matches().len(), 1);

    assert_eq!(s.undo_complete_match(m), UndoOutcome::NotInHistory);
    assert_eq!(s.tournament().game(m).unwrap().status, MatchStatus::Pending);
}

#[test]
fn undone_match_rejoins_the_back_of_the_queue() {
    let (mut s, _) = scheduler(1);
    let p = players(&mut s, &["Ann", "Bea", "Cat", "Dee"]);
    let first = singles(&mut s, p[0], p[1]);
    let second = singles(&mut s, p[2], p[3]);
    let court = s.tournament().courts()[0].id;
    s.activate_match(first, court).unwrap();
    s.complete_match(first, None).unwrap();

    assert_eq!(s.undo_complete_match(first), UndoOutcome::Restored);
    let order: Vec<_> = s.tournament().matches().iter().map(|m| m.id).collect();
    assert_eq!(order, vec![second, first]);
}

#[test]
fn undo_history_keeps_only_the_ten_most_recent() {
    let (mut s, _) = scheduler(1);
    let court = s.tournament().courts()[0].id;
    let mut done = Vec::new();
    for i in 0..11 {
        let p = players(&mut s, &[&format!("A{i}"), &format!("B{i}")]);
        let m = singles(&mut s, p[0], p[1]);
        s.activate_match(m, court).unwrap();
        s.complete_match(m, None).unwrap();
        done.push(m);
    }
    assert_eq!(s.tournament().recently_completed().len(), 10);
    assert_eq!(s.undo_complete_match(done[0]), UndoOutcome::NotInHistory);
    assert_eq!(s.tournament().game(done[0]).unwrap().status, MatchStatus::Completed);
    // Any entry can be undone, not only the latest.
    assert_eq!(s.undo_complete_match(done[4]), UndoOutcome::Restored);
    assert_eq!(s.undo_complete_match(done[10]), UndoOutcome::Restored);
}

#[test]
fn removing_an_active_match_frees_the_court_without_empty_stamp() {
    let (mut s, _) = scheduler(1);
    let p = players(&mut s, &["Ann", "Bea"]);
    let m = singles(&mut s, p[0], p[1]);
    let court = s.tournament().courts()[0].id;
    s.activate_match(m, court).unwrap();

    s.remove_match(m).unwrap();
    assert!(s.tournament().matches().is_empty());
    assert!(s.tournament().current_match(court).is_none());
    assert_eq!(s.tournament().court(court).unwrap().empty_since, None);
    assert_eq!(s.remove_match(m), Err(ScheduleError::MatchNotFound(m)));
}

#[test]
fn removed_completed_match_cannot_be_undone() {
    let (mut s, _) = scheduler(1);
    let p = players(&mut s, &["Ann", "Bea"]);
    let m = singles(&mut s, p[0], p[1]);
    let court = s.tournament().courts()[0].id;
    s.activate_match(m, court).unwrap();
    s.complete_match(m, None).unwrap();
    s.remove_match(m).unwrap();

    assert!(s.tournament().recently_completed().is_empty());
    assert_eq!(s.undo_complete_match(m), UndoOutcome::NotInHistory);
    assert!(s.tournament().matches().is_empty());
}

#[test]
fn only_the_documented_status_edges_are_reachable() {
    let (mut s, _) = scheduler(1);
    let p = players(&mut s, &["Ann", "Bea"]);
    let m = singles(&mut s, p[0], p[1]);
    let court = s.tournament().courts()[0].id;

    // pending: cannot complete, return to queue, pause or start play
    assert!(s.complete_match(m, None).is_err());
    assert!(s.deactivate_match(m).is_err());
    assert!(s.toggle_pause(m).is_err());
    assert!(s.start_match_timer(m).is_err());
    assert_eq!(s.undo_complete_match(m), UndoOutcome::NotInHistory);

    // active: cannot activate again or undo a completion
    s.activate_match(m, court).unwrap();
    assert!(s.activate_match(m, court).is_err());
    assert_eq!(s.undo_complete_match(m), UndoOutcome::NotInHistory);
    assert_eq!(s.tournament().game(m).unwrap().status, MatchStatus::Active);

    // completed: cannot activate, complete, return to queue or pause
    s.complete_match(m, None).unwrap();
    assert!(s.activate_match(m, court).is_err());
    assert!(s.complete_match(m, None).is_err());
    assert!(s.deactivate_match(m).is_err());
    assert!(s.toggle_pause(m).is_err());
    assert_eq!(s.tournament().game(m).unwrap().status, MatchStatus::Completed);
}

#[test]
fn match_numbers_grow_and_are_never_reused() {
    let (mut s, _) = scheduler(1);
    let p = players(&mut s, &["Ann", "Bea"]);
    let first = singles(&mut s, p[0], p[1]);
    let second = singles(&mut s, p[0], p[1]);
    assert_eq!(s.tournament().game(first).unwrap().match_number, 1);
    assert_eq!(s.tournament().game(second).unwrap().match_number, 2);

    s.remove_match(second).unwrap();
    let third = singles(&mut s, p[0], p[1]);
    assert_eq!(s.tournament().game(third).unwrap().match_number, 3);

    let imported = s
        .create_match(NewMatch::new(EventType::WS, vec![p[0], p[1]]).numbered(10))
        .unwrap();
    assert_eq!(s.tournament().game(imported).unwrap().match_number, 10);
    let next = singles(&mut s, p[0], p[1]);
    assert_eq!(s.tournament().game(next).unwrap().match_number, 11);

    assert_eq!(
        s.create_match(NewMatch::new(EventType::MS, vec![p[0], p[1]]).numbered(3)),
        Err(ScheduleError::DuplicateMatchNumber(3))
    );
    // A lower explicit number that is free is accepted and does not rewind the counter.
    s.create_match(NewMatch::new(EventType::MS, vec![p[0], p[1]]).numbered(2))
        .unwrap();
    assert_eq!(s.tournament().next_match_number(), 12);
}

#[test]
fn match_numbers_stop_below_the_top_of_the_range() {
    let (mut s, _) = scheduler(1);
    let p = players(&mut s, &["Ann", "Bea"]);

    let err = s
        .create_match(NewMatch::new(EventType::MS, vec![p[0], p[1]]).numbered(u32::MAX))
        .unwrap_err();
    assert_eq!(err, ScheduleError::MatchNumberOutOfRange(u32::MAX));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(s.tournament().matches().is_empty());
    assert_eq!(s.tournament().next_match_number(), 1);

    let last = s
        .create_match(NewMatch::new(EventType::MS, vec![p[0], p[1]]).numbered(u32::MAX - 1))
        .unwrap();
    assert_eq!(s.tournament().game(last).unwrap().match_number, u32::MAX - 1);
    assert_eq!(
        s.create_match(NewMatch::new(EventType::MS, vec![p[0], p[1]])),
        Err(ScheduleError::MatchNumberOutOfRange(u32::MAX))
    );
    assert_eq!(s.tournament().matches().len(), 1);

    // Lower free numbers are still accepted explicitly.
    s.create_match(NewMatch::new(EventType::MS, vec![p[0], p[1]]).numbered(5))
        .unwrap();
}

#[test]
fn participants_are_validated() {
    let (mut s, _) = scheduler(1);
    let p = players(&mut s, &["Ann", "Bea", "Cat", "Dee"]);

    assert_eq!(
        s.create_match(NewMatch::new(EventType::MS, p.clone())),
        Err(ScheduleError::WrongPlayerCount { event: EventType::MS, expected: 2, got: 4 })
    );
    assert_eq!(
        s.create_match(NewMatch::new(EventType::XD, vec![p[0], p[1]])),
        Err(ScheduleError::WrongPlayerCount { event: EventType::XD, expected: 4, got: 2 })
    );
    assert_eq!(
        s.create_match(NewMatch::new(EventType::WD, vec![p[0], p[1], p[2], p[0]])),
        Err(ScheduleError::DuplicatePlayerInMatch(p[0]))
    );
    let ghost = Uuid::from_u128(999);
    assert_eq!(
        s.create_match(NewMatch::new(EventType::MS, vec![p[0], ghost])).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert!(s.tournament().matches().is_empty());
}

#[test]
fn editing_details_keeps_status_and_revalidates() {
    let (mut s, clock) = scheduler(1);
    let p = players(&mut s, &["Ann", "Bea", "Cat", "Dee", "Eve"]);
    let m = singles(&mut s, p[0], p[1]);
    let court = s.tournament().courts()[0].id;
    s.activate_match(m, court).unwrap();

    s.update_match_details(
        m,
        MatchDetailsUpdate {
            player2: Some(p[4]),
            scheduled_time: Some(Some(clock.at_secs(3600))),
            ..Default::default()
        },
    )
    .unwrap();
    let game = s.tournament().game(m).unwrap();
    assert_eq!(game.player_ids, vec![p[0], p[4]]);
    assert_eq!(game.scheduled_time, Some(clock.at_secs(3600)));
    assert_eq!(game.status, MatchStatus::Active);

    // Switching to doubles without filling slots 3 and 4 is refused.
    let err = s
        .update_match_details(m, MatchDetailsUpdate { event_type: Some(EventType::MD), ..Default::default() })
        .unwrap_err();
    assert_eq!(err, ScheduleError::WrongPlayerCount { event: EventType::MD, expected: 4, got: 2 });

    s.update_match_details(
        m,
        MatchDetailsUpdate {
            event_type: Some(EventType::MD),
            player3: Some(Some(p[2])),
            player4: Some(Some(p[3])),
            ..Default::default()
        },
    )
    .unwrap();
    let game = s.tournament().game(m).unwrap();
    assert_eq!(game.player_ids, vec![p[0], p[4], p[2], p[3]]);
    assert_eq!(game.side(Side::One), vec![p[0], p[2]]);
    assert_eq!(game.side(Side::Two), vec![p[4], p[3]]);

    // Back to singles: slots 3 and 4 drop away.
    s.update_match_details(
        m,
        MatchDetailsUpdate {
            event_type: Some(EventType::MS),
            player3: Some(None),
            player4: Some(None),
            scheduled_time: Some(None),
            ..Default::default()
        },
    )
    .unwrap();
    let game = s.tournament().game(m).unwrap();
    assert_eq!(game.player_ids, vec![p[0], p[4]]);
    assert_eq!(game.scheduled_time, None);
}

#[test]
fn removing_a_player_cascades_to_their_matches() {
    let (mut s, _) = scheduler(2);
    let p = players(&mut s, &["Ann", "Bea", "Cat", "Dee", "Eve"]);
    let on_court = singles(&mut s, p[0], p[1]);
    let queued = doubles(&mut s, [p[2], p[0], p[3], p[4]]);
    let unrelated = singles(&mut s, p[2], p[3]);
    let court = s.tournament().courts()[0].id;
    s.activate_match(on_court, court).unwrap();

    let removed = s.remove_player(p[0]).unwrap();
    assert_eq!(removed, vec![on_court, queued]);
    let left: Vec<_> = s.tournament().matches().iter().map(|m| m.id).collect();
    assert_eq!(left, vec![unrelated]);
    assert!(s.tournament().current_match(court).is_none());
    assert_eq!(s.tournament().court(court).unwrap().empty_since, None);
    assert!(s.tournament().player(p[0]).is_err());
}

#[test]
fn player_updates_apply_only_present_fields() {
    let (mut s, _) = scheduler(0);
    let id = s.create_player("  Ann  ").unwrap();
    assert_eq!(s.tournament().player(id).unwrap().name, "Ann");

    s.update_player(
        id,
        PlayerUpdate {
            notes: Some(Some("left-handed".to_string())),
            events: Some(vec![EventType::WS, EventType::XD]),
            ..Default::default()
        },
    )
    .unwrap();
    let player = s.tournament().player(id).unwrap();
    assert_eq!(player.name, "Ann");
    assert_eq!(player.notes.as_deref(), Some("left-handed"));
    assert_eq!(player.events, vec![EventType::WS, EventType::XD]);

    assert_eq!(
        s.update_player(id, PlayerUpdate { name: Some(" ".into()), ..Default::default() }),
        Err(ScheduleError::EmptyName)
    );
    assert_eq!(s.create_player(""), Err(ScheduleError::EmptyName));
}

#[test]
fn queue_reorders_pending_matches_only() {
    let (mut s, _) = scheduler(1);
    let p = players(&mut s, &["Ann", "Bea", "Cat", "Dee"]);
    let a = singles(&mut s, p[0], p[1]);
    let b = singles(&mut s, p[2], p[3]);
    let c = singles(&mut s, p[0], p[2]);
    let court = s.tournament().courts()[0].id;
    s.activate_match(a, court).unwrap();

    s.reorder_queue(c, b).unwrap();
    let order: Vec<_> = s.tournament().matches().iter().map(|m| m.id).collect();
    assert_eq!(order, vec![a, c, b]);

    assert_eq!(s.reorder_queue(a, b).unwrap_err().kind(), ErrorKind::InvalidTransition);
}

#[test]
fn check_in_flags_toggle_per_side() {
    let (mut s, _) = scheduler(0);
    let p = players(&mut s, &["Ann", "Bea"]);
    let m = singles(&mut s, p[0], p[1]);

    assert_eq!(s.toggle_check_in(m, Side::Two), Ok(true));
    assert_eq!(s.toggle_check_in(m, Side::One), Ok(true));
    assert_eq!(s.toggle_check_in(m, Side::Two), Ok(false));
    let check_in = s.tournament().game(m).unwrap().checked_in.unwrap();
    assert!(check_in.side_1 && !check_in.side_2);
}
