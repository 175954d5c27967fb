//! Shared fixtures: a scheduler on a manual clock with deterministic ids.

#![allow(dead_code)]

use court_scheduler::{
    EventType, ManualClock, MatchId, NewMatch, PlayerId, Scheduler, SchedulerConfig, SequentialIds,
};

pub fn scheduler_with(config: SchedulerConfig) -> (Scheduler, ManualClock) {
    let clock = ManualClock::default();
    let s = Scheduler::with_sources(config, Box::new(clock.clone()), Box::new(SequentialIds::default()))
        .expect("config within grid capacity");
    (s, clock)
}

pub fn scheduler(courts: usize) -> (Scheduler, ManualClock) {
    scheduler_with(SchedulerConfig {
        initial_courts: courts,
        ..SchedulerConfig::default()
    })
}

pub fn players(s: &mut Scheduler, names: &[&str]) -> Vec<PlayerId> {
    names.iter().map(|n| s.create_player(n).unwrap()).collect()
}

pub fn singles(s: &mut Scheduler, a: PlayerId, b: PlayerId) -> MatchId {
    s.create_match(NewMatch::new(EventType::MS, vec![a, b])).unwrap()
}

pub fn doubles(s: &mut Scheduler, ids: [PlayerId; 4]) -> MatchId {
    s.create_match(NewMatch::new(EventType::MD, ids.to_vec())).unwrap()
}
