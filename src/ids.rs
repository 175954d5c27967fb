//! Identifier generation for players, matches and courts.

use uuid::Uuid;

pub trait IdGenerator: Send + Sync {
    fn next_id(&mut self) -> Uuid;
}

/// Random v4 UUIDs.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Deterministic ids 1, 2, 3, ... encoded as UUIDs. Useful in tests and fixtures.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialIds {
    counter: u128,
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> Uuid {
        self.counter += 1;
        Uuid::from_u128(self.counter)
    }
}
