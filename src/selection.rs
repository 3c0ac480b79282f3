//! Entity selection policies.
//!
//! Every "which one?" decision of a run (which hotel a guest books, which room
//! type, which guest's reservation gets cancelled) goes through a
//! [`SelectionPolicy`]. The policy only ever sees non-empty candidate lists;
//! the empty case is the caller's to handle, which [`choose`] surfaces as
//! `None`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::num::NonZeroUsize;

/// Chooses one element out of a non-empty candidate sequence.
pub trait SelectionPolicy: Send {
    /// Index in `0..len`.
    fn choose_index(&mut self, len: NonZeroUsize) -> usize;
}

/// Pick one element of `items`, or `None` when there is nothing to pick from.
pub fn choose<'a, T>(policy: &mut dyn SelectionPolicy, items: &'a [T]) -> Option<&'a T> {
    let len = NonZeroUsize::new(items.len())?;
    let idx = policy.choose_index(len);
    items.get(idx.min(len.get() - 1))
}

/// Uniform selection driven by a seeded RNG; the same seed replays the same
/// choices.
#[derive(Debug, Clone)]
pub struct SeededSelection {
    rng: StdRng,
}

impl SeededSelection {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl SelectionPolicy for SeededSelection {
    fn choose_index(&mut self, len: NonZeroUsize) -> usize {
        self.rng.gen_range(0..len.get())
    }
}

/// Replays a fixed list of indices, wrapping each into range and cycling
/// when exhausted. An empty script always picks the first candidate.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSelection {
    picks: Vec<usize>,
    cursor: usize,
}

impl ScriptedSelection {
    pub fn new(picks: Vec<usize>) -> Self {
        Self { picks, cursor: 0 }
    }

    /// Always choose the first candidate.
    pub fn first() -> Self {
        Self::default()
    }
}

impl SelectionPolicy for ScriptedSelection {
    fn choose_index(&mut self, len: NonZeroUsize) -> usize {
        if self.picks.is_empty() {
            return 0;
        }
        let pick = self.picks[self.cursor % self.picks.len()];
        self.cursor += 1;
        pick % len.get()
    }
}
