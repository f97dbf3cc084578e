//! Uniform random selection over listings.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Picks a uniformly random index in `[0, len)`.
///
/// The default picker draws from the thread-local process RNG. A seeded
/// picker is reproducible across runs and is meant for tests.
#[derive(Debug, Default)]
pub struct Picker {
    seeded: Option<Mutex<StdRng>>,
}

impl Picker {
    /// Picker backed by the process RNG.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Picker with a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self { seeded: Some(Mutex::new(StdRng::seed_from_u64(seed))) }
    }

    /// Uniform index in `[0, len)`, or `None` when `len` is zero.
    #[must_use]
    pub fn index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let idx = match &self.seeded {
            // A poisoned lock still holds a usable RNG state.
            Some(rng) => match rng.lock() {
                Ok(mut guard) => guard.gen_range(0..len),
                Err(poisoned) => poisoned.into_inner().gen_range(0..len),
            },
            None => rand::thread_rng().gen_range(0..len),
        };
        Some(idx)
    }

    /// Uniformly pick one item.
    #[must_use]
    pub fn pick<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        self.index(items.len()).map(|i| &items[i])
    }
}
