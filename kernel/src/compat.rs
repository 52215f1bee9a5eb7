// Hashing support for the kernel's hashbrown maps.
//
// hashbrown's default hasher wants runtime seeding, but kernel tables
// live in const-initialized statics. This fixed multiply-accumulate
// hasher keeps the maps constructible in a `const fn`; the keys are
// kernel-assigned pids, not attacker-chosen input.

use core::hash::{BuildHasher, Hasher};
use hashbrown::HashMap;

/// Default hasher builder that implements Default trait
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultHasherBuilder;

impl BuildHasher for DefaultHasherBuilder {
    type Hasher = DefaultHasher;

    fn build_hasher(&self) -> Self::Hasher {
        DefaultHasher::new()
    }
}

/// Simple hasher implementation
#[derive(Clone, Copy, Debug)]
pub struct DefaultHasher {
    state: u64,
}

impl DefaultHasher {
    /// Create a new hasher
    pub fn new() -> Self {
        Self { state: 0 }
    }
}

impl Default for DefaultHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for DefaultHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state = self.state.wrapping_mul(31).wrapping_add(byte as u64);
        }
    }
}

/// Helper function to create a HashMap with the default hasher
pub fn new_hashmap<K, V>() -> HashMap<K, V, DefaultHasherBuilder> {
    HashMap::with_hasher(DefaultHasherBuilder)
}
