//! Countdown and cooldown helpers
//!
//! Every timed behavior in the simulation (flipper windows, per-body hit
//! cooldowns, settle tracking) is a value that gets decremented once per tick
//! and simply expires. There is no scheduler.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A countdown that expires when it reaches zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    remaining: f32,
}

impl Countdown {
    /// An already-expired countdown
    pub const EXPIRED: Countdown = Countdown { remaining: 0.0 };

    pub fn new(duration: f32) -> Self {
        Self {
            remaining: duration.max(0.0),
        }
    }

    /// Restart with a fresh duration
    pub fn start(&mut self, duration: f32) {
        self.remaining = duration.max(0.0);
    }

    /// Force expiry
    pub fn expire(&mut self) {
        self.remaining = 0.0;
    }

    /// Advance by `dt`. Returns true only on the tick the countdown expires.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.remaining <= 0.0 {
            return false;
        }
        self.remaining = (self.remaining - dt).max(0.0);
        self.remaining == 0.0
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    #[inline]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

/// Accumulates time while a condition holds, resets when it doesn't
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stopwatch {
    elapsed: f32,
}

impl Stopwatch {
    /// Accumulate `dt` if `running`, otherwise reset to zero
    pub fn update(&mut self, running: bool, dt: f32) {
        if running {
            self.elapsed += dt;
        } else {
            self.elapsed = 0.0;
        }
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

/// Per-key cooldowns (ordered by key for deterministic iteration)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooldownMap<K: Ord> {
    entries: BTreeMap<K, Countdown>,
}

impl<K: Ord> Default for CooldownMap<K> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy> CooldownMap<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `key` on cooldown for `duration` seconds (replaces any existing entry)
    pub fn insert(&mut self, key: K, duration: f32) {
        self.entries.insert(key, Countdown::new(duration));
    }

    /// True while `key` has an unexpired entry
    pub fn is_cooling(&self, key: K) -> bool {
        self.entries.get(&key).is_some_and(Countdown::is_active)
    }

    pub fn remove(&mut self, key: K) {
        self.entries.remove(&key);
    }

    pub fn remaining(&self, key: K) -> Option<f32> {
        self.entries.get(&key).map(Countdown::remaining)
    }

    /// Decrement every entry and drop the expired ones
    pub fn tick(&mut self, dt: f32) {
        for countdown in self.entries.values_mut() {
            countdown.tick(dt);
        }
        self.entries.retain(|_, c| c.is_active());
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
