//! # Bond Size State
//!
//! A bond value with a pending update. `current(now)` resolves which of
//! the two values is in effect; nothing ever mutates on read, so the
//! resolution is a pure function of the clock.

use crate::error::BondError;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use shared_types::Timestamp;

/// Waiting period before a proposed bond value takes effect, in seconds.
pub const UPDATE_WAITING_PERIOD: Timestamp = 2 * 24 * 3600;

/// A rate-limited updatable bond value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondSize {
    previous: U256,
    updated: U256,
    /// When `updated` becomes the effective value.
    effective_at: Timestamp,
}

impl BondSize {
    /// Creates a bond already in effect at `initial`.
    pub fn new(initial: U256) -> Self {
        Self {
            previous: initial,
            updated: initial,
            effective_at: 0,
        }
    }

    /// The value in effect at `now`.
    pub fn current(&self, now: Timestamp) -> U256 {
        if now >= self.effective_at {
            self.updated
        } else {
            self.previous
        }
    }

    /// Proposes a new value, bounded to the `[current / 2, current * 2]`
    /// band. A proposal made while another is still waiting replaces it
    /// and restarts the waiting period.
    pub fn propose(&mut self, new_value: U256, now: Timestamp) -> Result<(), BondError> {
        let current = self.current(now);
        if new_value > current * U256::from(2) {
            return Err(BondError::TooHigh {
                proposed: new_value,
                current,
            });
        }
        if new_value < current / U256::from(2) {
            return Err(BondError::TooLow {
                proposed: new_value,
                current,
            });
        }
        self.previous = current;
        self.updated = new_value;
        self.effective_at = now + UPDATE_WAITING_PERIOD;
        Ok(())
    }
}
