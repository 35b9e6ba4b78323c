//! Error types for bond sizing.

use primitive_types::U256;
use thiserror::Error;

/// All errors bond updates can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BondError {
    /// Proposed value exceeds twice the current value.
    #[error("Bond too high: {proposed} > 2 * {current}")]
    TooHigh {
        /// The rejected proposal.
        proposed: U256,
        /// The value currently in effect.
        current: U256,
    },

    /// Proposed value is below half the current value.
    #[error("Bond too low: {proposed} < {current} / 2")]
    TooLow {
        /// The rejected proposal.
        proposed: U256,
        /// The value currently in effect.
        current: U256,
    },
}
