//! Framework configuration shared by all subsystems.

use crate::Timestamp;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Plasma framework configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlasmaConfig {
    /// Spacing of operator-submitted child blocks; any block number not
    /// on this grid is a deposit block.
    pub child_block_interval: u64,
    /// Minimum exit period (challenge window), in seconds.
    pub min_exit_period: Timestamp,
    /// Quarantine applied to newly registered vaults and exit games,
    /// in seconds.
    pub quarantine_period: Timestamp,
    /// Number of vault registrations exempt from quarantine, used to
    /// bootstrap the genesis vaults.
    pub initial_immune_vaults: u32,
    /// Number of exit-game registrations exempt from quarantine.
    pub initial_immune_exit_games: u32,
    /// Starting bond for standard exits.
    pub standard_exit_bond: U256,
    /// Starting bond for opening an in-flight exit.
    pub in_flight_exit_bond: U256,
    /// Starting bond for piggybacking one input or output.
    pub piggyback_bond: U256,
    /// Starting bounty paid to whoever processes an exit.
    pub process_bounty: U256,
}

impl Default for PlasmaConfig {
    fn default() -> Self {
        Self {
            child_block_interval: 1000,
            min_exit_period: 7 * 24 * 3600,
            quarantine_period: 7 * 24 * 3600,
            initial_immune_vaults: 2,
            initial_immune_exit_games: 1,
            standard_exit_bond: U256::from(14_000_000_000_000_000u64),
            in_flight_exit_bond: U256::from(37_000_000_000_000_000u64),
            piggyback_bond: U256::from(28_000_000_000_000_000u64),
            process_bounty: U256::from(500_000_000_000_000u64),
        }
    }
}

/// Vault id for the native asset.
pub const NATIVE_VAULT_ID: u32 = 1;

/// Vault id for the fungible-token family.
pub const TOKEN_VAULT_ID: u32 = 2;

impl PlasmaConfig {
    /// End of the piggyback / canonicity-challenge phase for an exit
    /// opened at `start`.
    pub fn first_phase_end(&self, start: Timestamp) -> Timestamp {
        start + self.min_exit_period / 2
    }

    /// Which vault family a token exits through.
    pub fn vault_id_for(&self, token: &crate::TokenId) -> u32 {
        if *token == crate::NATIVE_TOKEN {
            NATIVE_VAULT_ID
        } else {
            TOKEN_VAULT_ID
        }
    }
}
