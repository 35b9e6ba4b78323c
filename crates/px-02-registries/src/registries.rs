//! # The Four Framework Registries
//!
//! Thin typed facades over [`WriteOnceMap`]:
//!
//! | Registry                  | Key                             | Value                     | Freeze |
//! |---------------------------|---------------------------------|---------------------------|--------|
//! | `ExitGameRegistry`        | tx type                         | `ExitGameEntry`           | no     |
//! | `VaultRegistry`           | vault id                        | `Arc<dyn Vault>`          | no     |
//! | `SpendingConditionRegistry` | (output type, spending tx type) | `Arc<dyn SpendingCondition>` | yes |
//! | `OutputGuardHandlerRegistry` | output type                  | `Arc<dyn OutputGuardHandler>` | yes |

use crate::error::RegistryError;
use crate::operator::OperatorToken;
use crate::plugins::{ExitGameEntry, OutputGuardHandler, SpendingCondition, Vault};
use crate::store::WriteOnceMap;
use shared_types::Timestamp;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// Exit games by transaction type.
pub struct ExitGameRegistry {
    games: WriteOnceMap<u32, ExitGameEntry>,
    bound_addresses: HashSet<shared_types::Address>,
}

impl ExitGameRegistry {
    /// Creates the registry with the configured immune bootstrap budget.
    pub fn new(operator: &OperatorToken, quarantine_period: Timestamp, immune_budget: u32) -> Self {
        Self {
            games: WriteOnceMap::new(operator, quarantine_period, immune_budget),
            bound_addresses: HashSet::new(),
        }
    }

    /// Registers an exit game for `tx_type`. Both the type tag and the
    /// game address are one-way bindings.
    pub fn register(
        &mut self,
        token: &OperatorToken,
        tx_type: u32,
        entry: ExitGameEntry,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        if tx_type == 0 {
            return Err(RegistryError::ZeroKey);
        }
        if entry.game == [0u8; 20] {
            return Err(RegistryError::ZeroAddress);
        }
        if self.bound_addresses.contains(&entry.game) {
            return Err(RegistryError::AlreadyRegistered {
                what: format!("exit game address {:02x?}", entry.game),
            });
        }
        self.games.register(token, tx_type, entry, now)?;
        self.bound_addresses.insert(entry.game);
        info!(tx_type, protocol = ?entry.protocol, "exit game registered");
        Ok(())
    }

    /// The trusted game for `tx_type`; quarantined entries are rejected.
    pub fn game(&self, tx_type: u32, now: Timestamp) -> Result<&ExitGameEntry, RegistryError> {
        self.games.get_trusted(&tx_type, now)
    }
}

/// Vaults by vault id.
pub struct VaultRegistry {
    vaults: WriteOnceMap<u32, Arc<dyn Vault>>,
}

impl VaultRegistry {
    /// Creates the registry with the configured immune bootstrap budget.
    pub fn new(operator: &OperatorToken, quarantine_period: Timestamp, immune_budget: u32) -> Self {
        Self {
            vaults: WriteOnceMap::new(operator, quarantine_period, immune_budget),
        }
    }

    /// Registers a vault under `vault_id`.
    pub fn register(
        &mut self,
        token: &OperatorToken,
        vault_id: u32,
        vault: Arc<dyn Vault>,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        if vault_id == 0 {
            return Err(RegistryError::ZeroKey);
        }
        self.vaults.register(token, vault_id, vault, now)?;
        info!(vault_id, "vault registered");
        Ok(())
    }

    /// The trusted vault under `vault_id`.
    pub fn vault(&self, vault_id: u32, now: Timestamp) -> Result<&Arc<dyn Vault>, RegistryError> {
        self.vaults.get_trusted(&vault_id, now)
    }
}

/// Spending-condition verifiers by `(output_type, spending_tx_type)`.
pub struct SpendingConditionRegistry {
    conditions: WriteOnceMap<(u32, u32), Arc<dyn SpendingCondition>>,
}

impl SpendingConditionRegistry {
    /// Creates the registry. Spending conditions get no immune slots;
    /// every registration is quarantined.
    pub fn new(operator: &OperatorToken, quarantine_period: Timestamp) -> Self {
        Self {
            conditions: WriteOnceMap::new(operator, quarantine_period, 0),
        }
    }

    /// Registers a verifier for outputs of `output_type` being spent by
    /// transactions of `spending_tx_type`.
    pub fn register(
        &mut self,
        token: &OperatorToken,
        output_type: u32,
        spending_tx_type: u32,
        condition: Arc<dyn SpendingCondition>,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        if output_type == 0 || spending_tx_type == 0 {
            return Err(RegistryError::ZeroKey);
        }
        self.conditions
            .register(token, (output_type, spending_tx_type), condition, now)?;
        info!(output_type, spending_tx_type, "spending condition registered");
        Ok(())
    }

    /// The trusted verifier for the pair.
    pub fn condition(
        &self,
        output_type: u32,
        spending_tx_type: u32,
        now: Timestamp,
    ) -> Result<&Arc<dyn SpendingCondition>, RegistryError> {
        self.conditions
            .get_trusted(&(output_type, spending_tx_type), now)
    }

    /// One-way governance lockout.
    pub fn freeze(&mut self, token: &OperatorToken) -> Result<(), RegistryError> {
        self.conditions.freeze(token)
    }

    /// Whether the registry has been frozen.
    pub fn is_frozen(&self) -> bool {
        self.conditions.is_frozen()
    }
}

/// Output-guard handlers by output type.
pub struct OutputGuardHandlerRegistry {
    handlers: WriteOnceMap<u32, Arc<dyn OutputGuardHandler>>,
}

impl OutputGuardHandlerRegistry {
    /// Creates the registry; every registration is quarantined.
    pub fn new(operator: &OperatorToken, quarantine_period: Timestamp) -> Self {
        Self {
            handlers: WriteOnceMap::new(operator, quarantine_period, 0),
        }
    }

    /// Registers the handler interpreting guards of `output_type`.
    pub fn register(
        &mut self,
        token: &OperatorToken,
        output_type: u32,
        handler: Arc<dyn OutputGuardHandler>,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        if output_type == 0 {
            return Err(RegistryError::ZeroKey);
        }
        self.handlers.register(token, output_type, handler, now)?;
        info!(output_type, "output guard handler registered");
        Ok(())
    }

    /// The trusted handler for `output_type`.
    pub fn handler(
        &self,
        output_type: u32,
        now: Timestamp,
    ) -> Result<&Arc<dyn OutputGuardHandler>, RegistryError> {
        self.handlers.get_trusted(&output_type, now)
    }

    /// One-way governance lockout.
    pub fn freeze(&mut self, token: &OperatorToken) -> Result<(), RegistryError> {
        self.handlers.freeze(token)
    }

    /// Whether the registry has been frozen.
    pub fn is_frozen(&self) -> bool {
        self.handlers.is_frozen()
    }
}
