//! # Write-Once Store
//!
//! The map abstraction under every registry: insert-if-absent entries,
//! operator-gated writes, per-entry quarantine with a budget of immune
//! bootstrap slots, and an optional one-way freeze.

use crate::error::RegistryError;
use crate::operator::OperatorToken;
use shared_types::Timestamp;
use std::collections::HashMap;
use uuid::Uuid;

/// One stored entry plus its trust metadata.
#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    registered_at: Timestamp,
    immune: bool,
}

/// Insert-if-absent map with quarantine and freeze semantics.
#[derive(Debug)]
pub struct WriteOnceMap<K, V> {
    entries: HashMap<K, Entry<V>>,
    operator: Uuid,
    quarantine_period: Timestamp,
    /// Remaining registrations exempt from quarantine.
    immune_budget: u32,
    frozen: bool,
}

impl<K, V> WriteOnceMap<K, V>
where
    K: std::hash::Hash + Eq + Clone + std::fmt::Debug,
{
    /// Creates a store bound to the given operator capability.
    pub fn new(operator: &OperatorToken, quarantine_period: Timestamp, immune_budget: u32) -> Self {
        Self {
            entries: HashMap::new(),
            operator: operator.id(),
            quarantine_period,
            immune_budget,
            frozen: false,
        }
    }

    /// Registers `value` under `key`. First registrations within the
    /// immune budget skip quarantine; everything later is quarantined
    /// from `now`.
    pub fn register(
        &mut self,
        token: &OperatorToken,
        key: K,
        value: V,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        self.authorize(token)?;
        if self.frozen {
            return Err(RegistryError::Frozen);
        }
        if self.entries.contains_key(&key) {
            return Err(RegistryError::AlreadyRegistered {
                what: format!("key {key:?}"),
            });
        }
        let immune = if self.immune_budget > 0 {
            self.immune_budget -= 1;
            true
        } else {
            false
        };
        self.entries.insert(
            key,
            Entry {
                value,
                registered_at: now,
                immune,
            },
        );
        Ok(())
    }

    /// Looks up an entry regardless of quarantine state.
    pub fn get(&self, key: &K) -> Result<&V, RegistryError> {
        self.entries
            .get(key)
            .map(|e| &e.value)
            .ok_or_else(|| RegistryError::NotRegistered {
                what: format!("key {key:?}"),
            })
    }

    /// Looks up an entry that must already be trusted: missing keys fail
    /// `NotRegistered`, quarantined ones `Quarantined`.
    pub fn get_trusted(&self, key: &K, now: Timestamp) -> Result<&V, RegistryError> {
        let entry = self
            .entries
            .get(key)
            .ok_or_else(|| RegistryError::NotRegistered {
                what: format!("key {key:?}"),
            })?;
        if !entry.immune {
            let until = entry.registered_at + self.quarantine_period;
            if now < until {
                return Err(RegistryError::Quarantined { until });
            }
        }
        Ok(&entry.value)
    }

    /// Whether `key` has an entry, quarantined or not.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Permanently disables registration.
    pub fn freeze(&mut self, token: &OperatorToken) -> Result<(), RegistryError> {
        self.authorize(token)?;
        self.frozen = true;
        Ok(())
    }

    /// Whether the store has been frozen.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    fn authorize(&self, token: &OperatorToken) -> Result<(), RegistryError> {
        if token.id() != self.operator {
            return Err(RegistryError::Unauthorized);
        }
        Ok(())
    }
}
