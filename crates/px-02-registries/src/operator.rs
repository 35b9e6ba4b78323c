//! # Operator Capability
//!
//! Registry writes are gated by possession of an [`OperatorToken`]. The
//! token is minted exactly once per framework instance, is not `Clone`,
//! and carries a random id the registries are constructed against, so
//! authority flows through an explicit value instead of ambient state.

use uuid::Uuid;

/// Capability required for registry writes.
///
/// Deliberately not `Clone`: whoever holds the value is the operator.
#[derive(Debug)]
pub struct OperatorToken {
    id: Uuid,
}

impl OperatorToken {
    /// Mints a fresh operator capability.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }

    /// The token's identity, recorded by registries at construction.
    pub fn id(&self) -> Uuid {
        self.id
    }
}
