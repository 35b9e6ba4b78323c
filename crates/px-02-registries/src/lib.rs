//! # PX-02 Registries
//!
//! Write-once maps binding type tags to the pluggable pieces of the exit
//! framework: exit games, vaults, output-guard handlers and spending
//! conditions. A registered entry can never be overwritten; new entries
//! sit in quarantine before anything trusts them, bounding the blast
//! radius of a malicious registration; the condition and guard
//! registries can additionally be frozen for good.
//!
//! Writes require the operator capability handed out exactly once at
//! construction. There is no ambient operator identity.
//!
//! ## Module Structure
//!
//! ```text
//! px-02-registries/
//! ├── error.rs       # RegistryError
//! ├── operator.rs    # OperatorToken capability
//! ├── plugins.rs     # Vault / SpendingCondition / OutputGuardHandler traits
//! ├── store.rs       # WriteOnceMap: quarantine + freeze + immunity
//! └── registries.rs  # The four typed registries
//! ```

pub mod error;
pub mod operator;
pub mod plugins;
pub mod registries;
pub mod store;

pub use error::RegistryError;
pub use operator::OperatorToken;
pub use plugins::{ExitGameEntry, OutputGuardHandler, Protocol, SpendingCondition, Vault};
pub use registries::{
    ExitGameRegistry, OutputGuardHandlerRegistry, SpendingConditionRegistry, VaultRegistry,
};
