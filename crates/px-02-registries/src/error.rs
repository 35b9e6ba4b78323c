//! Error types for the framework registries.

use shared_types::Timestamp;
use thiserror::Error;

/// All errors the registries can produce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Caller does not hold the operator capability.
    #[error("Unauthorized: operator capability required")]
    Unauthorized,

    /// The zero key is reserved as a sentinel.
    #[error("Zero key is forbidden")]
    ZeroKey,

    /// The zero address is reserved as a sentinel.
    #[error("Zero address is forbidden")]
    ZeroAddress,

    /// The key (or bound address) is already registered.
    #[error("Already registered: {what}")]
    AlreadyRegistered {
        /// Which binding collided.
        what: String,
    },

    /// No entry under the given key.
    #[error("Not registered: {what}")]
    NotRegistered {
        /// Which lookup missed.
        what: String,
    },

    /// The entry exists but its quarantine has not elapsed.
    #[error("Quarantined until {until}")]
    Quarantined {
        /// Timestamp at which the entry becomes trusted.
        until: Timestamp,
    },

    /// The registry was frozen; no further registration, ever.
    #[error("Registry is frozen")]
    Frozen,
}
