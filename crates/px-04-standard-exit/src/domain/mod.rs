//! Domain layer for the Standard Exit engine.

pub mod entities;
pub mod errors;
pub mod requests;

pub use entities::{StandardExit, StartedStandardExit};
pub use errors::StandardExitError;
pub use requests::{ChallengeStandardExitRequest, StartStandardExitRequest};
