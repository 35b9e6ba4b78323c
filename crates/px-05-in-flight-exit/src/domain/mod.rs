//! Domain layer for the In-Flight Exit engine.

pub mod entities;
pub mod errors;
pub mod exit_map;
pub mod requests;

pub use entities::{InFlightExit, PiggybackOutcome, StartedInFlightExit, WithdrawData};
pub use errors::InFlightExitError;
pub use exit_map::ExitMap;
