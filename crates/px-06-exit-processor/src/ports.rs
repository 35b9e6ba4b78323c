//! Driving port of the framework: the async API the outside world
//! calls. Implemented by [`crate::service::PlasmaFramework`].

use crate::error::ProcessorError;
use async_trait::async_trait;
use px_04_standard_exit::{ChallengeStandardExitRequest, StartStandardExitRequest};
use px_05_in_flight_exit::{
    ChallengeCanonicityRequest, ChallengeInputSpentRequest, ChallengeOutputSpentRequest,
    PiggybackInputRequest, PiggybackOutputRequest, RespondCanonicityRequest,
    StartInFlightExitRequest,
};
use shared_types::{Address, ExitId, TokenId};
use uuid::Uuid;

/// A value plus the correlation id under which the call's events were
/// broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tracked<T> {
    /// Correlates the response with the broadcast events of the call.
    pub correlation_id: Uuid,
    /// The operation's result.
    pub value: T,
}

/// The framework's inbound API. One method per exit-game operation,
/// plus batch finalization.
#[async_trait]
pub trait PlasmaFrameworkApi: Send + Sync {
    /// Opens a standard exit; the exit is enqueued immediately.
    async fn start_standard_exit(
        &self,
        req: StartStandardExitRequest,
    ) -> Result<Tracked<ExitId>, ProcessorError>;

    /// Proves a standard exit's output spent, voiding it.
    async fn challenge_standard_exit(
        &self,
        req: ChallengeStandardExitRequest,
    ) -> Result<Tracked<()>, ProcessorError>;

    /// Opens an in-flight exit on an unconfirmed transaction.
    async fn start_in_flight_exit(
        &self,
        req: StartInFlightExitRequest,
    ) -> Result<Tracked<ExitId>, ProcessorError>;

    /// Piggybacks an input of an in-flight exit.
    async fn piggyback_in_flight_input(
        &self,
        req: PiggybackInputRequest,
    ) -> Result<Tracked<()>, ProcessorError>;

    /// Piggybacks an output of an in-flight exit.
    async fn piggyback_in_flight_output(
        &self,
        req: PiggybackOutputRequest,
    ) -> Result<Tracked<()>, ProcessorError>;

    /// Disputes canonicity with a competing transaction.
    async fn challenge_in_flight_exit_not_canonical(
        &self,
        req: ChallengeCanonicityRequest,
    ) -> Result<Tracked<()>, ProcessorError>;

    /// Answers a canonicity challenge with an older inclusion.
    async fn respond_to_non_canonical_challenge(
        &self,
        req: RespondCanonicityRequest,
    ) -> Result<Tracked<()>, ProcessorError>;

    /// Knocks out a piggybacked input proven spent elsewhere.
    async fn challenge_in_flight_input_spent(
        &self,
        req: ChallengeInputSpentRequest,
    ) -> Result<Tracked<()>, ProcessorError>;

    /// Knocks out a piggybacked output proven spent elsewhere.
    async fn challenge_in_flight_output_spent(
        &self,
        req: ChallengeOutputSpentRequest,
    ) -> Result<Tracked<()>, ProcessorError>;

    /// Finalizes up to `max_count` mature exits for one vault/token
    /// pair; returns the number of exits popped off the queue.
    async fn process_exits(
        &self,
        vault_id: u32,
        token: TokenId,
        max_count: usize,
        caller: Address,
    ) -> Result<Tracked<usize>, ProcessorError>;
}
