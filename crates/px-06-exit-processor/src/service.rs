//! # Plasma Framework Service
//!
//! The async facade over the processor. Each call takes the write lock,
//! runs one serialized transition, broadcasts the resulting events under
//! a fresh correlation id, and returns that id with the result. Event
//! consumers subscribe once and match responses to event bursts by id.

use crate::error::ProcessorError;
use crate::ports::{PlasmaFrameworkApi, Tracked};
use crate::processor::ExitProcessor;
use async_trait::async_trait;
use parking_lot::RwLock;
use px_04_standard_exit::{ChallengeStandardExitRequest, StartStandardExitRequest};
use px_05_in_flight_exit::{
    ChallengeCanonicityRequest, ChallengeInputSpentRequest, ChallengeOutputSpentRequest,
    PiggybackInputRequest, PiggybackOutputRequest, RespondCanonicityRequest,
    StartInFlightExitRequest,
};
use serde::{Deserialize, Serialize};
use shared_types::{Address, ExitEvent, ExitId, TokenId, U256};
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

/// Default broadcast channel depth before slow subscribers start
/// lagging.
const DEFAULT_EVENT_CAPACITY: usize = 256;

/// An exit event tagged with the correlation id of the call that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkEvent {
    /// Correlation id of the originating call.
    pub correlation_id: Uuid,
    /// The event.
    pub event: ExitEvent,
}

/// The framework facade. See the module docs.
pub struct PlasmaFramework {
    processor: RwLock<ExitProcessor>,
    events: broadcast::Sender<FrameworkEvent>,
}

impl PlasmaFramework {
    /// Wraps a fully configured processor.
    pub fn new(processor: ExitProcessor) -> Self {
        Self::with_event_capacity(processor, DEFAULT_EVENT_CAPACITY)
    }

    /// Wraps a processor with an explicit event channel depth.
    pub fn with_event_capacity(processor: ExitProcessor, capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        Self {
            processor: RwLock::new(processor),
            events,
        }
    }

    /// Subscribes to the framework's event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<FrameworkEvent> {
        self.events.subscribe()
    }

    /// Read access to the processor for inspection and assertions.
    pub fn with_processor<R>(&self, f: impl FnOnce(&ExitProcessor) -> R) -> R {
        f(&self.processor.read())
    }

    /// Proposes a new standard-exit bond (operator path).
    pub fn propose_standard_exit_bond(&self, new_value: U256) -> Result<(), ProcessorError> {
        self.processor.write().propose_standard_exit_bond(new_value)
    }

    /// Proposes a new in-flight-exit start bond (operator path).
    pub fn propose_in_flight_exit_bond(&self, new_value: U256) -> Result<(), ProcessorError> {
        self.processor.write().propose_in_flight_exit_bond(new_value)
    }

    /// Proposes a new piggyback bond (operator path).
    pub fn propose_piggyback_bond(&self, new_value: U256) -> Result<(), ProcessorError> {
        self.processor.write().propose_piggyback_bond(new_value)
    }

    fn publish(&self, correlation_id: Uuid, events: Vec<ExitEvent>) {
        for event in events {
            // send only fails with no live subscribers, which is fine
            let _ = self.events.send(FrameworkEvent {
                correlation_id,
                event,
            });
        }
    }
}

#[async_trait]
impl PlasmaFrameworkApi for PlasmaFramework {
    async fn start_standard_exit(
        &self,
        req: StartStandardExitRequest,
    ) -> Result<Tracked<ExitId>, ProcessorError> {
        let correlation_id = Uuid::new_v4();
        let (exit_id, events) = self.processor.write().start_standard_exit(req)?;
        info!(%correlation_id, "standard exit started");
        self.publish(correlation_id, events);
        Ok(Tracked {
            correlation_id,
            value: exit_id,
        })
    }

    async fn challenge_standard_exit(
        &self,
        req: ChallengeStandardExitRequest,
    ) -> Result<Tracked<()>, ProcessorError> {
        let correlation_id = Uuid::new_v4();
        let events = self.processor.write().challenge_standard_exit(req)?;
        info!(%correlation_id, "standard exit challenged");
        self.publish(correlation_id, events);
        Ok(Tracked {
            correlation_id,
            value: (),
        })
    }

    async fn start_in_flight_exit(
        &self,
        req: StartInFlightExitRequest,
    ) -> Result<Tracked<ExitId>, ProcessorError> {
        let correlation_id = Uuid::new_v4();
        let (exit_id, events) = self.processor.write().start_in_flight_exit(req)?;
        info!(%correlation_id, "in-flight exit started");
        self.publish(correlation_id, events);
        Ok(Tracked {
            correlation_id,
            value: exit_id,
        })
    }

    async fn piggyback_in_flight_input(
        &self,
        req: PiggybackInputRequest,
    ) -> Result<Tracked<()>, ProcessorError> {
        let correlation_id = Uuid::new_v4();
        let events = self.processor.write().piggyback_in_flight_input(req)?;
        debug!(%correlation_id, "in-flight input piggybacked");
        self.publish(correlation_id, events);
        Ok(Tracked {
            correlation_id,
            value: (),
        })
    }

    async fn piggyback_in_flight_output(
        &self,
        req: PiggybackOutputRequest,
    ) -> Result<Tracked<()>, ProcessorError> {
        let correlation_id = Uuid::new_v4();
        let events = self.processor.write().piggyback_in_flight_output(req)?;
        debug!(%correlation_id, "in-flight output piggybacked");
        self.publish(correlation_id, events);
        Ok(Tracked {
            correlation_id,
            value: (),
        })
    }

    async fn challenge_in_flight_exit_not_canonical(
        &self,
        req: ChallengeCanonicityRequest,
    ) -> Result<Tracked<()>, ProcessorError> {
        let correlation_id = Uuid::new_v4();
        let events = self
            .processor
            .write()
            .challenge_in_flight_exit_not_canonical(req)?;
        info!(%correlation_id, "in-flight exit challenged non-canonical");
        self.publish(correlation_id, events);
        Ok(Tracked {
            correlation_id,
            value: (),
        })
    }

    async fn respond_to_non_canonical_challenge(
        &self,
        req: RespondCanonicityRequest,
    ) -> Result<Tracked<()>, ProcessorError> {
        let correlation_id = Uuid::new_v4();
        let events = self
            .processor
            .write()
            .respond_to_non_canonical_challenge(req)?;
        info!(%correlation_id, "canonicity challenge answered");
        self.publish(correlation_id, events);
        Ok(Tracked {
            correlation_id,
            value: (),
        })
    }

    async fn challenge_in_flight_input_spent(
        &self,
        req: ChallengeInputSpentRequest,
    ) -> Result<Tracked<()>, ProcessorError> {
        let correlation_id = Uuid::new_v4();
        let events = self.processor.write().challenge_in_flight_input_spent(req)?;
        info!(%correlation_id, "in-flight input knocked out");
        self.publish(correlation_id, events);
        Ok(Tracked {
            correlation_id,
            value: (),
        })
    }

    async fn challenge_in_flight_output_spent(
        &self,
        req: ChallengeOutputSpentRequest,
    ) -> Result<Tracked<()>, ProcessorError> {
        let correlation_id = Uuid::new_v4();
        let events = self
            .processor
            .write()
            .challenge_in_flight_output_spent(req)?;
        info!(%correlation_id, "in-flight output knocked out");
        self.publish(correlation_id, events);
        Ok(Tracked {
            correlation_id,
            value: (),
        })
    }

    async fn process_exits(
        &self,
        vault_id: u32,
        token: TokenId,
        max_count: usize,
        caller: Address,
    ) -> Result<Tracked<usize>, ProcessorError> {
        let correlation_id = Uuid::new_v4();
        let (popped, events) = self
            .processor
            .write()
            .process_exits(vault_id, token, max_count, caller)?;
        info!(%correlation_id, popped, "exit batch processed");
        self.publish(correlation_id, events);
        Ok(Tracked {
            correlation_id,
            value: popped,
        })
    }
}
