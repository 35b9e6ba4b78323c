//! # Exit Processor
//!
//! The one component allowed to touch the priority queues. It owns a
//! queue per (vault, token) pair, the spent-output ledger both engines
//! consult, and the engines themselves; every exit enters a queue here
//! and leaves it here, oldest first once mature.

use crate::error::ProcessorError;
use px_01_priority_queue::ExitQueue;
use px_02_registries::{
    ExitGameEntry, ExitGameRegistry, OperatorToken, OutputGuardHandler,
    OutputGuardHandlerRegistry, RegistryError, SpendingCondition, SpendingConditionRegistry, Vault,
    VaultRegistry,
};
use px_04_standard_exit::{
    ChallengeStandardExitRequest, StandardExitContext, StandardExitEngine, StandardExitError,
    StartStandardExitRequest,
};
use px_05_in_flight_exit::{
    ChallengeCanonicityRequest, ChallengeInputSpentRequest, ChallengeOutputSpentRequest,
    EnqueueSignal, InFlightExitContext, InFlightExitEngine, InFlightExitError,
    PiggybackInputRequest, PiggybackOutputRequest, RespondCanonicityRequest,
    StartInFlightExitRequest,
};
use shared_types::{
    Address, BlockSource, ExitEvent, ExitId, ExitPriority, FundsTransfer, InclusionVerifier,
    OutputId, PaymentTransaction, PlasmaConfig, SpentOutputBook, TimeSource, TokenId, U256,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// External collaborators shared by both engines.
pub struct FrameworkServices {
    /// Clock.
    pub clock: Arc<dyn TimeSource>,
    /// Submitted child-chain blocks.
    pub blocks: Arc<dyn BlockSource>,
    /// Merkle inclusion verification.
    pub inclusion: Arc<dyn InclusionVerifier>,
    /// Bond and bounty payout channel.
    pub funds: Arc<dyn FundsTransfer>,
}

/// The four plugin registries, built by the operator at deployment.
pub struct FrameworkRegistries {
    /// Exit games by transaction type.
    pub exit_games: ExitGameRegistry,
    /// Vaults by vault id.
    pub vaults: VaultRegistry,
    /// Spending conditions by (output type, spending tx type).
    pub conditions: SpendingConditionRegistry,
    /// Output-guard handlers by output type.
    pub guards: OutputGuardHandlerRegistry,
}

/// Which engine a queued priority belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    /// Standard exit; processed once, whole.
    Standard,
    /// In-flight exit; processed once per enqueued token.
    InFlight,
}

/// One enqueued exit, recoverable from its unique priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueuedExit {
    kind: ExitKind,
    exit_id: ExitId,
}

/// A single (vault, token) queue plus the priority -> exit mapping.
#[derive(Default)]
struct TokenQueue {
    heap: ExitQueue,
    queued: HashMap<U256, QueuedExit>,
}

/// Ledger of finalized output ids. Both engines flag outputs here when
/// they pay out and consult it before paying, so the same output can
/// never leave the system twice.
#[derive(Default)]
pub struct SpentOutputLedger {
    spent: HashSet<OutputId>,
}

impl SpentOutputBook for SpentOutputLedger {
    fn is_spent(&self, id: &OutputId) -> bool {
        self.spent.contains(id)
    }
    fn flag_spent(&mut self, id: OutputId) {
        self.spent.insert(id);
    }
}

/// The exit processor. See the module docs.
pub struct ExitProcessor {
    config: PlasmaConfig,
    services: FrameworkServices,
    registries: FrameworkRegistries,
    standard: StandardExitEngine,
    in_flight: InFlightExitEngine,
    queues: HashMap<(u32, TokenId), TokenQueue>,
    ledger: SpentOutputLedger,
}

fn standard_ctx<'a>(
    services: &'a FrameworkServices,
    registries: &'a FrameworkRegistries,
) -> StandardExitContext<'a> {
    StandardExitContext {
        clock: services.clock.as_ref(),
        blocks: services.blocks.as_ref(),
        inclusion: services.inclusion.as_ref(),
        funds: services.funds.as_ref(),
        conditions: &registries.conditions,
        guards: &registries.guards,
    }
}

fn in_flight_ctx<'a>(
    services: &'a FrameworkServices,
    registries: &'a FrameworkRegistries,
) -> InFlightExitContext<'a> {
    InFlightExitContext {
        clock: services.clock.as_ref(),
        blocks: services.blocks.as_ref(),
        inclusion: services.inclusion.as_ref(),
        funds: services.funds.as_ref(),
        conditions: &registries.conditions,
        guards: &registries.guards,
    }
}

impl ExitProcessor {
    /// Creates the processor with both engines seeded from `config`.
    pub fn new(
        config: PlasmaConfig,
        services: FrameworkServices,
        registries: FrameworkRegistries,
    ) -> Self {
        let standard = StandardExitEngine::new(config.clone());
        let in_flight = InFlightExitEngine::new(config.clone());
        Self {
            config,
            services,
            registries,
            standard,
            in_flight,
            queues: HashMap::new(),
            ledger: SpentOutputLedger::default(),
        }
    }

    /// The framework configuration.
    pub fn config(&self) -> &PlasmaConfig {
        &self.config
    }

    /// The standard-exit engine (read access for inspection).
    pub fn standard_exits(&self) -> &StandardExitEngine {
        &self.standard
    }

    /// The in-flight-exit engine (read access for inspection).
    pub fn in_flight_exits(&self) -> &InFlightExitEngine {
        &self.in_flight
    }

    /// Number of exits waiting in the queue for `(vault_id, token)`.
    pub fn queued_count(&self, vault_id: u32, token: &TokenId) -> usize {
        self.queues
            .get(&(vault_id, *token))
            .map_or(0, |q| q.heap.len())
    }

    fn enqueue(&mut self, token: TokenId, priority: ExitPriority, kind: ExitKind, exit_id: ExitId) {
        let vault_id = self.config.vault_id_for(&token);
        let queue = self.queues.entry((vault_id, token)).or_default();
        queue.heap.insert(priority);
        queue.queued.insert(priority.0, QueuedExit { kind, exit_id });
        debug!(vault_id, depth = queue.heap.len(), "exit enqueued");
    }

    /// Resolves the trusted exit game for `tx_type`; unregistered or
    /// quarantined games block the exit from opening.
    fn require_exit_game(&self, tx_type: u32) -> Result<(), RegistryError> {
        let now = self.services.clock.now();
        self.registries.exit_games.game(tx_type, now).map(|_| ())
    }

    // --- standard exits ---

    /// Opens a standard exit and enqueues it under its token. The
    /// transaction type must have a trusted exit game.
    pub fn start_standard_exit(
        &mut self,
        req: StartStandardExitRequest,
    ) -> Result<(ExitId, Vec<ExitEvent>), ProcessorError> {
        let tx_type = PaymentTransaction::decode(&req.tx_bytes)
            .map_err(StandardExitError::from)?
            .tx_type;
        self.require_exit_game(tx_type)?;
        let ctx = standard_ctx(&self.services, &self.registries);
        let (started, mut events) = self.standard.start(req, &ctx)?;
        self.enqueue(
            started.token,
            started.priority,
            ExitKind::Standard,
            started.exit_id,
        );
        events.push(ExitEvent::ExitQueued {
            exit_id: started.exit_id,
            token: started.token,
            priority: started.priority.0,
        });
        Ok((started.exit_id, events))
    }

    /// Challenges a standard exit. The record stays queued; processing
    /// it later is an omitted no-op.
    pub fn challenge_standard_exit(
        &mut self,
        req: ChallengeStandardExitRequest,
    ) -> Result<Vec<ExitEvent>, ProcessorError> {
        let ctx = standard_ctx(&self.services, &self.registries);
        Ok(self.standard.challenge(req, &ctx)?)
    }

    // --- in-flight exits ---

    /// Opens an in-flight exit for a transaction type with a trusted
    /// exit game. Nothing is enqueued until the first piggyback.
    pub fn start_in_flight_exit(
        &mut self,
        req: StartInFlightExitRequest,
    ) -> Result<(ExitId, Vec<ExitEvent>), ProcessorError> {
        let tx_type = PaymentTransaction::decode(&req.in_flight_tx_bytes)
            .map_err(InFlightExitError::from)?
            .tx_type;
        self.require_exit_game(tx_type)?;
        let ctx = in_flight_ctx(&self.services, &self.registries);
        let (started, events) = self.in_flight.start(req, &ctx)?;
        Ok((started.exit_id, events))
    }

    /// Piggybacks one input of an in-flight exit.
    pub fn piggyback_in_flight_input(
        &mut self,
        req: PiggybackInputRequest,
    ) -> Result<Vec<ExitEvent>, ProcessorError> {
        let ctx = in_flight_ctx(&self.services, &self.registries);
        let (outcome, events) = self.in_flight.piggyback_input(req, &ctx)?;
        self.apply_enqueue_signal(outcome.exit_id, outcome.enqueue);
        Ok(events)
    }

    /// Piggybacks one output of an in-flight exit.
    pub fn piggyback_in_flight_output(
        &mut self,
        req: PiggybackOutputRequest,
    ) -> Result<Vec<ExitEvent>, ProcessorError> {
        let ctx = in_flight_ctx(&self.services, &self.registries);
        let (outcome, events) = self.in_flight.piggyback_output(req, &ctx)?;
        self.apply_enqueue_signal(outcome.exit_id, outcome.enqueue);
        Ok(events)
    }

    fn apply_enqueue_signal(&mut self, exit_id: ExitId, signal: Option<EnqueueSignal>) {
        if let Some(signal) = signal {
            self.enqueue(signal.token, signal.priority, ExitKind::InFlight, exit_id);
        }
    }

    /// Disputes the canonicity of an in-flight transaction.
    pub fn challenge_in_flight_exit_not_canonical(
        &mut self,
        req: ChallengeCanonicityRequest,
    ) -> Result<Vec<ExitEvent>, ProcessorError> {
        let ctx = in_flight_ctx(&self.services, &self.registries);
        Ok(self.in_flight.challenge_canonicity(req, &ctx)?)
    }

    /// Answers a canonicity challenge with an older inclusion proof.
    pub fn respond_to_non_canonical_challenge(
        &mut self,
        req: RespondCanonicityRequest,
    ) -> Result<Vec<ExitEvent>, ProcessorError> {
        let ctx = in_flight_ctx(&self.services, &self.registries);
        Ok(self.in_flight.respond_to_canonicity_challenge(req, &ctx)?)
    }

    /// Knocks out a piggybacked in-flight input.
    pub fn challenge_in_flight_input_spent(
        &mut self,
        req: ChallengeInputSpentRequest,
    ) -> Result<Vec<ExitEvent>, ProcessorError> {
        let ctx = in_flight_ctx(&self.services, &self.registries);
        Ok(self.in_flight.challenge_input_spent(req, &ctx)?)
    }

    /// Knocks out a piggybacked in-flight output.
    pub fn challenge_in_flight_output_spent(
        &mut self,
        req: ChallengeOutputSpentRequest,
    ) -> Result<Vec<ExitEvent>, ProcessorError> {
        let ctx = in_flight_ctx(&self.services, &self.registries);
        Ok(self.in_flight.challenge_output_spent(req, &ctx)?)
    }

    // --- finalization ---

    /// Pops and finalizes up to `max_count` mature exits for one vault
    /// and token, oldest priority first. `caller` collects the process
    /// bounty of every exit it pops. An exit that turns out challenged,
    /// already-finalized or unknown is omitted, not an error; the batch
    /// keeps going.
    pub fn process_exits(
        &mut self,
        vault_id: u32,
        token: TokenId,
        max_count: usize,
        caller: Address,
    ) -> Result<(usize, Vec<ExitEvent>), ProcessorError> {
        let expected_vault = self.config.vault_id_for(&token);
        if vault_id != expected_vault {
            return Err(ProcessorError::WrongVault {
                token,
                expected: expected_vault,
                got: vault_id,
            });
        }
        let now = self.services.clock.now();
        let vault = self.registries.vaults.vault(vault_id, now)?.clone();
        let queue = self
            .queues
            .get_mut(&(vault_id, token))
            .filter(|q| !q.heap.is_empty())
            .ok_or(ProcessorError::NothingToProcess { vault_id, token })?;

        let mut events = Vec::new();
        let mut popped = 0;
        while popped < max_count {
            let Ok(top) = queue.heap.peek_min() else {
                break;
            };
            if top.exitable_at() > now {
                break;
            }
            let Ok(priority) = queue.heap.delete_min() else {
                break;
            };
            popped += 1;
            let Some(entry) = queue.queued.remove(&priority.0) else {
                continue;
            };
            let exit_events = match entry.kind {
                ExitKind::Standard => self.standard.process(
                    entry.exit_id,
                    caller,
                    vault.as_ref(),
                    self.services.funds.as_ref(),
                    &mut self.ledger,
                ),
                ExitKind::InFlight => self.in_flight.process(
                    entry.exit_id,
                    token,
                    caller,
                    vault.as_ref(),
                    self.services.funds.as_ref(),
                    &mut self.ledger,
                ),
            };
            events.extend(exit_events);
        }
        info!(vault_id, popped, "exit batch processed");
        Ok((popped, events))
    }

    // --- operator surface ---

    /// Registers an exit game for a transaction type.
    pub fn register_exit_game(
        &mut self,
        token: &OperatorToken,
        tx_type: u32,
        entry: ExitGameEntry,
    ) -> Result<(), ProcessorError> {
        let now = self.services.clock.now();
        Ok(self.registries.exit_games.register(token, tx_type, entry, now)?)
    }

    /// Registers a vault.
    pub fn register_vault(
        &mut self,
        token: &OperatorToken,
        vault_id: u32,
        vault: Arc<dyn Vault>,
    ) -> Result<(), ProcessorError> {
        let now = self.services.clock.now();
        Ok(self.registries.vaults.register(token, vault_id, vault, now)?)
    }

    /// Registers a spending condition.
    pub fn register_spending_condition(
        &mut self,
        token: &OperatorToken,
        output_type: u32,
        spending_tx_type: u32,
        condition: Arc<dyn SpendingCondition>,
    ) -> Result<(), ProcessorError> {
        let now = self.services.clock.now();
        Ok(self.registries.conditions.register(
            token,
            output_type,
            spending_tx_type,
            condition,
            now,
        )?)
    }

    /// Registers an output-guard handler.
    pub fn register_output_guard_handler(
        &mut self,
        token: &OperatorToken,
        output_type: u32,
        handler: Arc<dyn OutputGuardHandler>,
    ) -> Result<(), ProcessorError> {
        let now = self.services.clock.now();
        Ok(self
            .registries
            .guards
            .register(token, output_type, handler, now)?)
    }

    /// Permanently freezes the spending-condition registry.
    pub fn freeze_spending_conditions(
        &mut self,
        token: &OperatorToken,
    ) -> Result<(), ProcessorError> {
        Ok(self.registries.conditions.freeze(token)?)
    }

    /// Permanently freezes the output-guard-handler registry.
    pub fn freeze_output_guard_handlers(
        &mut self,
        token: &OperatorToken,
    ) -> Result<(), ProcessorError> {
        Ok(self.registries.guards.freeze(token)?)
    }

    /// Proposes a new standard-exit bond.
    pub fn propose_standard_exit_bond(&mut self, new_value: U256) -> Result<(), ProcessorError> {
        let now = self.services.clock.now();
        Ok(self.standard.propose_bond(new_value, now)?)
    }

    /// Proposes a new in-flight-exit start bond.
    pub fn propose_in_flight_exit_bond(&mut self, new_value: U256) -> Result<(), ProcessorError> {
        let now = self.services.clock.now();
        Ok(self.in_flight.propose_bond(new_value, now)?)
    }

    /// Proposes a new piggyback bond.
    pub fn propose_piggyback_bond(&mut self, new_value: U256) -> Result<(), ProcessorError> {
        let now = self.services.clock.now();
        Ok(self.in_flight.propose_piggyback_bond(new_value, now)?)
    }
}
