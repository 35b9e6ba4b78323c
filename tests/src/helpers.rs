//! Shared harness for the integration flows.
//!
//! One [`Harness`] per test: a settable clock, a mutable block store
//! shared with the processor, a funds recorder, and a processor wired
//! with the production Merkle verifier and the payment-type plugins.

use parking_lot::{Mutex, RwLock};
use px_02_registries::{
    ExitGameEntry, ExitGameRegistry, OperatorToken, OutputGuardHandlerRegistry, Protocol,
    SpendingConditionRegistry, Vault, VaultRegistry,
};
use px_06_exit_processor::{
    ExitProcessor, FrameworkRegistries, FrameworkServices, MerkleInclusionVerifier, MerkleTree,
    PaymentOutputGuardHandler, PaymentSpendingCondition,
};
use shared_types::config::{NATIVE_VAULT_ID, TOKEN_VAULT_ID};
use shared_types::ports::{ChildBlock, TransferError};
use shared_types::transaction::{TxOutput, PAYMENT_OUTPUT_TYPE, PAYMENT_TX_TYPE};
use shared_types::{
    Address, BlockSource, FundsTransfer, PaymentTransaction, PlasmaConfig, TimeSource, TokenId,
    UtxoPos, NATIVE_TOKEN, U256,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub const ALICE: Address = [0xA1; 20];
pub const BOB: Address = [0xB2; 20];
pub const CAROL: Address = [0xC3; 20];
pub const OPERATOR: Address = [0x0E; 20];

/// A fungible token exiting through the token vault.
pub const TOKEN: TokenId = [0x77; 20];

/// One week, the default `min_exit_period`.
pub const EXIT_PERIOD: u64 = 7 * 24 * 3600;

/// Test clock; tests advance it explicitly.
pub struct FixedClock(AtomicU64);

impl FixedClock {
    pub fn new(now: u64) -> Self {
        Self(AtomicU64::new(now))
    }

    pub fn set(&self, now: u64) {
        self.0.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, by: u64) {
        self.0.fetch_add(by, Ordering::SeqCst);
    }
}

impl TimeSource for FixedClock {
    fn now(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Block store shared between the test and the processor, so blocks can
/// be sealed after the processor is built.
#[derive(Default)]
pub struct SharedBlocks(RwLock<HashMap<u64, ChildBlock>>);

impl SharedBlocks {
    pub fn insert(&self, block_num: u64, block: ChildBlock) {
        self.0.write().insert(block_num, block);
    }
}

impl BlockSource for SharedBlocks {
    fn child_block(&self, block_num: u64) -> Option<ChildBlock> {
        self.0.read().get(&block_num).copied()
    }
}

/// Records every bond / bounty transfer; can be told to refuse one
/// recipient to exercise the payout-failure paths.
#[derive(Default)]
pub struct RecordingFunds {
    transfers: Mutex<Vec<(Address, U256)>>,
    reject: Mutex<Option<Address>>,
}

impl RecordingFunds {
    pub fn reject_payments_to(&self, who: Address) {
        *self.reject.lock() = Some(who);
    }

    pub fn total_paid(&self, who: Address) -> U256 {
        self.transfers
            .lock()
            .iter()
            .filter(|(to, _)| *to == who)
            .fold(U256::zero(), |acc, (_, amount)| acc + *amount)
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers.lock().len()
    }
}

impl FundsTransfer for RecordingFunds {
    fn transfer(&self, to: Address, amount: U256) -> Result<(), TransferError> {
        if *self.reject.lock() == Some(to) {
            return Err(TransferError { to, amount });
        }
        self.transfers.lock().push((to, amount));
        Ok(())
    }
}

/// Vault that honors every withdrawal.
pub struct OkVault;

impl Vault for OkVault {
    fn withdraw(&self, _token: TokenId, _to: Address, _amount: U256) -> Result<(), TransferError> {
        Ok(())
    }
}

/// Encodes a payment transaction paying `outputs` in the native token.
pub fn payment_tx(inputs: Vec<UtxoPos>, outputs: &[(Address, u64)]) -> Vec<u8> {
    let outputs: Vec<_> = outputs
        .iter()
        .map(|(owner, amount)| (*owner, NATIVE_TOKEN, *amount))
        .collect();
    payment_tx_in(inputs, &outputs)
}

/// Encodes a payment transaction with per-output tokens.
pub fn payment_tx_in(inputs: Vec<UtxoPos>, outputs: &[(Address, TokenId, u64)]) -> Vec<u8> {
    let outputs = outputs
        .iter()
        .map(|(owner, token, amount)| TxOutput {
            output_type: PAYMENT_OUTPUT_TYPE,
            output_guard: *owner,
            token: *token,
            amount: U256::from(*amount),
        })
        .collect();
    PaymentTransaction::new(PAYMENT_TX_TYPE, inputs, outputs)
        .expect("well-formed test transaction")
        .encode()
}

pub fn pos(block_num: u64, tx_index: u32, output_index: u16) -> UtxoPos {
    UtxoPos::new(block_num, tx_index, output_index).expect("in-range test position")
}

/// The full stack under test.
pub struct Harness {
    pub clock: Arc<FixedClock>,
    pub blocks: Arc<SharedBlocks>,
    pub funds: Arc<RecordingFunds>,
    pub operator: OperatorToken,
    pub processor: ExitProcessor,
}

impl Harness {
    /// Builds the processor at `now` with both vaults, the payment exit
    /// game, the payment spending condition, and the payment
    /// output-guard handler already trusted.
    pub fn new(now: u64) -> Self {
        let clock = Arc::new(FixedClock::new(now));
        let blocks = Arc::new(SharedBlocks::default());
        let funds = Arc::new(RecordingFunds::default());
        let operator = OperatorToken::new();
        let config = PlasmaConfig::default();

        let mut vaults =
            VaultRegistry::new(&operator, config.quarantine_period, config.initial_immune_vaults);
        vaults
            .register(&operator, NATIVE_VAULT_ID, Arc::new(OkVault), now)
            .expect("native vault registration");
        vaults
            .register(&operator, TOKEN_VAULT_ID, Arc::new(OkVault), now)
            .expect("token vault registration");
        let mut conditions = SpendingConditionRegistry::new(&operator, 0);
        conditions
            .register(
                &operator,
                PAYMENT_OUTPUT_TYPE,
                PAYMENT_TX_TYPE,
                Arc::new(PaymentSpendingCondition),
                now,
            )
            .expect("payment condition registration");
        let mut guards = OutputGuardHandlerRegistry::new(&operator, 0);
        guards
            .register(&operator, PAYMENT_OUTPUT_TYPE, Arc::new(PaymentOutputGuardHandler), now)
            .expect("payment guard registration");
        let mut exit_games = ExitGameRegistry::new(
            &operator,
            config.quarantine_period,
            config.initial_immune_exit_games,
        );
        exit_games
            .register(
                &operator,
                PAYMENT_TX_TYPE,
                ExitGameEntry {
                    game: [0xE6; 20],
                    protocol: Protocol::MoreVp,
                },
                now,
            )
            .expect("payment exit game registration");

        let processor = ExitProcessor::new(
            config,
            FrameworkServices {
                clock: clock.clone(),
                blocks: blocks.clone(),
                inclusion: Arc::new(MerkleInclusionVerifier),
                funds: funds.clone(),
            },
            FrameworkRegistries {
                exit_games,
                vaults,
                conditions,
                guards,
            },
        );

        Self {
            clock,
            blocks,
            funds,
            operator,
            processor,
        }
    }

    /// Seals `txs` into a child block: builds the Merkle tree, stores
    /// the root, and returns the tree for proof extraction.
    pub fn seal_block(&self, block_num: u64, timestamp: u64, txs: &[Vec<u8>]) -> MerkleTree {
        let tree = MerkleTree::build(txs);
        self.blocks.insert(
            block_num,
            ChildBlock {
                root: tree.root(),
                timestamp,
            },
        );
        tree
    }

    /// Records a deposit of `amount` to `owner` in its own block and
    /// returns the deposit transaction and the position of its output.
    pub fn deposit(
        &self,
        block_num: u64,
        timestamp: u64,
        owner: Address,
        amount: u64,
    ) -> (Vec<u8>, UtxoPos) {
        self.deposit_in(block_num, timestamp, owner, NATIVE_TOKEN, amount)
    }

    /// Like [`Harness::deposit`] for an arbitrary token.
    pub fn deposit_in(
        &self,
        block_num: u64,
        timestamp: u64,
        owner: Address,
        token: TokenId,
        amount: u64,
    ) -> (Vec<u8>, UtxoPos) {
        let tx = payment_tx_in(vec![pos(0, 0, 0)], &[(owner, token, amount)]);
        self.seal_block(block_num, timestamp, std::slice::from_ref(&tx));
        (tx, pos(block_num, 0, 0))
    }
}
