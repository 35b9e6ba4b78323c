//! Default adapters for the outbound ports and payment-type plugins.
//!
//! These are the stand-ins that let the framework run end-to-end without
//! an external prover or signature scheme: a SHA-256 binary Merkle tree
//! for inclusion proofs, and owner-bytes matching for spending
//! conditions and output guards.

use px_02_registries::{OutputGuardHandler, SpendingCondition};
use sha2::{Digest, Sha256};
use shared_types::{Address, Hash, InclusionVerifier, UtxoPos};

fn hash_leaf(bytes: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([0u8]);
    hasher.update(bytes);
    hasher.finalize().into()
}

fn hash_node(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([1u8]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Binary SHA-256 Merkle tree over transaction bytes, leaf position =
/// transaction index within the block. Leaves and interior nodes are
/// domain-separated so a leaf can never be replayed as a node.
pub struct MerkleTree {
    levels: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Builds the tree over `leaves`, padding to a power of two with
    /// zero hashes.
    pub fn build(leaves: &[Vec<u8>]) -> Self {
        let mut level: Vec<Hash> = leaves.iter().map(|l| hash_leaf(l)).collect();
        if level.is_empty() {
            level.push([0u8; 32]);
        }
        let width = level.len().next_power_of_two();
        level.resize(width, [0u8; 32]);

        let mut levels = vec![level];
        while levels
            .last()
            .map_or(false, |l| l.len() > 1)
        {
            let below = &levels[levels.len() - 1];
            let above: Vec<Hash> = below
                .chunks(2)
                .map(|pair| hash_node(&pair[0], &pair[1]))
                .collect();
            levels.push(above);
        }
        Self { levels }
    }

    /// The tree root.
    pub fn root(&self) -> Hash {
        self.levels
            .last()
            .and_then(|l| l.first())
            .copied()
            .unwrap_or([0u8; 32])
    }

    /// Sibling path for the leaf at `index`, bottom up.
    pub fn proof(&self, index: usize) -> Vec<Hash> {
        let mut proof = Vec::new();
        let mut i = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = i ^ 1;
            proof.push(level.get(sibling).copied().unwrap_or([0u8; 32]));
            i /= 2;
        }
        proof
    }
}

/// Inclusion verification against SHA-256 Merkle roots; the leaf index
/// is the transaction index of the claimed position.
#[derive(Default)]
pub struct MerkleInclusionVerifier;

impl InclusionVerifier for MerkleInclusionVerifier {
    fn verify(&self, leaf: &[u8], pos: UtxoPos, root: &Hash, proof: &[Hash]) -> bool {
        let mut acc = hash_leaf(leaf);
        let mut index = pos.tx_index as usize;
        for sibling in proof {
            acc = if index % 2 == 0 {
                hash_node(&acc, sibling)
            } else {
                hash_node(sibling, &acc)
            };
            index /= 2;
        }
        index == 0 && acc == *root
    }
}

/// Payment spending condition: the witness must be the output guard's
/// exact bytes. A stand-in for signature recovery, which lives outside
/// this system.
#[derive(Default)]
pub struct PaymentSpendingCondition;

impl SpendingCondition for PaymentSpendingCondition {
    fn verify(
        &self,
        output_guard: &Address,
        _utxo_pos: UtxoPos,
        _spending_tx: &[u8],
        _input_index: u16,
        witness: &[u8],
    ) -> bool {
        witness == output_guard
    }
}

/// Payment output guard handler: the guard is the owner address and the
/// exit target is the guard itself; no preimage needed.
#[derive(Default)]
pub struct PaymentOutputGuardHandler;

impl OutputGuardHandler for PaymentOutputGuardHandler {
    fn is_valid(&self, guard: &Address, _preimage: &[u8]) -> bool {
        *guard != [0u8; 20]
    }
    fn exit_target(&self, guard: &Address, _preimage: &[u8]) -> Address {
        *guard
    }
}
