//! # Exit and Output Identifiers
//!
//! Deterministic Keccak-256 derivations. The same output can only ever
//! map to one standard exit id and one output id, which is what makes
//! "at most one live exit per output" enforceable with a map lookup.
//!
//! In-flight exit ids are derived from the transaction bytes alone (the
//! transaction, not any single output, is the thing being exited) and
//! carry a marker bit so the two id spaces cannot collide.

use crate::position::UtxoPos;
use crate::Hash;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

/// Identifier of a standard or in-flight exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExitId(pub [u8; 32]);

/// Identifier of a single transaction output, stable across exit paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputId(pub [u8; 32]);

impl ExitId {
    /// Low 64 bits, used as the tie-break field of a packed priority.
    pub fn low64(&self) -> u64 {
        u64::from_be_bytes(
            self.0[24..32]
                .try_into()
                .unwrap_or_default(),
        )
    }

    /// Whether this id was derived for an in-flight exit.
    pub fn is_in_flight(&self) -> bool {
        self.0[0] & 0x80 != 0
    }
}

fn keccak(parts: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Derives the id of a standard exit on one output.
///
/// Deposit outputs mix in the utxo position: the same deposit bytes can
/// legitimately appear at several deposit blocks and each placement is a
/// distinct exitable output.
pub fn standard_exit_id(is_deposit: bool, tx_bytes: &[u8], utxo_pos: UtxoPos) -> ExitId {
    let mut hash = if is_deposit {
        keccak(&[tx_bytes, &utxo_pos.encode().to_be_bytes()])
    } else {
        keccak(&[tx_bytes, &utxo_pos.output_index.to_be_bytes()])
    };
    hash[0] &= 0x7f;
    ExitId(hash)
}

/// Derives the id of an in-flight exit from the transaction bytes.
pub fn in_flight_exit_id(tx_bytes: &[u8]) -> ExitId {
    let mut hash = keccak(&[tx_bytes]);
    hash[0] |= 0x80;
    ExitId(hash)
}

/// Derives the id of one transaction output.
///
/// Deposit output ids mix in the position for the same reason deposit
/// exit ids do.
pub fn output_id(is_deposit: bool, tx_bytes: &[u8], output_index: u16, utxo_pos: UtxoPos) -> OutputId {
    let hash = if is_deposit {
        keccak(&[
            tx_bytes,
            &output_index.to_be_bytes(),
            &utxo_pos.encode().to_be_bytes(),
        ])
    } else {
        keccak(&[tx_bytes, &output_index.to_be_bytes()])
    };
    OutputId(hash)
}
