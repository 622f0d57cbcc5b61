use crate::{Address, Bytes, TxHash};
use serde::{Deserialize, Serialize};

/// A signed transaction as tracked by the light client.
///
/// The light client does not interpret the payload. It only needs the identity
/// of the transaction and the routing fields used to pick the full nodes that
/// propagate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSigned {
    /// Hash of the signed transaction.
    pub hash: TxHash,
    /// Nonce of the sending account.
    pub nonce: u64,
    /// Fee recipient selected for relaying the transaction.
    ///
    /// Relay copies of the same transaction differ only in this field.
    pub fee_recipient: Address,
    /// The raw encoded transaction.
    pub payload: Bytes,
}

// === impl TransactionSigned ===

impl TransactionSigned {
    /// Returns the hash that identifies the transaction.
    pub fn hash(&self) -> TxHash {
        self.hash
    }

    /// Returns a relay copy of the transaction addressed to the given fee
    /// recipient.
    ///
    /// The copy keeps the identity of the source transaction, only the routing
    /// field changes. The source is left untouched.
    pub fn with_fee_recipient(&self, fee_recipient: Address) -> Self {
        Self { fee_recipient, ..self.clone() }
    }
}
