//! Common helpers for testing the relay against mocked collaborators.

mod distributor;
mod registry;

pub use distributor::MockDistributor;
pub use registry::MockRegistry;

use crate::peers::{FlowParams, RelayPeer, SessionMessage};
use leth_primitives::{Address, Bytes, PeerId, TransactionSigned, H256};
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// Flow control parameters used by all test peers.
pub const TEST_FLOW_PARAMS: FlowParams =
    FlowParams { buffer_limit: 1_000_000, base_cost: 1_000, cost_per_tx: 100 };

/// Creates a peer handle with a random id announcing the given fee recipient,
/// together with the receiving end of its session channel.
pub fn relay_peer(fee_recipient: Address) -> (RelayPeer, UnboundedReceiver<SessionMessage>) {
    let (to_session, session) = mpsc::unbounded_channel();
    let peer = RelayPeer::new(PeerId::random(), fee_recipient, TEST_FLOW_PARAMS, to_session);
    (peer, session)
}

/// Generates a random transaction addressed to the given fee recipient.
pub fn random_tx(fee_recipient: Address) -> TransactionSigned {
    let hash = H256::random();
    TransactionSigned {
        hash,
        nonce: hash.to_low_u64_be(),
        fee_recipient,
        payload: Bytes::copy_from_slice(hash.as_bytes()),
    }
}
