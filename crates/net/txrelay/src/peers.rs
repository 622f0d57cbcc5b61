//! Peer handles and the registry surface the relay selects peers through.

use leth_primitives::{Address, PeerId, TransactionSigned};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Flow control parameters announced by a full node during the handshake.
///
/// A server charges `base_cost + cost_per_tx * n` for a relay request of `n`
/// transactions against a buffer it refills over time, and stops serving a
/// client whose buffer is exhausted. The client keeps its own estimate of the
/// remaining buffer and reserves the cost of every request before sending it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowParams {
    /// Maximum request cost the server buffers for this client.
    pub buffer_limit: u64,
    /// Fixed cost charged for every relay request.
    pub base_cost: u64,
    /// Additional cost charged per transaction in a request.
    pub cost_per_tx: u64,
}

/// Messages handed to the session task that owns the connection to a peer.
#[derive(Debug, Clone)]
pub enum SessionMessage {
    /// Relay the given transactions to the remote.
    RelayTransactions {
        /// Identifier pairing the eventual response with this request.
        request_id: u64,
        /// Flow control cost reserved for the request.
        cost: u64,
        /// The relay copies to transmit.
        txs: Vec<Arc<TransactionSigned>>,
    },
}

/// Handle to a connected full node able to receive relayed transactions.
///
/// The handle is cheap to clone and may outlive the session it points to;
/// messages sent to a terminated session are dropped.
#[derive(Debug, Clone)]
pub struct RelayPeer {
    /// Identifier of the remote peer.
    peer_id: PeerId,
    /// Fee recipient address the remote announced during the handshake.
    fee_recipient: Address,
    /// Flow control parameters announced by the remote.
    flow_params: FlowParams,
    /// Estimate of the remaining flow control buffer on the remote, shared by
    /// all clones of the handle.
    buffer: Arc<Mutex<u64>>,
    /// Sender half of the channel into the session task.
    to_session: mpsc::UnboundedSender<SessionMessage>,
}

// === impl RelayPeer ===

impl RelayPeer {
    /// Creates a new handle to a peer session.
    ///
    /// The flow control buffer estimate starts out at the announced limit.
    pub fn new(
        peer_id: PeerId,
        fee_recipient: Address,
        flow_params: FlowParams,
        to_session: mpsc::UnboundedSender<SessionMessage>,
    ) -> Self {
        let buffer = Arc::new(Mutex::new(flow_params.buffer_limit));
        Self { peer_id, fee_recipient, flow_params, buffer, to_session }
    }

    /// Returns the identifier of the remote peer.
    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    /// Returns the fee recipient address the remote announced.
    ///
    /// Announcement is not authorization: whether the peer is currently
    /// registered for this address is decided by the [`PeerRegistry`].
    pub fn fee_recipient(&self) -> Address {
        self.fee_recipient
    }

    /// Returns the cost of relaying `txs` transactions in one request.
    pub fn request_cost(&self, txs: usize) -> u64 {
        self.flow_params.base_cost + self.flow_params.cost_per_tx * txs as u64
    }

    /// Returns the current estimate of the remaining flow control buffer.
    pub fn buffer_estimate(&self) -> u64 {
        *self.buffer.lock()
    }

    /// Reserves `cost` from the flow control buffer estimate.
    ///
    /// The estimate never goes below zero; the server refills it over time
    /// and corrects it with every response.
    pub fn reserve(&self, cost: u64) {
        let mut buffer = self.buffer.lock();
        *buffer = buffer.saturating_sub(cost);
    }

    /// Hands a batch of relay copies to the session for transmission.
    ///
    /// Dropped if the session already terminated.
    pub fn send_transactions(&self, request_id: u64, cost: u64, txs: Vec<Arc<TransactionSigned>>) {
        let _ = self.to_session.send(SessionMessage::RelayTransactions { request_id, cost, txs });
    }
}

/// Errors returned by [`PeerRegistry`] lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No connected peer is registered for the requested fee recipient.
    #[error("no peer registered for fee recipient {0}")]
    NoMatchingPeer(Address),
}

/// Provides access to the connected full node peers eligible for relaying.
///
/// Implemented by the component that owns the peer sessions; the relay only
/// reads from it. Implementations are expected to be safe for concurrent use.
#[auto_impl::auto_impl(&, Arc)]
pub trait PeerRegistry: Send + Sync {
    /// Returns a snapshot of all currently connected peers, in connection
    /// order.
    fn all_peers(&self) -> Vec<RelayPeer>;

    /// Returns the peer currently authorized to receive transactions for the
    /// given fee recipient.
    fn peer_with_fee_recipient(&self, fee_recipient: Address) -> Result<RelayPeer, RegistryError>;
}
