//! Fan-out of pending transactions to full node peers.

use crate::{
    config::RelayConfig,
    distributor::{next_request_id, DistRequest, RequestDistributor},
    metrics::TxRelayMetrics,
    peers::{PeerRegistry, RegistryError, RelayPeer},
};
use leth_primitives::{Address, PeerId, TransactionSigned, TxHash, H256};
use parking_lot::RwLock;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use tracing::{error, trace};

/// Relays transactions to a bounded number of full node peers.
///
/// A transaction is fanned out at most once: the first [`send`](Self::send)
/// for a hash selects the peers and constructs the relay copies, and from then
/// on only the reorg path replays those exact copies to those exact peers.
/// This is how the relay guarantees that the same transaction is never sent
/// to the same peer twice.
///
/// All bookkeeping lives behind a single lock, so the operations are safe to
/// call from any number of tasks. Network delivery is fire and forget: the
/// relay only queues requests on the distributor and never waits for their
/// completion, so no operation blocks on I/O while holding the lock.
pub struct TxRelay<R, D> {
    /// Lookup of connected peers and their registered fee recipients.
    registry: R,
    /// Executes queued requests against peers on its own task.
    distributor: D,
    /// Fan-out parameters.
    config: RelayConfig,
    /// Relay table, pending set and cached peer snapshot.
    inner: RwLock<RelayInner>,
    /// Relay metrics.
    metrics: TxRelayMetrics,
}

/// State shared by all operations of the relay.
///
/// Guarded by a single writer lock; every public operation of [`TxRelay`]
/// holds the write guard for its entire body.
#[derive(Debug, Default)]
struct RelayInner {
    /// Tracked transactions and the relay copies constructed for them.
    sent: HashMap<TxHash, Vec<SentCopy>>,
    /// Hashes believed to not be included in the canonical chain yet.
    pending: HashSet<TxHash>,
    /// Cached snapshot of the connected peers, refreshed on every peer join
    /// and leave notification.
    peers: Vec<RelayPeer>,
}

/// A relay copy of a transaction and the peers it was handed to.
#[derive(Debug)]
struct SentCopy {
    /// The peer targeted copy. Shares the identity of the source transaction,
    /// only the fee recipient differs.
    tx: Arc<TransactionSigned>,
    /// Peers this exact copy was routed to.
    sent_to: HashSet<PeerId>,
}

/// Batches of relay copies grouped by the peer they are addressed to.
type PeerBatches = HashMap<PeerId, Vec<Arc<TransactionSigned>>>;

// === impl TxRelay ===

impl<R, D> TxRelay<R, D>
where
    R: PeerRegistry,
    D: RequestDistributor,
{
    /// Creates a new relay on top of the given registry and distributor.
    ///
    /// The peer snapshot is primed from the registry; afterwards the caller is
    /// expected to forward peer join and leave events to
    /// [`register_peer`](Self::register_peer) and
    /// [`unregister_peer`](Self::unregister_peer).
    pub fn new(registry: R, distributor: D, config: RelayConfig) -> Self {
        let peers = registry.all_peers();
        Self {
            registry,
            distributor,
            config,
            inner: RwLock::new(RelayInner { peers, ..Default::default() }),
            metrics: TxRelayMetrics::default(),
        }
    }

    /// Returns an error if no connected peer is registered for the given fee
    /// recipient.
    ///
    /// Used by upstream admission checks before a transaction is accepted into
    /// the pool feeding this relay.
    pub fn has_peer_with_fee_recipient(&self, fee_recipient: Address) -> Result<(), RegistryError> {
        self.registry.peer_with_fee_recipient(fee_recipient).map(drop)
    }

    /// Relays the given transactions to at most
    /// [`max_relay_peers`](RelayConfig::max_relay_peers) peers each, never
    /// resending any particular transaction to the same peer twice.
    ///
    /// Hashes that are already tracked are skipped entirely; resending happens
    /// only through [`new_head`](Self::new_head), which replays the copies
    /// selected here.
    pub fn send(&self, txs: Vec<TransactionSigned>) {
        let mut inner = self.inner.write();
        self.relay(&mut inner, txs);
    }

    /// Applies a new chain head to the pending set and re-broadcasts.
    ///
    /// Hashes in `mined` were included in the new canonical chain and stop
    /// being pending. Hashes in `rolled_back` lost their inclusion in a reorg
    /// and become pending again. Every transaction still pending afterwards is
    /// re-queued for the peers recorded in its relay record: a full
    /// re-broadcast rather than a minimal diff, trading redundant sends for
    /// simple bookkeeping.
    pub fn new_head(&self, head: H256, mined: &[TxHash], rolled_back: &[TxHash]) {
        let mut inner = self.inner.write();

        for hash in mined {
            inner.pending.remove(hash);
        }
        for hash in rolled_back {
            inner.pending.insert(*hash);
        }
        trace!(
            target: "txrelay",
            ?head,
            mined = mined.len(),
            rolled_back = rolled_back.len(),
            pending = inner.pending.len(),
            "applied new head"
        );

        if !inner.pending.is_empty() {
            let batches = pending_batches(&inner);
            self.dispatch(batches);
        }
        self.metrics.pending_transactions.set(inner.pending.len() as f64);
    }

    /// Stops tracking the given hashes.
    ///
    /// Called when transactions leave the upstream pool for reasons outside
    /// consensus (replaced, invalidated, evicted). Unknown hashes are ignored.
    pub fn discard(&self, hashes: &[TxHash]) {
        let mut inner = self.inner.write();
        for hash in hashes {
            inner.sent.remove(hash);
            inner.pending.remove(hash);
        }
        self.metrics.pending_transactions.set(inner.pending.len() as f64);
    }

    /// Notifies the relay that a peer joined.
    ///
    /// Refreshes the cached peer snapshot. Existing relay records and already
    /// queued requests are not touched; only future fan-out passes see the
    /// new candidate pool.
    pub fn register_peer(&self, peer_id: PeerId) {
        let mut inner = self.inner.write();
        inner.peers = self.registry.all_peers();
        trace!(target: "txrelay", ?peer_id, peers = inner.peers.len(), "peer registered");
    }

    /// Notifies the relay that a peer disconnected.
    ///
    /// Refreshes the cached peer snapshot. Existing relay records and already
    /// queued requests are not touched; only future fan-out passes see the
    /// new candidate pool.
    pub fn unregister_peer(&self, peer_id: PeerId) {
        let mut inner = self.inner.write();
        inner.peers = self.registry.all_peers();
        trace!(target: "txrelay", ?peer_id, peers = inner.peers.len(), "peer unregistered");
    }

    /// Fans out every transaction that is not tracked yet and queues one
    /// request per targeted peer, carrying that peer's whole batch.
    fn relay(&self, inner: &mut RelayInner, txs: Vec<TransactionSigned>) {
        let mut batches = PeerBatches::new();

        for tx in txs {
            let hash = tx.hash();
            if inner.sent.contains_key(&hash) {
                continue
            }

            let mut copies = Vec::new();
            let fan_out = self.config.max_relay_peers.min(inner.peers.len());
            for candidate in inner.peers.iter().take(fan_out) {
                let relayed = tx.with_fee_recipient(candidate.fee_recipient());
                let peer = match self.registry.peer_with_fee_recipient(relayed.fee_recipient) {
                    Ok(peer) => peer,
                    Err(err) => {
                        // The sender's nonce was already consumed upstream, so
                        // later transactions from the same account can starve
                        // until the peer set changes. The admission probe
                        // exists to keep such transactions out of the pool.
                        self.metrics.unmatched_candidates.increment(1);
                        error!(target: "txrelay", %err, ?hash, "unable to relay to candidate peer");
                        continue
                    }
                };

                let relayed = Arc::new(relayed);
                batches.entry(peer.peer_id()).or_default().push(Arc::clone(&relayed));
                copies.push(SentCopy {
                    tx: relayed,
                    sent_to: HashSet::from([peer.peer_id()]),
                });
            }

            if copies.is_empty() {
                // No eligible peer in this wave. The hash stays untracked so a
                // later `send` can fan it out against a changed peer set.
                trace!(target: "txrelay", ?hash, "no eligible relay peer, dropping from wave");
                continue
            }

            inner.sent.insert(hash, copies);
            inner.pending.insert(hash);
            self.metrics.inserted_transactions.increment(1);
        }

        self.metrics.pending_transactions.set(inner.pending.len() as f64);
        self.dispatch(batches);
    }

    /// Queues one distributor request per peer batch.
    ///
    /// Only enqueues: peer selection under contention, budget reservation and
    /// transmission happen later on the distributor's task.
    fn dispatch(&self, batches: PeerBatches) {
        for (peer_id, txs) in batches {
            let request_id = next_request_id();
            let len = txs.len();

            let request = DistRequest {
                get_cost: Box::new(move |peer| peer.request_cost(len)),
                can_send: Box::new(move |peer| peer.peer_id() == peer_id),
                request: Box::new(move |peer| {
                    let cost = peer.request_cost(txs.len());
                    peer.reserve(cost);
                    peer.send_transactions(request_id, cost, txs);
                }),
            };

            self.distributor.queue(request);
            self.metrics.queued_requests.increment(1);
        }
    }
}

/// Collects the recorded relay copies of every pending transaction, grouped by
/// the peer each copy was originally routed to.
///
/// Pending hashes without a relay record (rolled back but never fanned out, or
/// already discarded) are skipped until the next fan-out pass.
fn pending_batches(inner: &RelayInner) -> PeerBatches {
    let mut batches = PeerBatches::new();
    for hash in &inner.pending {
        if let Some(copies) = inner.sent.get(hash) {
            for copy in copies {
                for peer_id in &copy.sent_to {
                    batches.entry(*peer_id).or_default().push(Arc::clone(&copy.tx));
                }
            }
        }
    }
    batches
}

#[cfg(any(test, feature = "test-utils"))]
impl<R, D> TxRelay<R, D> {
    /// Returns `true` if the hash is currently in the relay table.
    pub fn is_tracked(&self, hash: &TxHash) -> bool {
        self.inner.read().sent.contains_key(hash)
    }

    /// Returns `true` if the hash is currently in the pending set.
    pub fn is_pending(&self, hash: &TxHash) -> bool {
        self.inner.read().pending.contains(hash)
    }

    /// Returns the ids of all peers the copies of the given transaction were
    /// routed to.
    pub fn sent_to(&self, hash: &TxHash) -> Vec<PeerId> {
        let inner = self.inner.read();
        inner
            .sent
            .get(hash)
            .map(|copies| copies.iter().flat_map(|copy| copy.sent_to.iter().copied()).collect())
            .unwrap_or_default()
    }

    /// Returns the number of peers in the cached snapshot.
    pub fn peer_count(&self) -> usize {
        self.inner.read().peers.len()
    }
}
