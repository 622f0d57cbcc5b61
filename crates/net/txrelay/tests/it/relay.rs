//! End to end relay runs against a live distributor task.

use leth_primitives::Address;
use leth_txrelay::{
    test_utils::{random_tx, relay_peer, MockRegistry, TEST_FLOW_PARAMS},
    DistRequest, PeerRegistry, RelayConfig, RequestDistributor, SessionMessage, TxRelay,
};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver},
    time::timeout,
};

/// A distributor backed by an unbounded channel, drained by its own task.
#[derive(Debug, Clone)]
struct ChannelDistributor {
    to_task: mpsc::UnboundedSender<DistRequest>,
}

impl RequestDistributor for ChannelDistributor {
    fn queue(&self, request: DistRequest) {
        let _ = self.to_task.send(request);
    }
}

/// Spawns a task that executes every queued request against the first
/// eligible peer with sufficient flow control budget.
fn spawn_distributor(registry: Arc<MockRegistry>) -> ChannelDistributor {
    let (to_task, mut requests) = mpsc::unbounded_channel::<DistRequest>();
    tokio::spawn(async move {
        while let Some(request) = requests.recv().await {
            let peer = registry.all_peers().into_iter().find(|peer| {
                (request.can_send)(peer) && (request.get_cost)(peer) <= peer.buffer_estimate()
            });
            if let Some(peer) = peer {
                (request.request)(&peer);
            }
        }
    });
    ChannelDistributor { to_task }
}

async fn next_message(session: &mut UnboundedReceiver<SessionMessage>) -> SessionMessage {
    timeout(Duration::from_secs(5), session.recv()).await.expect("no delivery").unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_relays_to_live_peers() {
    leth_tracing::init_test_tracing();

    let registry = Arc::new(MockRegistry::default());
    let mut peers = Vec::new();
    let mut sessions = Vec::new();
    for _ in 0..3 {
        let (peer, session) = relay_peer(Address::random());
        registry.add_peer(peer.clone());
        peers.push(peer);
        sessions.push(session);
    }

    let distributor = spawn_distributor(Arc::clone(&registry));
    let relay = TxRelay::new(Arc::clone(&registry), distributor, RelayConfig::default());

    relay.send(vec![random_tx(Address::random()), random_tx(Address::random())]);

    for (peer, session) in peers.iter().zip(sessions.iter_mut()) {
        let SessionMessage::RelayTransactions { cost, txs, .. } = next_message(session).await;

        // one request per peer carrying the peer's whole batch
        assert_eq!(txs.len(), 2);
        assert_eq!(cost, peer.request_cost(2));
        // every copy is addressed to the peer it arrived at
        assert!(txs.iter().all(|tx| tx.fee_recipient == peer.fee_recipient()));
        // the cost was reserved against the peer's budget
        assert_eq!(peer.buffer_estimate(), TEST_FLOW_PARAMS.buffer_limit - cost);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reorg_retransmits_to_recorded_peers() {
    leth_tracing::init_test_tracing();

    let registry = Arc::new(MockRegistry::default());
    let mut sessions = Vec::new();
    for _ in 0..2 {
        let (peer, session) = relay_peer(Address::random());
        registry.add_peer(peer);
        sessions.push(session);
    }

    let distributor = spawn_distributor(Arc::clone(&registry));
    let relay = TxRelay::new(Arc::clone(&registry), distributor, RelayConfig::default());

    let tx = random_tx(Address::random());
    relay.send(vec![tx.clone()]);

    let mut first_wave = Vec::new();
    for session in sessions.iter_mut() {
        let SessionMessage::RelayTransactions { txs, .. } = next_message(session).await;
        assert_eq!(txs.len(), 1);
        first_wave.push(txs[0].clone());
    }

    // mined, then rolled back in a reorg
    relay.new_head(leth_primitives::H256::random(), &[tx.hash()], &[]);
    relay.new_head(leth_primitives::H256::random(), &[], &[tx.hash()]);

    // each peer receives exactly the copy it already holds
    for (session, original) in sessions.iter_mut().zip(first_wave) {
        let SessionMessage::RelayTransactions { txs, .. } = next_message(session).await;
        assert_eq!(txs, vec![original]);
    }
}
