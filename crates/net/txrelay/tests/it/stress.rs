//! Concurrency stress over the relay's shared bookkeeping.

use leth_primitives::{Address, TransactionSigned, TxHash, H256};
use leth_txrelay::{
    test_utils::{random_tx, relay_peer, MockDistributor, MockRegistry},
    RelayConfig, TxRelay,
};
use rand::{seq::SliceRandom, thread_rng};
use std::{sync::Arc, thread};

const TXS_PER_GROUP: usize = 50;

fn tx_group() -> Vec<TransactionSigned> {
    (0..TXS_PER_GROUP).map(|_| random_tx(Address::random())).collect()
}

fn hashes(txs: &[TransactionSigned]) -> Vec<TxHash> {
    txs.iter().map(|tx| tx.hash()).collect()
}

/// Hammers one relay instance from independent threads, each driving a
/// different lifecycle for its own transactions while peers churn, and
/// asserts the bookkeeping ends up consistent.
#[test]
fn test_concurrent_operations_keep_state_consistent() {
    leth_tracing::init_test_tracing();

    let registry = Arc::new(MockRegistry::default());
    for _ in 0..4 {
        let (peer, session) = relay_peer(Address::random());
        registry.add_peer(peer);
        // receivers dropped on purpose: delivery is fire and forget
        drop(session);
    }
    let distributor = Arc::new(MockDistributor::default());
    let relay = Arc::new(TxRelay::new(
        Arc::clone(&registry),
        Arc::clone(&distributor),
        RelayConfig::default(),
    ));

    let unmined = tx_group();
    let mined = tx_group();
    let rolled_back = tx_group();
    let discarded = tx_group();

    thread::scope(|s| {
        // new transactions that never get mined
        s.spawn(|| {
            let mut txs = unmined.clone();
            txs.shuffle(&mut thread_rng());
            for chunk in txs.chunks(5) {
                relay.send(chunk.to_vec());
                thread::yield_now();
            }
        });

        // transactions that end up mined
        s.spawn(|| {
            for chunk in mined.chunks(5) {
                relay.send(chunk.to_vec());
                relay.new_head(H256::random(), &hashes(chunk), &[]);
                thread::yield_now();
            }
        });

        // transactions that get mined and then lose their block to a reorg
        s.spawn(|| {
            for chunk in rolled_back.chunks(5) {
                relay.send(chunk.to_vec());
                relay.new_head(H256::random(), &hashes(chunk), &[]);
                relay.new_head(H256::random(), &[], &hashes(chunk));
                thread::yield_now();
            }
        });

        // transactions evicted from the upstream pool
        s.spawn(|| {
            for chunk in discarded.chunks(5) {
                relay.send(chunk.to_vec());
                relay.discard(&hashes(chunk));
                thread::yield_now();
            }
        });

        // peer churn
        s.spawn(|| {
            for _ in 0..25 {
                let (peer, _session) = relay_peer(Address::random());
                let peer_id = peer.peer_id();
                registry.add_peer(peer);
                relay.register_peer(peer_id);
                thread::yield_now();
                registry.remove_peer(peer_id);
                relay.unregister_peer(peer_id);
            }
        });
    });

    // the four stable peers stayed first in the snapshot the whole time, so
    // every fan-out targeted exactly three of them
    for tx in unmined.iter().chain(rolled_back.iter()) {
        assert!(relay.is_tracked(&tx.hash()));
        assert!(relay.is_pending(&tx.hash()));
        assert_eq!(relay.sent_to(&tx.hash()).len(), 3);
    }
    for tx in &mined {
        assert!(relay.is_tracked(&tx.hash()));
        assert!(!relay.is_pending(&tx.hash()));
    }
    for tx in &discarded {
        assert!(!relay.is_tracked(&tx.hash()));
        assert!(!relay.is_pending(&tx.hash()));
    }

    // the relay still fans out fresh transactions after the storm
    distributor.drain();
    let fresh = random_tx(Address::random());
    relay.send(vec![fresh.clone()]);
    assert_eq!(distributor.len(), 3);
    assert!(relay.is_pending(&fresh.hash()));
}
