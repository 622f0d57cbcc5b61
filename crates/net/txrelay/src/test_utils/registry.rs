use crate::peers::{PeerRegistry, RegistryError, RelayPeer};
use leth_primitives::{Address, PeerId};
use parking_lot::RwLock;
use std::collections::HashMap;

/// A [`PeerRegistry`] over a manually managed peer set.
#[derive(Debug, Default)]
pub struct MockRegistry {
    inner: RwLock<MockRegistryInner>,
}

#[derive(Debug, Default)]
struct MockRegistryInner {
    /// Connected peers in connection order.
    peers: Vec<RelayPeer>,
    /// Fee recipient registrations.
    by_fee_recipient: HashMap<Address, RelayPeer>,
}

// === impl MockRegistry ===

impl MockRegistry {
    /// Adds a connected peer and registers it for its announced fee recipient.
    pub fn add_peer(&self, peer: RelayPeer) {
        let mut inner = self.inner.write();
        inner.by_fee_recipient.insert(peer.fee_recipient(), peer.clone());
        inner.peers.push(peer);
    }

    /// Adds a connected peer without registering its fee recipient.
    ///
    /// Lookups for the announced address will miss, like they do for a peer
    /// whose registration lapsed.
    pub fn add_unregistered_peer(&self, peer: RelayPeer) {
        self.inner.write().peers.push(peer);
    }

    /// Disconnects the peer with the given id.
    pub fn remove_peer(&self, peer_id: PeerId) {
        let mut inner = self.inner.write();
        inner.peers.retain(|peer| peer.peer_id() != peer_id);
        inner.by_fee_recipient.retain(|_, peer| peer.peer_id() != peer_id);
    }
}

impl PeerRegistry for MockRegistry {
    fn all_peers(&self) -> Vec<RelayPeer> {
        self.inner.read().peers.clone()
    }

    fn peer_with_fee_recipient(&self, fee_recipient: Address) -> Result<RelayPeer, RegistryError> {
        self.inner
            .read()
            .by_fee_recipient
            .get(&fee_recipient)
            .cloned()
            .ok_or(RegistryError::NoMatchingPeer(fee_recipient))
    }
}
