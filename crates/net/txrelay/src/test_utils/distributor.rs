use crate::{
    distributor::{DistRequest, RequestDistributor},
    peers::RelayPeer,
};
use parking_lot::Mutex;

/// A [`RequestDistributor`] that collects queued requests for inspection.
#[derive(Debug, Default)]
pub struct MockDistributor {
    requests: Mutex<Vec<DistRequest>>,
}

// === impl MockDistributor ===

impl MockDistributor {
    /// Returns the number of requests queued so far.
    pub fn len(&self) -> usize {
        self.requests.lock().len()
    }

    /// Returns `true` if no requests are queued.
    pub fn is_empty(&self) -> bool {
        self.requests.lock().is_empty()
    }

    /// Takes all queued requests.
    pub fn drain(&self) -> Vec<DistRequest> {
        std::mem::take(&mut *self.requests.lock())
    }

    /// Executes every queued request the way the real distributor would: each
    /// runs against the first eligible peer with enough remaining buffer for
    /// its cost.
    ///
    /// Returns how many requests found an eligible peer.
    pub fn execute(&self, peers: &[RelayPeer]) -> usize {
        let mut executed = 0;
        for request in self.drain() {
            let eligible = peers.iter().find(|peer| {
                (request.can_send)(peer) && (request.get_cost)(peer) <= peer.buffer_estimate()
            });
            if let Some(peer) = eligible {
                (request.request)(peer);
                executed += 1;
            }
        }
        executed
    }
}

impl RequestDistributor for MockDistributor {
    fn queue(&self, request: DistRequest) {
        self.requests.lock().push(request);
    }
}
