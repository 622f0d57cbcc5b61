//! The scheduling seam between the relay and the request distributor.
//!
//! The relay never talks to a peer directly. Each send is described as a
//! [`DistRequest`] and queued on a [`RequestDistributor`], which runs on its
//! own task, picks an eligible peer with enough flow control budget and
//! executes the request there, trying other eligible peers if the chosen one
//! became unavailable in the meantime.

use crate::peers::RelayPeer;
use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

/// Returns a request id unique within this process.
///
/// Request ids only pair a request with its eventual response on a single
/// connection, so a process wide counter is sufficient.
pub(crate) fn next_request_id() -> u64 {
    static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(0);
    NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed)
}

/// A request the distributor can execute against one of the eligible peers.
///
/// Carries its scheduling inputs as explicit fields so the distributor can
/// evaluate cost and eligibility without knowing what the request does.
pub struct DistRequest {
    /// Estimated flow control cost of executing the request on the given peer.
    pub get_cost: Box<dyn Fn(&RelayPeer) -> u64 + Send + Sync>,
    /// Whether the request may be executed on the given peer.
    pub can_send: Box<dyn Fn(&RelayPeer) -> bool + Send + Sync>,
    /// Executes the request against the selected peer.
    ///
    /// Expected to reserve the flow control cost on the peer and hand the
    /// payload to its session.
    pub request: Box<dyn FnOnce(&RelayPeer) + Send>,
}

impl fmt::Debug for DistRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistRequest").finish_non_exhaustive()
    }
}

/// Accepts requests and executes each against a suitable peer.
///
/// [`queue`](Self::queue) returns immediately; peer selection under
/// contention, budget reservation and transmission happen later on the
/// distributor's own task. A request for which no eligible peer ever becomes
/// available is never executed, and there is no failure callback.
#[auto_impl::auto_impl(&, Arc)]
pub trait RequestDistributor: Send + Sync {
    /// Queues the request for asynchronous execution.
    fn queue(&self, request: DistRequest);
}
