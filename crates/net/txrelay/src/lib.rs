#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

//! Transaction relay for light clients.
//!
//! A light client does not participate in transaction gossip. Every locally
//! submitted transaction is instead handed to a small, bounded set of full
//! node peers which propagate it on the client's behalf.
//!
//! The [`TxRelay`] implemented here is responsible for:
//!    - selecting which peers receive a transaction, keyed by the fee
//!      recipient each peer serves.
//!    - remembering which peers already hold which transaction, so the same
//!      transaction is never sent to the same peer twice.
//!    - re-broadcasting transactions whose chain inclusion was rolled back by
//!      a reorg.
//!
//! The relay does not own any connections. Peers are resolved through a
//! [`PeerRegistry`] and every send is described as a [`DistRequest`] and
//! queued on a [`RequestDistributor`], which executes it asynchronously
//! against an eligible peer within its flow control budget. Both collaborators
//! are trait seams so they can be mocked in tests.
//!
//! All bookkeeping is in memory and rebuilt from scratch on restart.

mod config;
mod distributor;
mod metrics;
mod peers;
mod relay;

#[cfg(any(test, feature = "test-utils"))]
/// Common test helpers for mocking out the relay's collaborators.
pub mod test_utils;

pub use config::{RelayConfig, DEFAULT_MAX_RELAY_PEERS};
pub use distributor::{DistRequest, RequestDistributor};
pub use peers::{FlowParams, PeerRegistry, RegistryError, RelayPeer, SessionMessage};
pub use relay::TxRelay;
