use metrics::{Counter, Gauge};
use metrics_derive::Metrics;

/// Metrics for the transaction relay.
#[derive(Metrics)]
#[metrics(scope = "txrelay")]
pub(crate) struct TxRelayMetrics {
    /// Number of transactions the relay started tracking
    pub(crate) inserted_transactions: Counter,

    /// Number of relay requests queued on the distributor
    pub(crate) queued_requests: Counter,

    /// Number of fan-out candidates skipped because no connected peer serves the fee recipient
    pub(crate) unmatched_candidates: Counter,

    /// Number of tracked transactions currently believed to not be included in the chain
    pub(crate) pending_transactions: Gauge,
}
