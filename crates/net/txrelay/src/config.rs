/// Number of full nodes a transaction is relayed to.
///
/// Bounds the per transaction load on the peer set regardless of how many
/// peers are connected.
pub const DEFAULT_MAX_RELAY_PEERS: usize = 3;

/// Configuration for the transaction relay.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelayConfig {
    /// Upper bound on the number of peers a single transaction is relayed to.
    ///
    /// The effective fan-out of a pass is the minimum of this value and the
    /// number of connected peers.
    pub max_relay_peers: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self { max_relay_peers: DEFAULT_MAX_RELAY_PEERS }
    }
}
