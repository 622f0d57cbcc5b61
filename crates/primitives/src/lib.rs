#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

//! Commonly used types in leth.
//!
//! This crate contains the primitive types shared by the light client's
//! networking components.

mod bits;
mod transaction;

pub use bits::{H160, H256, H512};
pub use transaction::TransactionSigned;

/// Raw byte payloads.
pub use bytes::Bytes;

/// An Ethereum address.
pub type Address = H160;

/// A transaction hash, the identity of a transaction.
pub type TxHash = H256;

/// An identifier for a peer, the 512 bit public key of the remote node.
pub type PeerId = H512;
