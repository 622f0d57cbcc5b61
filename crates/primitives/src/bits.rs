//! Fixed hash types
use fixed_hash::construct_fixed_hash;
use impl_serde::impl_fixed_hash_serde;

/// Implements a fixed hash type (eg. H256) with `serde` support.
macro_rules! impl_fixed_hash_type {
    ($(($name:tt, $size:expr)),+) => {
        $(
            construct_fixed_hash! {
                #[doc = concat!(stringify!($name), " fixed hash type.")]
                pub struct $name($size);
            }

            impl_fixed_hash_serde!($name, $size);
        )+
    };
}

impl_fixed_hash_type!((H160, 20), (H256, 32), (H512, 64));
