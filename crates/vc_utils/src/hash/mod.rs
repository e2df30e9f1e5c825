//! Hash maps with deterministic hashing, on top of `hashbrown`.

mod hasher;

pub use hasher::{FixedHashState, NoOpHashState, NoOpHasher};

/// A [`hashbrown::HashMap`] hashed with [`FixedHashState`] unless told otherwise.
pub type HashMap<K, V, S = FixedHashState> = hashbrown::HashMap<K, V, S>;

pub use hashbrown;
