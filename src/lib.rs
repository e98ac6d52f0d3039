//! kv-containers: interchangeable in-memory key-value containers.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: three associative maps with the same contract
//!   ([`KeyValueMap`]) but different collision and ordering strategies,
//!   plus the singly-linked chain one of them is built on.
//! - Components (leaves first):
//!   - LinkedChain<T>: singly-linked sequence with O(1) prepend and
//!     O(n) search/removal; each node owned by its predecessor.
//!   - ChainedMap<K, V, H>: separate chaining; bucket array of
//!     `Option<LinkedChain<(K, V)>>`.
//!   - ProbeMap<K, V, H>: open addressing with linear probing; flat array
//!     of `Empty | Tombstone | Occupied(K, V)` slots.
//!   - OrderedTreeMap<K, V>: unbalanced binary search tree stored in a
//!     `slotmap` arena, with parent back-references as arena keys.
//!
//! Constraints
//! - Single-threaded and synchronous. No locking is provided; wrap a map
//!   in a mutex if it must be shared.
//! - Every operation terminates in time bounded by the current size:
//!   chain length, `bin_count` probes, or tree height.
//! - Growth is not incremental: the `put` that pushes the load factor
//!   over `max_load` doubles the table and reinserts everything before
//!   it returns.
//!
//! Hashing
//! - The hash function is a stored value implementing [`KeyHash`]
//!   (closures qualify). Its only contract is determinism. The default
//!   is [`StdHash`] over hashbrown's default `BuildHasher`;
//!   [`constant_hash`] gives the degenerate every-key-collides function.
//!
//! Duplicate keys
//! - [`DuplicatePolicy::Replace`] (default): `put` on an existing key
//!   updates in place and returns the old value.
//! - [`DuplicatePolicy::Keep`]: `put` always adds an entry. ChainedMap
//!   then resolves lookups to the newest entry, ProbeMap and
//!   OrderedTreeMap to the oldest.
//!
//! Failure model
//! - A missing key is a normal outcome (`None` / `false`), logged at
//!   `debug` on removal and never an error.
//! - The only runtime error is [`MapError::TableFull`]: a ProbeMap insert
//!   that finds no free slot in a full wrap of the table.
//!
//! Non-goals
//! - No concurrent access, persistence, or balancing.

pub mod chained_map;
pub mod config;
pub mod error;
pub mod hashing;
pub mod linked_chain;
mod map;
#[cfg(test)]
mod map_proptest;
pub mod ordered_tree_map;
pub mod probe_map;

// Public surface
pub use chained_map::ChainedMap;
pub use config::{
    DuplicatePolicy, TableConfig, DEFAULT_BIN_COUNT, DEFAULT_MAX_LOAD, MIN_MAX_LOAD,
};
pub use error::{ConfigError, MapError};
pub use hashing::{constant_hash, ConstantHash, KeyHash, StdHash};
pub use linked_chain::LinkedChain;
pub use map::KeyValueMap;
pub use ordered_tree_map::{InOrder, OrderedTreeMap, PostOrder, PreOrder};
pub use probe_map::{ProbeMap, SlotState};
