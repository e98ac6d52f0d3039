//! Pluggable hash functions.
//!
//! A table stores its hash function as a value and calls it as
//! `hash_key(&key)`. The only contract is determinism: the same key
//! yields the same integer for the lifetime of the table. Distribution
//! quality is the caller's business, so a constant function is a valid
//! (and useful) choice for collision testing.

use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Maps a key to an integer; the table reduces it modulo its bin count.
pub trait KeyHash<K: ?Sized> {
    fn hash_key(&self, key: &K) -> u64;
}

impl<K: ?Sized, F> KeyHash<K> for F
where
    F: Fn(&K) -> u64,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        self(key)
    }
}

/// Adapts a `BuildHasher` to [`KeyHash`] for any `K: Hash`.
#[derive(Clone, Debug, Default)]
pub struct StdHash<S = DefaultHashBuilder>(pub S);

impl<K, S> KeyHash<K> for StdHash<S>
where
    K: ?Sized + Hash,
    S: BuildHasher,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        self.0.hash_one(key)
    }
}

/// Hashes every key to the same value.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ConstantHash(pub u64);

impl<K: ?Sized> KeyHash<K> for ConstantHash {
    #[inline]
    fn hash_key(&self, _key: &K) -> u64 {
        self.0
    }
}

/// The worst possible hash function: every key lands on `value`.
pub fn constant_hash(value: u64) -> ConstantHash {
    ConstantHash(value)
}

/// Reduce a hash to a bin index.
#[inline]
pub(crate) fn bin_index(hash: u64, bin_count: usize) -> usize {
    (hash % bin_count as u64) as usize
}
