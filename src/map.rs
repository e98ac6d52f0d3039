//! The associative-map contract shared by every container.

use crate::error::MapError;

/// Common surface of [`ChainedMap`](crate::ChainedMap),
/// [`ProbeMap`](crate::ProbeMap) and
/// [`OrderedTreeMap`](crate::OrderedTreeMap), so callers can swap one
/// implementation for another.
///
/// A missing key is an ordinary outcome: `get` and `remove` return
/// `None` and `contains` returns `false`.
pub trait KeyValueMap<K, V> {
    /// Store `value` under `key`. Returns the replaced value when the
    /// container is configured to update duplicates in place.
    fn put(&mut self, key: K, value: V) -> Result<Option<V>, MapError>;

    fn get(&self, key: &K) -> Option<&V>;

    /// Remove one entry for `key` and return its value.
    fn remove(&mut self, key: &K) -> Option<V>;

    fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
