//! ChainedMap: separate chaining over an array of `LinkedChain` buckets.

use crate::config::{DuplicatePolicy, TableConfig};
use crate::error::{ConfigError, MapError};
use crate::hashing::{bin_index, KeyHash, StdHash};
use crate::linked_chain::LinkedChain;
use crate::map::KeyValueMap;
use core::borrow::Borrow;
use core::fmt;
use core::hash::Hash;
use core::mem;
use tracing::{debug, trace, warn};

type Bucket<K, V> = Option<LinkedChain<(K, V)>>;

/// Hash table whose buckets each own a chain of colliding `(key, value)`
/// pairs.
///
/// New entries are prepended to their bucket's chain. Under
/// [`DuplicatePolicy::Keep`] a key may therefore appear several times in
/// one chain, and lookups and removals act on the most recently inserted
/// entry.
pub struct ChainedMap<K, V, H = StdHash> {
    hasher: H,
    buckets: Vec<Bucket<K, V>>,
    len: usize,
    max_load: f64,
    duplicates: DuplicatePolicy,
}

fn empty_buckets<K, V>(bin_count: usize) -> Vec<Bucket<K, V>> {
    std::iter::repeat_with(|| None).take(bin_count).collect()
}

impl<K, V> ChainedMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(StdHash::default())
    }
}

impl<K, V> Default for ChainedMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, H> ChainedMap<K, V, H>
where
    K: Eq,
    H: KeyHash<K>,
{
    /// Default sizing with a caller-supplied hash function.
    pub fn with_hasher(hasher: H) -> Self {
        Self::build(TableConfig::default(), hasher)
    }

    pub fn with_config(config: TableConfig, hasher: H) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, hasher))
    }

    fn build(config: TableConfig, hasher: H) -> Self {
        Self {
            hasher,
            buckets: empty_buckets(config.bin_count),
            len: 0,
            max_load: config.max_load,
            duplicates: config.duplicates,
        }
    }

    fn bucket_of<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        H: KeyHash<Q>,
    {
        bin_index(self.hasher.hash_key(key), self.buckets.len())
    }

    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bin_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn max_load(&self) -> f64 {
        self.max_load
    }

    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.buckets.len() as f64
    }

    /// Insert `key -> value`, growing the table afterwards if the load
    /// factor exceeds `max_load`.
    ///
    /// Under `Replace` an existing entry is updated in place and its old
    /// value returned; the length and table size are unchanged.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let idx = self.bucket_of(&key);
        if self.duplicates == DuplicatePolicy::Replace {
            if let Some(chain) = &mut self.buckets[idx] {
                if let Some((_, stored)) = chain.iter_mut().find(|(k, _)| *k == key) {
                    return Some(mem::replace(stored, value));
                }
            }
        }
        self.link(idx, key, value);
        self.rebuild();
        None
    }

    fn link(&mut self, idx: usize, key: K, value: V) {
        self.buckets[idx]
            .get_or_insert_with(LinkedChain::new)
            .prepend((key, value));
        self.len += 1;
    }

    /// Most recent value stored under `key`. Accepts any borrowed form of
    /// the key the hash function also accepts (`&str` for `String` keys).
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: KeyHash<Q>,
    {
        self.buckets[self.bucket_of(key)]
            .as_ref()?
            .iter()
            .find(|(k, _)| k.borrow() == key)
            .map(|(_, v)| v)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: KeyHash<Q>,
    {
        let idx = self.bucket_of(key);
        self.buckets[idx]
            .as_mut()?
            .iter_mut()
            .find(|(k, _)| k.borrow() == key)
            .map(|(_, v)| v)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: KeyHash<Q>,
    {
        self.get(key).is_some()
    }

    /// Remove the entry `get` would return. A bucket whose chain becomes
    /// empty goes back to the empty state.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: KeyHash<Q>,
    {
        let idx = self.bucket_of(key);
        let bucket = &mut self.buckets[idx];
        let Some((_, value)) = bucket
            .as_mut()
            .and_then(|chain| chain.remove_where(|(k, _)| k.borrow() == key))
        else {
            debug!(bucket = idx, "chained map remove: key not found");
            return None;
        };
        if bucket.as_ref().is_some_and(LinkedChain::is_empty) {
            *bucket = None;
        }
        self.len -= 1;
        trace!(bucket = idx, len = self.len, "chained map remove");
        Some(value)
    }

    /// Drop every entry, keeping the current number of bins.
    pub fn clear(&mut self) {
        self.buckets = empty_buckets(self.buckets.len());
        self.len = 0;
    }

    /// Entries in bucket order, each chain head to tail.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.buckets
            .iter()
            .flatten()
            .flat_map(|chain| chain.iter())
            .map(|(k, v)| (k, v))
    }

    fn rebuild(&mut self) {
        while self.load_factor() > self.max_load {
            let Some(new_bins) = self.buckets.len().checked_mul(2) else {
                warn!(bins = self.buckets.len(), "chained map rebuild: bin count at limit");
                return;
            };
            self.grow(new_bins);
        }
    }

    /// Relink every entry into `new_bins` buckets. Chains are relinked tail
    /// first so entries sharing a key keep their relative order.
    fn grow(&mut self, new_bins: usize) {
        let old_bins = self.buckets.len();
        debug!(old_bins, new_bins, len = self.len, "chained map rebuild");
        let old = mem::replace(&mut self.buckets, empty_buckets(new_bins));
        self.len = 0;
        for chain in old.into_iter().flatten() {
            let entries: Vec<(K, V)> = chain.into_iter().collect();
            // Head-first reinsertion would reverse duplicates of one key.
            for (key, value) in entries.into_iter().rev() {
                let idx = self.bucket_of(&key);
                self.link(idx, key, value);
            }
        }
    }
}

impl<K, V, H> KeyValueMap<K, V> for ChainedMap<K, V, H>
where
    K: Eq,
    H: KeyHash<K>,
{
    fn put(&mut self, key: K, value: V) -> Result<Option<V>, MapError> {
        Ok(ChainedMap::put(self, key, value))
    }

    fn get(&self, key: &K) -> Option<&V> {
        ChainedMap::get(self, key)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        ChainedMap::remove(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        ChainedMap::contains(self, key)
    }

    fn len(&self) -> usize {
        self.len
    }
}

/// One line per bucket: `Empty`, or the chain's pairs head to tail.
impl<K: fmt::Debug, V: fmt::Debug, H> fmt::Display for ChainedMap<K, V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, bucket) in self.buckets.iter().enumerate() {
            match bucket {
                None => writeln!(f, "{idx} | Empty")?,
                Some(chain) => {
                    write!(f, "{idx} | ")?;
                    for (k, v) in chain {
                        write!(f, "->({k:?}, {v:?})")?;
                    }
                    writeln!(f)?;
                }
            }
            writeln!(f, "-----------")?;
        }
        Ok(())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, H> fmt::Debug for ChainedMap<K, V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.buckets
                    .iter()
                    .flatten()
                    .flat_map(|chain| chain.iter())
                    .map(|(k, v)| (k, v)),
            )
            .finish()
    }
}
