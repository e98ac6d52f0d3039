//! ProbeMap: open addressing with linear probing and tombstones.
//!
//! Every key's probe run starts at `hash(key) % bin_count` and advances by
//! one slot (wrapping). Deleted slots become tombstones rather than empty
//! slots so that keys placed further along a run stay reachable. Growth
//! reinserts only live entries, which is what bounds tombstone build-up.
//!
//! All probe loops visit at most `bin_count` slots. A lookup in a table
//! with no empty slot therefore terminates, and an insert into a table
//! with no free slot fails with [`MapError::TableFull`] instead of
//! spinning.

use crate::config::{DuplicatePolicy, TableConfig};
use crate::error::{ConfigError, MapError};
use crate::hashing::{bin_index, KeyHash, StdHash};
use crate::map::KeyValueMap;
use core::borrow::Borrow;
use core::fmt;
use core::hash::Hash;
use core::mem;
use tracing::{debug, trace, warn};

#[derive(Debug)]
enum Slot<K, V> {
    Empty,
    Tombstone,
    Occupied(K, V),
}

/// Read-only view of one slot, for diagnostics.
#[derive(Debug, Eq, PartialEq)]
pub enum SlotState<'a, K, V> {
    Empty,
    Deleted,
    Occupied(&'a K, &'a V),
}

/// Where a `put` will land.
enum Target {
    Existing(usize),
    Free(usize),
    Full,
}

/// Open-addressing hash table with linear probing.
///
/// Under [`DuplicatePolicy::Keep`] a `put` takes the first empty or
/// deleted slot on the key's run without looking for an existing entry,
/// so a key may occupy several slots. Lookups and removals then act on
/// the first match along the run, i.e. the oldest surviving slot.
pub struct ProbeMap<K, V, H = StdHash> {
    hasher: H,
    slots: Vec<Slot<K, V>>,
    len: usize,
    max_load: f64,
    duplicates: DuplicatePolicy,
}

fn empty_slots<K, V>(bin_count: usize) -> Vec<Slot<K, V>> {
    std::iter::repeat_with(|| Slot::Empty).take(bin_count).collect()
}

/// Slot indices of a probe run, `bin_count` long.
fn probe_run(start: usize, bin_count: usize) -> impl Iterator<Item = usize> {
    (0..bin_count).map(move |step| (start + step) % bin_count)
}

impl<K, V> ProbeMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(StdHash::default())
    }
}

impl<K, V> Default for ProbeMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, H> ProbeMap<K, V, H>
where
    K: Eq,
    H: KeyHash<K>,
{
    pub fn with_hasher(hasher: H) -> Self {
        Self::build(TableConfig::default(), hasher)
    }

    /// Build from explicit settings. `max_load` is honored as given.
    pub fn with_config(config: TableConfig, hasher: H) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, hasher))
    }

    fn build(config: TableConfig, hasher: H) -> Self {
        Self {
            hasher,
            slots: empty_slots(config.bin_count),
            len: 0,
            max_load: config.max_load,
            duplicates: config.duplicates,
        }
    }

    fn home<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        H: KeyHash<Q>,
    {
        bin_index(self.hasher.hash_key(key), self.slots.len())
    }

    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bin_count(&self) -> usize {
        self.slots.len()
    }

    pub fn max_load(&self) -> f64 {
        self.max_load
    }

    /// Live entries over slots. Tombstones do not count.
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.slots.len() as f64
    }

    /// Number of deleted slots awaiting the next rebuild.
    pub fn tombstones(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, Slot::Tombstone))
            .count()
    }

    pub fn slot(&self, index: usize) -> Option<SlotState<'_, K, V>> {
        self.slots.get(index).map(|s| match s {
            Slot::Empty => SlotState::Empty,
            Slot::Tombstone => SlotState::Deleted,
            Slot::Occupied(k, v) => SlotState::Occupied(k, v),
        })
    }

    /// First slot on the key's run holding that key. Stops at an empty
    /// slot; passes over tombstones.
    fn find_slot<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: KeyHash<Q>,
    {
        for idx in probe_run(self.home(key), self.slots.len()) {
            match &self.slots[idx] {
                Slot::Empty => return None,
                Slot::Occupied(k, _) if k.borrow() == key => return Some(idx),
                Slot::Occupied(..) | Slot::Tombstone => {}
            }
        }
        None
    }

    fn locate(&self, key: &K) -> Target {
        let mut free = None;
        for idx in probe_run(self.home(key), self.slots.len()) {
            match &self.slots[idx] {
                Slot::Empty => return Target::Free(free.unwrap_or(idx)),
                Slot::Tombstone => {
                    if self.duplicates == DuplicatePolicy::Keep {
                        return Target::Free(idx);
                    }
                    free.get_or_insert(idx);
                }
                Slot::Occupied(k, _) => {
                    if self.duplicates == DuplicatePolicy::Replace && k == key {
                        return Target::Existing(idx);
                    }
                }
            }
        }
        free.map_or(Target::Full, Target::Free)
    }

    /// Insert `key -> value`, growing the table afterwards if the load
    /// factor exceeds `max_load`.
    ///
    /// Fails with [`MapError::TableFull`] when the run wraps the whole
    /// table without a free slot; the table is left untouched.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>, MapError> {
        match self.locate(&key) {
            Target::Existing(idx) => {
                let old = mem::replace(&mut self.slots[idx], Slot::Occupied(key, value));
                match old {
                    Slot::Occupied(_, v) => Ok(Some(v)),
                    Slot::Empty | Slot::Tombstone => Ok(None),
                }
            }
            Target::Free(idx) => {
                self.slots[idx] = Slot::Occupied(key, value);
                self.len += 1;
                self.rebuild();
                Ok(None)
            }
            Target::Full => {
                let bin_count = self.slots.len();
                warn!(bin_count, len = self.len, "probe map insert rejected: table full");
                Err(MapError::TableFull { bin_count })
            }
        }
    }

    /// Value stored under `key`, looked up by any borrowed form of it.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: KeyHash<Q>,
    {
        match &self.slots[self.find_slot(key)?] {
            Slot::Occupied(_, v) => Some(v),
            Slot::Empty | Slot::Tombstone => None,
        }
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: KeyHash<Q>,
    {
        let idx = self.find_slot(key)?;
        match &mut self.slots[idx] {
            Slot::Occupied(_, v) => Some(v),
            Slot::Empty | Slot::Tombstone => None,
        }
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: KeyHash<Q>,
    {
        self.get(key).is_some()
    }

    /// Replace the entry `get` would return with a tombstone.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: KeyHash<Q>,
    {
        let Some(idx) = self.find_slot(key) else {
            debug!(home = self.home(key), "probe map remove: key not found");
            return None;
        };
        match mem::replace(&mut self.slots[idx], Slot::Tombstone) {
            Slot::Occupied(_, v) => {
                self.len -= 1;
                trace!(slot = idx, len = self.len, "probe map remove");
                Some(v)
            }
            other => {
                self.slots[idx] = other;
                None
            }
        }
    }

    /// Reset every slot to empty, keeping the current number of bins.
    pub fn clear(&mut self) {
        self.slots = empty_slots(self.slots.len());
        self.len = 0;
    }

    /// Live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.slots.iter().filter_map(|s| match s {
            Slot::Occupied(k, v) => Some((k, v)),
            Slot::Empty | Slot::Tombstone => None,
        })
    }

    fn rebuild(&mut self) {
        while self.load_factor() > self.max_load {
            let Some(new_bins) = self.slots.len().checked_mul(2) else {
                warn!(bins = self.slots.len(), "probe map rebuild: bin count at limit");
                return;
            };
            self.grow(new_bins);
        }
    }

    /// Reinsert live entries into `new_bins` slots in slot order;
    /// tombstones are dropped.
    fn grow(&mut self, new_bins: usize) {
        let old_bins = self.slots.len();
        debug!(
            old_bins,
            new_bins,
            len = self.len,
            tombstones = self.tombstones(),
            "probe map rebuild"
        );
        let old = mem::replace(&mut self.slots, empty_slots(new_bins));
        self.len = 0;
        for slot in old {
            if let Slot::Occupied(key, value) = slot {
                let idx = probe_run(self.home(&key), new_bins)
                    .find(|&idx| matches!(self.slots[idx], Slot::Empty))
                    .expect("doubled table has an empty slot for every live entry");
                self.slots[idx] = Slot::Occupied(key, value);
                self.len += 1;
            }
        }
    }
}

impl<K, V, H> KeyValueMap<K, V> for ProbeMap<K, V, H>
where
    K: Eq,
    H: KeyHash<K>,
{
    fn put(&mut self, key: K, value: V) -> Result<Option<V>, MapError> {
        ProbeMap::put(self, key, value)
    }

    fn get(&self, key: &K) -> Option<&V> {
        ProbeMap::get(self, key)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        ProbeMap::remove(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        ProbeMap::contains(self, key)
    }

    fn len(&self) -> usize {
        self.len
    }
}

/// One line per slot: `Empty`, `Deleted`, or the stored pair.
impl<K: fmt::Debug, V: fmt::Debug, H> fmt::Display for ProbeMap<K, V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, slot) in self.slots.iter().enumerate() {
            match slot {
                Slot::Empty => writeln!(f, "{idx} | Empty")?,
                Slot::Tombstone => writeln!(f, "{idx} | Deleted")?,
                Slot::Occupied(k, v) => writeln!(f, "{idx} | ({k:?}, {v:?})")?,
            }
            writeln!(f, "-----------")?;
        }
        Ok(())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, H> fmt::Debug for ProbeMap<K, V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let live = self.slots.iter().filter_map(|s| match s {
            Slot::Occupied(k, v) => Some((k, v)),
            Slot::Empty | Slot::Tombstone => None,
        });
        f.debug_map().entries(live).finish()
    }
}
