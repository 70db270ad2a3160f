//! ChainTable: separate-chaining hash table with explicit ownership hand-off.

use crate::config::TableConfig;
use crate::error::TableError;
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use hashbrown::hash_map::DefaultHashBuilder;
use slotmap::{DefaultKey, SlotMap};
use tracing::{debug, trace};

/// Link to the next entry of a chain (or the first one, for a bucket head).
type Link = Option<DefaultKey>;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
    next: Link,
}

/// A hash table resolving collisions by chaining.
///
/// Keys are hashed with `S` and compared with `K: Eq`; both are fixed when
/// the table is built. Chain entries live in a generational arena and are
/// linked by arena keys, so growing the table only rewrites links.
pub struct ChainTable<K, V, S = DefaultHashBuilder> {
    hasher: S,
    buckets: Vec<Link>,
    entries: SlotMap<DefaultKey, Entry<K, V>>, // chain nodes, linked through `next`
    max_load: f64,
    probe: DebugReentrancy,
}

/// Payloads handed back by [`ChainTable::destroy`].
///
/// When neither keys nor values were released, `keys[i]` was stored with
/// `values[i]`.
#[derive(Debug)]
pub struct Reclaimed<K, V> {
    pub keys: Vec<K>,
    pub values: Vec<V>,
}

impl<K, V> ChainTable<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V, S> Default for ChainTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

/// Iterator over immutable entries in `ChainTable`.
pub struct Iter<'a, K, V> {
    it: slotmap::basic::Iter<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Iterator over entries in `ChainTable` with mutable values.
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::IterMut<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (&e.key, &mut e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V, S> ChainTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Creates an empty table with the default configuration.
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_config(TableConfig::default(), hasher)
    }

    /// Creates an empty table sized by `config`.
    ///
    /// Panics if `config` does not validate or the bucket array cannot be
    /// allocated; see [`try_with_config`](Self::try_with_config).
    pub fn with_config(config: TableConfig, hasher: S) -> Self {
        match Self::try_with_config(config, hasher) {
            Ok(table) => table,
            Err(e) => panic!("cannot create ChainTable: {e}"),
        }
    }

    /// Creates an empty table sized by `config`, reporting invalid settings
    /// and allocation failure instead of panicking.
    pub fn try_with_config(config: TableConfig, hasher: S) -> Result<Self, TableError> {
        config.validate()?;
        let mut buckets = Vec::new();
        buckets.try_reserve_exact(config.capacity())?;
        buckets.resize(config.capacity(), None);
        Ok(Self {
            hasher,
            buckets,
            entries: SlotMap::with_key(),
            max_load: config.load_threshold(),
            probe: DebugReentrancy::new(),
        })
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    #[inline]
    fn bucket_of(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Average chain length, `len / capacity`.
    pub fn load_factor(&self) -> f64 {
        self.entries.len() as f64 / self.buckets.len() as f64
    }

    pub fn max_load(&self) -> f64 {
        self.max_load
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Walks the chain `hash` selects; runs `K: Eq` on entries whose stored
    /// digest matches.
    fn find_in_chain<Q>(&self, hash: u64, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut cur = self.buckets[self.bucket_of(hash)];
        while let Some(k) = cur {
            let e = &self.entries[k];
            if e.hash == hash && e.key.borrow() == q {
                return Some(k);
            }
            cur = e.next;
        }
        None
    }

    /// Stores `key -> value`.
    ///
    /// Returns `None` when the key was new. When an equal key was present,
    /// both the stored key and value are replaced and the previous pair is
    /// returned; the table keeps nothing of it.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        let displaced = {
            let _g = self.probe.enter();
            let hash = self.make_hash(&key);
            match self.find_in_chain(hash, &key) {
                Some(k) => {
                    let e = &mut self.entries[k];
                    let old_key = mem::replace(&mut e.key, key);
                    let old_value = mem::replace(&mut e.value, value);
                    Some((old_key, old_value))
                }
                None => {
                    let b = self.bucket_of(hash);
                    let next = self.buckets[b];
                    let k = self.entries.insert(Entry {
                        key,
                        value,
                        hash,
                        next,
                    });
                    self.buckets[b] = Some(k);
                    None
                }
            }
        };

        if self.load_factor() >= self.max_load {
            self.grow();
        }
        displaced
    }

    /// Doubles the bucket count until the load factor is back under the
    /// threshold, then relinks every entry once.
    fn grow(&mut self) {
        let len = self.entries.len() as f64;
        let mut capacity = self.buckets.len();
        while len / capacity as f64 >= self.max_load {
            let doubled = capacity.saturating_mul(2);
            if doubled == capacity {
                break;
            }
            capacity = doubled;
        }
        self.resize(capacity);
    }

    /// Moves every entry into a fresh bucket array of `new_capacity` heads.
    ///
    /// Uses the digest stored at insert time: no user code runs here, and
    /// arena slots are reused as-is.
    fn resize(&mut self, new_capacity: usize) {
        let old_capacity = self.buckets.len();
        let old = mem::replace(&mut self.buckets, vec![None; new_capacity]);
        for head in old {
            let mut cur = head;
            while let Some(k) = cur {
                let e = &mut self.entries[k];
                cur = e.next;
                let b = (e.hash % new_capacity as u64) as usize;
                e.next = self.buckets[b];
                self.buckets[b] = Some(k);
            }
        }
        debug!(
            old_capacity,
            new_capacity,
            len = self.entries.len(),
            "resized chain table"
        );
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.probe.enter();
        let hash = self.make_hash(q);
        self.find_in_chain(hash, q).map(|k| &self.entries[k].value)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.probe.enter();
        let hash = self.make_hash(q);
        self.find_in_chain(hash, q).map(|k| {
            let e = &self.entries[k];
            (&e.key, &e.value)
        })
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let k = {
            let _g = self.probe.enter();
            let hash = self.make_hash(q);
            self.find_in_chain(hash, q)?
        };
        self.entries.get_mut(k).map(|e| &mut e.value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(q).is_some()
    }

    /// Unlinks the entry for `q` and hands its key and value back.
    ///
    /// Never shrinks the table.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let k = {
            let _g = self.probe.enter();
            let hash = self.make_hash(q);
            let b = self.bucket_of(hash);
            let mut prev: Link = None;
            let mut cur = self.buckets[b];
            loop {
                let k = cur?;
                let e = &self.entries[k];
                if e.hash == hash && e.key.borrow() == q {
                    let next = e.next;
                    match prev {
                        None => self.buckets[b] = next,
                        Some(p) => self.entries[p].next = next,
                    }
                    break k;
                }
                prev = Some(k);
                cur = e.next;
            }
        };

        // Structure is consistent again; dropping K/V is up to the caller.
        let entry = self.entries.remove(k)?;
        Some((entry.key, entry.value))
    }

    /// Tears the table down.
    ///
    /// Keys are dropped here when `release_keys` is set and handed back in
    /// [`Reclaimed::keys`] otherwise; values likewise with `release_values`.
    pub fn destroy(mut self, release_keys: bool, release_values: bool) -> Reclaimed<K, V> {
        let len = self.entries.len();
        let mut reclaimed = Reclaimed {
            keys: Vec::with_capacity(if release_keys { 0 } else { len }),
            values: Vec::with_capacity(if release_values { 0 } else { len }),
        };

        for head in mem::take(&mut self.buckets) {
            let mut cur = head;
            while let Some(k) = cur {
                let Entry {
                    key, value, next, ..
                } = self
                    .entries
                    .remove(k)
                    .expect("chain link must point at a live entry");
                cur = next;
                if release_keys {
                    drop(key);
                } else {
                    reclaimed.keys.push(key);
                }
                if release_values {
                    drop(value);
                } else {
                    reclaimed.values.push(value);
                }
            }
        }

        trace!(
            len,
            released_keys = if release_keys { len } else { 0 },
            released_values = if release_values { len } else { 0 },
            reclaimed_keys = reclaimed.keys.len(),
            reclaimed_values = reclaimed.values.len(),
            "destroyed chain table"
        );
        reclaimed
    }

    /// Drops every entry; the bucket count is kept.
    pub fn clear(&mut self) {
        self.buckets.fill(None);
        self.entries.clear();
    }

    /// Length of each bucket's chain, in bucket order.
    pub fn chain_lengths(&self) -> Vec<usize> {
        self.buckets
            .iter()
            .map(|&head| {
                let mut n = 0;
                let mut cur = head;
                while let Some(k) = cur {
                    n += 1;
                    cur = self.entries[k].next;
                }
                n
            })
            .collect()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.entries.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.entries.iter_mut(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> Extend<(K, V)> for ChainTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            let _ = self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChainTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::default();
        table.extend(iter);
        table
    }
}

impl<K, V, S> fmt::Debug for ChainTable<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.values().map(|e| (&e.key, &e.value)))
            .finish()
    }
}
