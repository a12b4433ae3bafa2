//! Value-keyed counters, sets and maps over composite keys
//!
//! Samples and patients are identified by a pair of ids (study and case).
//! The containers in this module accept any key that implements
//! [`Hash`] and [`Eq`], so two keys are identical whenever all their
//! fields are identical, independent of where the key was constructed.
//!
//! All operations are backed by hash maps and run in expected `O(1)`.
//! None of the containers guarantee an iteration order.
use std::collections::hash_map;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Counts how often each key was seen
///
/// # Examples
///
/// ```
/// use groupcomp::keyed::KeyedCounter;
/// use groupcomp::SampleIdentifier;
///
/// let mut counter = KeyedCounter::new();
/// counter.increment(SampleIdentifier::new("study", "s1"));
/// counter.increment(SampleIdentifier::new("study", "s1"));
/// counter.increment(SampleIdentifier::new("study", "s2"));
///
/// assert_eq!(counter.get(&SampleIdentifier::new("study", "s1")), 2);
/// assert_eq!(counter.get(&SampleIdentifier::new("study", "s3")), 0);
/// ```
#[derive(Debug, Clone)]
pub struct KeyedCounter<K> {
    counts: HashMap<K, u64>,
}

impl<K> Default for KeyedCounter<K> {
    fn default() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq> KeyedCounter<K> {
    /// Constructs a new, empty [`KeyedCounter`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increases the count of `key` by one and returns the new count
    pub fn increment(&mut self, key: K) -> u64 {
        let count = self.counts.entry(key).or_insert(0);
        *count += 1;
        *count
    }

    /// Increases the count of `key` by `n` and returns the new count
    pub fn add(&mut self, key: K, n: u64) -> u64 {
        let count = self.counts.entry(key).or_insert(0);
        *count += n;
        *count
    }

    /// Returns the count of `key`, `0` if it was never seen
    pub fn get(&self, key: &K) -> u64 {
        self.counts.get(key).copied().unwrap_or_default()
    }

    /// Returns the number of distinct keys
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns `true` if no key was counted yet
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterates all keys and their counts
    pub fn entries(&self) -> hash_map::Iter<'_, K, u64> {
        self.counts.iter()
    }

    /// Iterates all keys that were counted at least `min` times
    pub fn at_least(&self, min: u64) -> impl Iterator<Item = &K> + '_ {
        self.counts
            .iter()
            .filter(move |(_, count)| **count >= min)
            .map(|(key, _)| key)
    }
}

/// A set of composite keys
#[derive(Debug, Clone)]
pub struct KeyedSet<K> {
    keys: HashSet<K>,
}

impl<K> Default for KeyedSet<K> {
    fn default() -> Self {
        Self {
            keys: HashSet::new(),
        }
    }
}

impl<K: Hash + Eq> KeyedSet<K> {
    /// Constructs a new, empty [`KeyedSet`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `key` to the set
    ///
    /// Returns whether the key was newly inserted.
    pub fn add(&mut self, key: K) -> bool {
        self.keys.insert(key)
    }

    /// Returns `true` if the set contains `key`
    pub fn has(&self, key: &K) -> bool {
        self.keys.contains(key)
    }

    /// Returns the number of keys in the set
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if the set contains no keys
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterates the keys of the set
    pub fn keys(&self) -> std::collections::hash_set::Iter<'_, K> {
        self.keys.iter()
    }
}

impl<K: Hash + Eq> FromIterator<K> for KeyedSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl<K: Hash + Eq> Extend<K> for KeyedSet<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        self.keys.extend(iter);
    }
}

impl<'a, K> IntoIterator for &'a KeyedSet<K> {
    type Item = &'a K;
    type IntoIter = std::collections::hash_set::Iter<'a, K>;
    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

/// Maps a composite key to a single value
#[derive(Debug, Clone)]
pub struct KeyedMap<K, V> {
    inner: HashMap<K, V>,
}

impl<K, V> Default for KeyedMap<K, V> {
    fn default() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq, V> KeyedMap<K, V> {
    /// Constructs a new, empty [`KeyedMap`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` for `key`, returning the previous value
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        self.inner.insert(key, value)
    }

    /// Returns the value of `key`
    pub fn get(&self, key: &K) -> Option<&V> {
        self.inner.get(key)
    }

    /// Returns `true` if the map contains `key`
    pub fn has(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    /// Returns the number of entries
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the map has no entries
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates all entries
    pub fn entries(&self) -> hash_map::Iter<'_, K, V> {
        self.inner.iter()
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for KeyedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

/// Collects values into one list per composite key
///
/// Lists keep the insertion order of their values. The order of
/// the keys themselves is not defined.
#[derive(Debug, Clone)]
pub struct KeyedGroups<K, V> {
    groups: HashMap<K, Vec<V>>,
}

impl<K, V> Default for KeyedGroups<K, V> {
    fn default() -> Self {
        Self {
            groups: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq, V> KeyedGroups<K, V> {
    /// Constructs a new, empty [`KeyedGroups`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` to the list of `key`
    pub fn add(&mut self, key: K, value: V) {
        self.groups.entry(key).or_default().push(value);
    }

    /// Returns the values collected for `key`
    pub fn get(&self, key: &K) -> Option<&[V]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    /// Returns the number of distinct keys
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if nothing was added yet
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterates every key with its list of values
    pub fn entries(&self) -> hash_map::Iter<'_, K, Vec<V>> {
        self.groups.iter()
    }

    /// Consumes the groups and returns the owned entries
    pub fn into_entries(self) -> hash_map::IntoIter<K, Vec<V>> {
        self.groups.into_iter()
    }
}
