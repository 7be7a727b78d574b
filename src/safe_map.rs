//! SafeMap: public API over the ordinary store and the reserved-key slot.

use crate::error::Error;
use crate::key_store::{self, KeyStore};
use crate::sentinel::{is_reserved, Sentinel, RESERVED_KEY};
use core::fmt;
use core::hash::BuildHasher;
use core::iter::FusedIterator;
use std::collections::hash_map::RandomState;

/// A string-keyed map with a guarded reserved key and strict variants of
/// get, set and remove.
///
/// Every operation first checks whether the key is [`RESERVED_KEY`]; if
/// so it is served from a dedicated slot and never touches the ordinary
/// store. Iteration yields the reserved entry first (when set), followed
/// by the ordinary entries in insertion order.
///
/// ```
/// use safemap::{Error, SafeMap};
///
/// let mut m = SafeMap::new();
/// m.set("foo", "bar");
/// assert_eq!(m.len(), 1);
/// assert!(matches!(m.safe_set("foo", "baz"), Err(Error::KeyExists { .. })));
/// assert_eq!(m.get("foo"), Some(&"bar"));
/// m.safe_remove("foo").unwrap();
/// assert!(matches!(m.safe_get("foo"), Err(Error::NoValue { .. })));
/// ```
#[derive(Clone)]
pub struct SafeMap<V, S = RandomState> {
    store: KeyStore<V, S>,
    sentinel: Sentinel<V>,
}

impl<V> SafeMap<V> {
    pub fn new() -> Self {
        Self {
            store: KeyStore::new(),
            sentinel: Sentinel::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl<V> Default for SafeMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S> SafeMap<V, S>
where
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(0, hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            store: KeyStore::with_capacity_and_hasher(capacity, hasher),
            sentinel: Sentinel::new(),
        }
    }

    /// Build a map seeded with `entries`.
    ///
    /// Values are moved in; the source is not referenced afterwards. The
    /// reserved key is routed like [`set`](Self::set), and a repeated key
    /// keeps its last value.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        S: Default,
    {
        let mut m = Self::with_hasher(S::default());
        m.extend(entries);
        m
    }

    pub fn hasher(&self) -> &S {
        self.store.hasher()
    }

    /// Returns true if `key` holds a value.
    pub fn has(&self, key: &str) -> bool {
        if is_reserved(key) {
            return self.sentinel.is_set();
        }
        self.store.contains_key(key)
    }

    /// Returns the value for `key`, or `None` when absent.
    pub fn get(&self, key: &str) -> Option<&V> {
        if is_reserved(key) {
            return self.sentinel.get();
        }
        self.store.get(key)
    }

    /// Returns the value for `key`, or `default` when absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        if is_reserved(key) {
            return self.sentinel.get_mut();
        }
        self.store.get_mut(key)
    }

    /// Associates `value` with `key`, replacing any former value, which is
    /// returned.
    pub fn set(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        if is_reserved(&key) {
            return self.sentinel.set(value);
        }
        self.store.insert(key, value)
    }

    /// Removes `key`, returning its value. Absent keys are a no-op.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        if is_reserved(key) {
            return self.sentinel.take();
        }
        self.store.remove(key)
    }

    /// Removes every entry, the reserved one included.
    pub fn clear(&mut self) {
        let dropped = self.store.clear() + usize::from(self.sentinel.take().is_some());
        tracing::trace!(dropped, "cleared safe map");
    }

    /// Number of keys for which [`has`](Self::has) returns true.
    pub fn len(&self) -> usize {
        self.store.len() + usize::from(self.sentinel.is_set())
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty() && !self.sentinel.is_set()
    }

    /// Like [`get`](Self::get), but an absent key is an error.
    pub fn safe_get(&self, key: &str) -> Result<&V, Error> {
        self.get(key).ok_or_else(|| {
            rejected(Error::NoValue {
                key: key.to_owned(),
            })
        })
    }

    /// Like [`set`](Self::set), but a present key is an error and keeps
    /// its value.
    pub fn safe_set(&mut self, key: impl Into<String>, value: V) -> Result<(), Error> {
        let key = key.into();
        if is_reserved(&key) {
            if self.sentinel.is_set() {
                return Err(rejected(Error::KeyExists { key }));
            }
            self.sentinel.set(value);
            return Ok(());
        }
        self.store
            .try_insert(key, value)
            .map_err(|occupied| rejected(Error::KeyExists { key: occupied.key }))
    }

    /// Like [`remove`](Self::remove), but an absent key is an error.
    pub fn safe_remove(&mut self, key: &str) -> Result<V, Error> {
        self.remove(key).ok_or_else(|| {
            rejected(Error::NoValue {
                key: key.to_owned(),
            })
        })
    }
}

impl<V, S> SafeMap<V, S> {
    /// Calls `f` for every entry: the reserved entry first if present, then
    /// ordinary entries in insertion order.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&str, &V),
    {
        for (k, v) in self.iter() {
            f(k, v);
        }
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            reserved: self.sentinel.get(),
            rest: self.store.iter(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }
}

fn rejected(err: Error) -> Error {
    tracing::trace!(key = err.key(), %err, "strict operation rejected");
    err
}

impl<V: fmt::Debug, S> fmt::Debug for SafeMap<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Equal when both hold the same keys with equal values; order is ignored.
impl<V, S> PartialEq for SafeMap<V, S>
where
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<V: Eq, S: BuildHasher> Eq for SafeMap<V, S> {}

impl<K, V, S> Extend<(K, V)> for SafeMap<V, S>
where
    K: Into<String>,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for SafeMap<V, S>
where
    K: Into<String>,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_entries(iter)
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for SafeMap<V>
where
    K: Into<String>,
{
    fn from(arr: [(K, V); N]) -> Self {
        let mut m = Self::with_capacity(N);
        m.extend(arr);
        m
    }
}

impl<'a, V, S> IntoIterator for &'a SafeMap<V, S> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}

impl<V, S> IntoIterator for SafeMap<V, S> {
    type Item = (String, V);
    type IntoIter = IntoIter<V>;

    fn into_iter(mut self) -> IntoIter<V> {
        IntoIter {
            reserved: self.sentinel.take(),
            rest: self.store.into_iter(),
        }
    }
}

/// Borrowing iterator: reserved entry first, then insertion order.
pub struct Iter<'a, V> {
    reserved: Option<&'a V>,
    rest: key_store::Iter<'a, V>,
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Iter {
            reserved: self.reserved,
            rest: self.rest.clone(),
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if let Some(v) = self.reserved.take() {
            return Some((RESERVED_KEY, v));
        }
        self.rest.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.rest.len() + usize::from(self.reserved.is_some());
        (n, Some(n))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}
impl<V> FusedIterator for Iter<'_, V> {}

/// Owning iterator: reserved entry first, then insertion order.
pub struct IntoIter<V> {
    reserved: Option<V>,
    rest: key_store::IntoIter<V>,
}

impl<V> Iterator for IntoIter<V> {
    type Item = (String, V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(v) = self.reserved.take() {
            return Some((RESERVED_KEY.to_owned(), v));
        }
        self.rest.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.rest.len() + usize::from(self.reserved.is_some());
        (n, Some(n))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}
impl<V> FusedIterator for IntoIter<V> {}
