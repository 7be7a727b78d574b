//! KeyStore: structural layer holding the ordinary (non-reserved) entries.
//!
//! Entries live in a generational slot arena, are indexed by a hash table
//! keyed on the precomputed hash of the key, and are threaded on a
//! doubly-linked list so that iteration follows insertion order. An
//! overwrite keeps the entry in place; a removal unlinks it in O(1).

use core::fmt;
use core::hash::BuildHasher;
use core::iter::FusedIterator;
use hashbrown::hash_table::Entry as TableEntry;
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;

#[derive(Clone, Debug)]
struct Entry<V> {
    key: String,
    value: V,
    hash: u64,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

/// Returned by `try_insert` when the key is already present. Hands the
/// rejected key back to the caller; the rejected value is dropped.
#[derive(Debug)]
pub(crate) struct Occupied {
    pub(crate) key: String,
}

#[derive(Clone)]
pub(crate) struct KeyStore<V, S = RandomState> {
    hasher: S,
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Entry<V>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl<V> KeyStore<V> {
    pub(crate) fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }
}

impl<V> Default for KeyStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S> KeyStore<V, S>
where
    S: BuildHasher,
{
    pub(crate) fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(0, hasher)
    }

    pub(crate) fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            hasher,
            index: HashTable::with_capacity(capacity),
            slots: SlotMap::with_capacity_and_key(capacity),
            head: None,
            tail: None,
        }
    }

    pub(crate) fn hasher(&self) -> &S {
        &self.hasher
    }

    fn make_hash(&self, key: &str) -> u64 {
        self.hasher.hash_one(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn find(&self, key: &str) -> Option<DefaultKey> {
        let hash = self.make_hash(key);
        self.index
            .find(hash, |&k| {
                self.slots
                    .get(k)
                    .map(|e| e.key == key)
                    .unwrap_or(false)
            })
            .copied()
    }

    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    pub(crate) fn get(&self, key: &str) -> Option<&V> {
        let k = self.find(key)?;
        self.slots.get(k).map(|e| &e.value)
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let k = self.find(key)?;
        self.slots.get_mut(k).map(|e| &mut e.value)
    }

    /// Insert or overwrite. Returns the previous value when the key was
    /// already present; its position in iteration order is unchanged.
    pub(crate) fn insert(&mut self, key: String, value: V) -> Option<V> {
        let hash = self.make_hash(&key);
        match self.index.entry(
            hash,
            |&kk| {
                self.slots
                    .get(kk)
                    .map(|e| e.key == key)
                    .unwrap_or(false)
            },
            |&kk| self.slots.get(kk).map(|e| e.hash).unwrap_or(0),
        ) {
            TableEntry::Occupied(o) => {
                let k = *o.get();
                let slot = &mut self.slots[k];
                Some(core::mem::replace(&mut slot.value, value))
            }
            TableEntry::Vacant(v) => {
                let k = self.slots.insert(Entry {
                    key,
                    value,
                    hash,
                    prev: self.tail,
                    next: None,
                });
                let _ = v.insert(k);
                self.link_back(k);
                None
            }
        }
    }

    /// Insert only if absent. A present key leaves the stored value
    /// untouched and hands the key back.
    pub(crate) fn try_insert(&mut self, key: String, value: V) -> Result<(), Occupied> {
        let hash = self.make_hash(&key);
        match self.index.entry(
            hash,
            |&kk| {
                self.slots
                    .get(kk)
                    .map(|e| e.key == key)
                    .unwrap_or(false)
            },
            |&kk| self.slots.get(kk).map(|e| e.hash).unwrap_or(0),
        ) {
            TableEntry::Occupied(_) => Err(Occupied { key }),
            TableEntry::Vacant(v) => {
                let k = self.slots.insert(Entry {
                    key,
                    value,
                    hash,
                    prev: self.tail,
                    next: None,
                });
                let _ = v.insert(k);
                self.link_back(k);
                Ok(())
            }
        }
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<V> {
        let hash = self.make_hash(key);
        let k = match self.index.find_entry(hash, |&kk| {
            self.slots
                .get(kk)
                .map(|e| e.key == key)
                .unwrap_or(false)
        }) {
            Ok(o) => o.remove().0,
            Err(_) => return None,
        };

        let entry = self.slots.remove(k)?;
        self.unlink(entry.prev, entry.next);
        Some(entry.value)
    }

    /// Drop every entry. Returns how many were removed.
    pub(crate) fn clear(&mut self) -> usize {
        let n = self.slots.len();
        self.index.clear();
        self.slots.clear();
        self.head = None;
        self.tail = None;
        n
    }

    // `k` was just inserted with `prev == self.tail`.
    fn link_back(&mut self, k: DefaultKey) {
        match self.tail {
            Some(t) => self.slots[t].next = Some(k),
            None => self.head = Some(k),
        }
        self.tail = Some(k);
    }

    fn unlink(&mut self, prev: Option<DefaultKey>, next: Option<DefaultKey>) {
        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }
    }
}

impl<V, S> KeyStore<V, S> {
    pub(crate) fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: &self.slots,
            next: self.head,
            remaining: self.slots.len(),
        }
    }
}

impl<V, S> IntoIterator for KeyStore<V, S> {
    type Item = (String, V);
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> IntoIter<V> {
        IntoIter {
            next: self.head,
            slots: self.slots,
        }
    }
}

impl<V: fmt::Debug, S> fmt::Debug for KeyStore<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Borrowing iterator over store entries in insertion order.
pub(crate) struct Iter<'a, V> {
    slots: &'a SlotMap<DefaultKey, Entry<V>>,
    next: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, V> Clone for Iter<'a, V> {
    fn clone(&self) -> Self {
        Iter {
            slots: self.slots,
            next: self.next,
            remaining: self.remaining,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let e = self.slots.get(self.next?)?;
        self.next = e.next;
        self.remaining -= 1;
        Some((e.key.as_str(), &e.value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}
impl<V> FusedIterator for Iter<'_, V> {}

/// Owning iterator over store entries in insertion order.
pub(crate) struct IntoIter<V> {
    slots: SlotMap<DefaultKey, Entry<V>>,
    next: Option<DefaultKey>,
}

impl<V> Iterator for IntoIter<V> {
    type Item = (String, V);

    fn next(&mut self) -> Option<Self::Item> {
        let e = self.slots.remove(self.next?)?;
        self.next = e.next;
        Some((e.key, e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.slots.len(), Some(self.slots.len()))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}
impl<V> FusedIterator for IntoIter<V> {}
