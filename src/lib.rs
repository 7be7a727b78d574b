//! safemap: a string-keyed map that stays correct for every key string,
//! including the names that break object-based dictionaries.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: ordinary dictionary semantics (has, get with default, set,
//!   remove, clear, size, iteration) plus strict variants that fail
//!   instead of silently doing nothing.
//! - Layers:
//!   - KeyStore<V, S>: structural store for ordinary keys. Generational
//!     slots (`slotmap`) indexed by a `hashbrown::HashTable` on a
//!     precomputed hash, threaded in insertion order.
//!   - Sentinel<V>: the dedicated slot for the reserved key
//!     (`"__proto__"`), which never enters the store.
//!   - SafeMap<V, S>: public API. Every operation checks the reserved
//!     key first and routes it to the sentinel.
//!
//! Key hazards
//! - Reserved key: prototype-based hosts alias `"__proto__"` to shared
//!   ancestor state. Here it is an ordinary key from the caller's point
//!   of view but lives in its own slot, and iteration reports it first.
//! - Inherited names: keys such as `"hasOwnProperty"` or `"constructor"`
//!   are plain entries. Presence is only ever tested against stored
//!   entries, never anything inherited.
//!
//! Strict vs permissive
//! - `get`/`set`/`remove` never fail: missing keys yield `None`, present
//!   keys are overwritten, absent removals are no-ops.
//! - `safe_get`/`safe_remove` fail with [`Error::NoValue`] on an absent
//!   key; `safe_set` fails with [`Error::KeyExists`] on a present key and
//!   leaves the stored value untouched.
//! - The two families share state; there is no mode flag.
//!
//! Iteration order
//! - Reserved entry first when set, then ordinary entries in insertion
//!   order. Overwriting a key keeps its position; removing and
//!   re-inserting moves it to the back.
//!
//! Notes and non-goals
//! - Single-threaded by usage, not by type: mutation takes `&mut self`,
//!   so sharing across threads needs an external lock.
//! - Keys are `String`; there is no generic key type.
//! - `clear()` leaves the map indistinguishable from a new one, reserved
//!   slot included.
//! - A non-callable `for_each` callback cannot be expressed: the
//!   `FnMut(&str, &V)` bound rejects it at compile time.
//! - Strict-operation rejections emit `tracing` events at trace level.

mod error;
mod key_store;
#[cfg(test)]
mod key_store_proptest;
mod safe_map;
mod sentinel;
#[cfg(feature = "serde")]
mod serde_impl;

// Public surface
pub use error::Error;
pub use safe_map::{IntoIter, Iter, SafeMap};
pub use sentinel::{is_reserved, RESERVED_KEY};
