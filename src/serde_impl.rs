//! Serialize as a plain string-keyed map; deserialize through `set`.

use crate::SafeMap;
use core::fmt;
use core::hash::BuildHasher;
use core::marker::PhantomData;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, Serializer};

// Cap on pre-allocation driven by untrusted size hints.
const MAX_PREALLOC: usize = 4096;

impl<V, S> Serialize for SafeMap<V, S>
where
    V: Serialize,
{
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

struct SafeMapVisitor<V, S> {
    _pd: PhantomData<fn() -> SafeMap<V, S>>,
}

impl<'de, V, S> Visitor<'de> for SafeMapVisitor<V, S>
where
    V: Deserialize<'de>,
    S: BuildHasher + Default,
{
    type Value = SafeMap<V, S>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map with string keys")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let cap = access.size_hint().unwrap_or(0).min(MAX_PREALLOC);
        let mut m = SafeMap::with_capacity_and_hasher(cap, S::default());
        while let Some((k, v)) = access.next_entry::<String, V>()? {
            m.set(k, v);
        }
        Ok(m)
    }
}

impl<'de, V, S> Deserialize<'de> for SafeMap<V, S>
where
    V: Deserialize<'de>,
    S: BuildHasher + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(SafeMapVisitor { _pd: PhantomData })
    }
}
