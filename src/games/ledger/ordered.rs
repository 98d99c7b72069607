use std::{fmt, hash::Hash, marker::PhantomData};

use indexmap::IndexMap;
use poise::serenity_prelude::{GuildId, UserId};
use serde::{
    de::{IgnoredAny, MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use tracing::warn;

/// A Discord id that can key a JSON object.
pub trait Snowflake: Copy + Eq + Hash {
    fn from_u64(id: u64) -> Option<Self>;
    fn to_u64(self) -> u64;
}

macro_rules! snowflakes {
    ($($id:ty),+) => {
        $(
            impl Snowflake for $id {
                fn from_u64(id: u64) -> Option<Self> {
                    (id != 0).then(|| <$id>::new(id))
                }

                fn to_u64(self) -> u64 {
                    self.get()
                }
            }
        )+
    };
}

snowflakes!(GuildId, UserId);

/// A JSON object keyed by Discord ids that keeps its keys in the order they
/// were first inserted.
///
/// Keys that aren't ids are dropped on load rather than failing the whole
/// object.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<K: Snowflake, V>(IndexMap<K, V>);

impl<K: Snowflake, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self(IndexMap::new())
    }
}

impl<K: Snowflake, V> OrderedMap<K, V> {
    pub fn get(&self, key: K) -> Option<&V> {
        self.0.get(&key)
    }

    pub fn get_or_insert_with(&mut self, key: K, f: impl FnOnce() -> V) -> &mut V {
        self.0.entry(key).or_insert_with(f)
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    pub(super) fn len(&self) -> usize {
        self.0.len()
    }
}

impl<K: Snowflake, V: Serialize> Serialize for OrderedMap<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;

        for (key, value) in &self.0 {
            map.serialize_entry(&key.to_u64().to_string(), value)?;
        }

        map.end()
    }
}

struct OrderedMapVisitor<K, V>(PhantomData<(K, V)>);

impl<'de, K: Snowflake, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<K, V> {
    type Value = OrderedMap<K, V>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object keyed by discord ids")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = IndexMap::with_capacity(access.size_hint().unwrap_or(0));

        while let Some(key) = access.next_key::<String>()? {
            match key.parse::<u64>().ok().and_then(K::from_u64) {
                Some(id) => {
                    map.insert(id, access.next_value::<V>()?);
                }
                None => {
                    warn!(%key, "skipping leaderboard entry that isn't keyed by an id");
                    access.next_value::<IgnoredAny>()?;
                }
            }
        }

        Ok(OrderedMap(map))
    }
}

impl<'de, K: Snowflake, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<K, V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}
