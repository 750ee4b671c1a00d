use core::fmt;
use core::hash::BuildHasher;
use core::marker::PhantomData;

use alloc::string::String;

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{CaseInsensitiveMap, Key};

impl Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Key::Int(i) => serializer.serialize_i64(*i),
            Key::Str(s) => serializer.serialize_str(s),
        }
    }
}

struct KeyVisitor;

impl Visitor<'_> for KeyVisitor {
    type Value = Key;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an integer or string key")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Key, E> {
        Ok(Key::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Key, E> {
        Key::try_from(v).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Key, E> {
        Ok(Key::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Key, E> {
        Ok(Key::from(v))
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(KeyVisitor)
    }
}

/// Serialized as a map of display keys to values, in insertion order.
impl<V, H> Serialize for CaseInsensitiveMap<V, H>
where
    V: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut ser_map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self {
            ser_map.serialize_entry(k, v)?;
        }
        ser_map.end()
    }
}

struct MapVisitor<V, H>(PhantomData<(V, H)>);

impl<'de, V, H> Visitor<'de> for MapVisitor<V, H>
where
    V: Deserialize<'de>,
    H: Default + BuildHasher,
{
    type Value = CaseInsensitiveMap<V, H>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map with integer or string keys")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = CaseInsensitiveMap::with_capacity_and_hasher(
            access.size_hint().unwrap_or(0),
            H::default(),
        );

        // duplicates collapse exactly as repeated inserts do
        while let Some((k, v)) = access.next_entry::<Key, V>()? {
            map.insert(k, v);
        }

        Ok(map)
    }
}

impl<'de, V, H> Deserialize<'de> for CaseInsensitiveMap<V, H>
where
    V: Deserialize<'de>,
    H: Default + BuildHasher,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(MapVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use crate::{CaseInsensitiveMap, Key};

    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn test_serialize_keeps_order_and_display_keys() {
        let mut map = CaseInsensitiveMap::new();
        map.insert("Content-Type", "text/html");
        map.push("first").unwrap();
        map.insert("CONTENT-type", "application/json");

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"CONTENT-type":"application/json","0":"first"}"#);
    }

    #[test]
    fn test_deserialize_collapses_case_duplicates() {
        let map: CaseInsensitiveMap<String> =
            serde_json::from_str(r#"{"Foo":"Foo","FOO":"FooBar","foo":"Bar","42":"answer"}"#).unwrap();

        assert_eq!(map.len(), 2);
        let items: Vec<_> = map.iter().map(|(k, v)| (k.clone(), v.as_str())).collect();
        assert_eq!(items, vec![(Key::from("foo"), "Bar"), (Key::Int(42), "answer")]);
        assert_eq!(map.next_index(), Some(43));
    }

    #[test]
    fn test_key_deserialize_rejects_out_of_range() {
        assert_eq!(serde_json::from_str::<Key>("-3").unwrap(), Key::Int(-3));
        assert_eq!(serde_json::from_str::<Key>(r#""Abc""#).unwrap(), Key::from("Abc"));
        assert!(serde_json::from_str::<Key>("18446744073709551615").is_err());
        assert!(serde_json::from_str::<Key>("1.5").is_err());
    }
}
