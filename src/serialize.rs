//! Contains custom serialization and deserialization functions.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use serde::Deserialize;
use serde::de::{self, MapAccess, SeqAccess, Deserializer, Unexpected, Visitor};

/// Deserializes `0`/`1` (as numbers or strings) or a boolean into a `bool`.
pub fn into_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct DeserializeBoolVisitor;

    impl<'de> de::Visitor<'de> for DeserializeBoolVisitor {
        type Value = bool;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an integer or a string")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(de::Error::invalid_value(
                    Unexpected::Unsigned(other),
                    &"zero or one",
                )),
            }
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(de::Error::invalid_value(
                    Unexpected::Signed(other),
                    &"zero or one",
                )),
            }
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            match v {
                "0" => Ok(false),
                "1" => Ok(true),
                other => Err(de::Error::invalid_value(
                    Unexpected::Str(other),
                    &"zero or one",
                )),
            }
        }

        fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v)
        }
    }

    deserializer.deserialize_any(DeserializeBoolVisitor)
}

/// Deserializes a keyed map. Steam sends an empty array in place of an empty object.
pub fn map_or_empty_seq<'de, D, T>(deserializer: D) -> Result<HashMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    struct MapVisitor<T> {
        marker: PhantomData<T>,
    }

    impl<'de, T> Visitor<'de> for MapVisitor<T>
    where
        T: Deserialize<'de>,
    {
        type Value = HashMap<String, T>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map or seq")
        }

        fn visit_seq<M>(self, mut seq: M) -> Result<Self::Value, M::Error>
        where
            M: SeqAccess<'de>,
        {
            if seq.next_element::<de::IgnoredAny>()?.is_some() {
                return Err(de::Error::invalid_length(1, &"an empty seq"));
            }

            Ok(Self::Value::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Self::Value::new())
        }

        fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut map = Self::Value::with_capacity(access.size_hint().unwrap_or(0));

            while let Some(key) = access.next_key::<String>()? {
                let value = access.next_value::<T>()?;

                map.insert(key, value);
            }

            Ok(map)
        }
    }

    deserializer.deserialize_any(MapVisitor {
        marker: PhantomData,
    })
}

/// Serializes and deserializes numbers as strings.
pub mod string {
    use std::fmt::Display;
    use std::str::FromStr;
    use serde::{de, Serializer, Deserialize, Deserializer};

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Flag {
        #[serde(deserialize_with = "into_bool")]
        value: bool,
    }

    #[derive(Deserialize)]
    struct Keyed {
        #[serde(deserialize_with = "map_or_empty_seq")]
        map: HashMap<String, u32>,
    }

    #[test]
    fn deserializes_bool_from_ints_and_strings() {
        assert!(serde_json::from_str::<Flag>(r#"{"value":1}"#).unwrap().value);
        assert!(!serde_json::from_str::<Flag>(r#"{"value":"0"}"#).unwrap().value);
        assert!(serde_json::from_str::<Flag>(r#"{"value":true}"#).unwrap().value);
        assert!(serde_json::from_str::<Flag>(r#"{"value":5}"#).is_err());
    }

    #[test]
    fn empty_array_is_empty_map() {
        let keyed: Keyed = serde_json::from_str(r#"{"map":[]}"#).unwrap();

        assert!(keyed.map.is_empty());

        let keyed: Keyed = serde_json::from_str(r#"{"map":{"a":1}}"#).unwrap();

        assert_eq!(keyed.map.get("a"), Some(&1));
        assert!(serde_json::from_str::<Keyed>(r#"{"map":[1]}"#).is_err());
    }
}
