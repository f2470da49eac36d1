//! Data Transfer Objects
//!
//! Wire shapes for the HTTP API. Request DTOs carry `validator` rules with the
//! user-facing (Spanish) messages; response DTOs are produced by
//! [`crate::application::mapping`].
//!
//! Snowflake IDs are serialized as strings in responses. Requests accept either
//! a string or a JSON number.

pub mod request;
pub mod response;

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

struct IdVisitor;

impl<'de> Visitor<'de> for IdVisitor {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an id as a string or integer")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        i64::try_from(v).map_err(|_| E::custom("id out of range"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
        crate::shared::snowflake::from_string(v).map_err(|_| E::custom("invalid id"))
    }
}

/// Deserialize a required ID from a string or number.
pub fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    deserializer.deserialize_any(IdVisitor)
}

/// Deserialize an optional ID; `null` and absent both yield `None`.
pub fn de_opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "de_id")] i64);

    Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(id)| id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Body {
        #[serde(deserialize_with = "de_id")]
        id: i64,
        #[serde(default, deserialize_with = "de_opt_id")]
        other: Option<i64>,
    }

    #[test]
    fn test_id_from_string_and_number() {
        let a: Body = serde_json::from_str(r#"{"id": "123"}"#).unwrap();
        let b: Body = serde_json::from_str(r#"{"id": 123, "other": "9"}"#).unwrap();
        assert_eq!(a.id, 123);
        assert_eq!(a.other, None);
        assert_eq!(b.id, 123);
        assert_eq!(b.other, Some(9));
    }

    #[test]
    fn test_null_optional_id() {
        let body: Body = serde_json::from_str(r#"{"id": 1, "other": null}"#).unwrap();
        assert_eq!(body.other, None);
    }

    #[test]
    fn test_invalid_id_rejected() {
        assert!(serde_json::from_str::<Body>(r#"{"id": "abc"}"#).is_err());
    }
}
