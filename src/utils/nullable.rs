// src/utils/nullable.rs

use serde::{Deserialize, Deserializer};

/// Deserializes a field where an explicit `null` differs from an absent key.
///
/// Pair with `#[serde(default)]`: absent gives `None`, `null` gives
/// `Some(None)`, and a value gives `Some(Some(value))`.
pub fn deserialize_nullable<'de, T, D>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}
