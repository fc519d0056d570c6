//! Partial-update field values

use serde::{Deserialize, Deserializer};

/// One field of a PATCH payload
///
/// Distinguishes a key that was left out from a key sent as `null`, which
/// `Option<T>` cannot. Use with `#[serde(default)]` on the containing struct
/// field so a missing key becomes [`Field::Absent`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Field<T> {
    /// Key not present: keep the stored value
    #[default]
    Absent,
    /// Key present with `null`
    Null,
    /// Key present with a value
    Value(T),
}

impl<T> Field<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    /// Map the contained value, keeping `Absent`/`Null`
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Field::Absent => Field::Absent,
            Field::Null => Field::Null,
            Field::Value(v) => Field::Value(f(v)),
        }
    }

    /// Apply to a nullable stored value
    pub fn apply_nullable(self, current: Option<T>) -> Option<T> {
        match self {
            Field::Absent => current,
            Field::Null => None,
            Field::Value(v) => Some(v),
        }
    }

    /// Apply to a non-nullable stored value; `Null` is rejected with `Err(())`
    pub fn apply_required(self, current: T) -> Result<T, ()> {
        match self {
            Field::Absent => Ok(current),
            Field::Null => Err(()),
            Field::Value(v) => Ok(v),
        }
    }
}

impl<'de, T> Deserialize<'de> for Field<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Field::Value(value),
            None => Field::Null,
        })
    }
}
