//! Request payload validation
//!
//! Payloads are checked in two steps before a handler runs:
//! 1. the body must be JSON and contain the required keys ([`Require`]),
//! 2. the body must deserialize into the typed payload.
//!
//! Domain rules (lengths, date formats) are checked when the typed payload is
//! turned into a stored record.

pub mod extractor;

pub use extractor::ValidJson;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// How the required key list of a payload is combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Require {
    /// Every listed key must be present
    All,
    /// At least one listed key must be present
    Any,
}

impl Require {
    /// Evaluate the combinator over key presence in `body`
    ///
    /// A key set to `null` counts as present. A body that is not an object
    /// has no keys.
    pub fn check(self, body: &Value, fields: &[&str]) -> bool {
        let Some(object) = body.as_object() else {
            return false;
        };
        match self {
            Require::All => fields.iter().all(|f| object.contains_key(*f)),
            Require::Any => fields.iter().any(|f| object.contains_key(*f)),
        }
    }

    /// Describe the failed check for the error detail
    pub fn describe(self, fields: &[&str]) -> String {
        match self {
            Require::All => format!("missing required fields, expected all of: {}", fields.join(", ")),
            Require::Any => format!("missing fields, expected at least one of: {}", fields.join(", ")),
        }
    }
}

/// A typed request body with its required keys
pub trait Payload: DeserializeOwned + Send {
    /// Keys checked for presence before deserializing
    const FIELDS: &'static [&'static str];

    /// How [`Payload::FIELDS`] is combined
    const REQUIRE: Require;
}
