//! Field-by-field decoding for dashboard configs.
//!
//! A section that is not an object, and any field whose value does not fit,
//! keeps its default. Numbers and booleans sent as strings (`"30"`, `"true"`)
//! are accepted.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::debug;

/// Implements `Deserialize` by starting from `Default` and overwriting each
/// field that decodes. Keys are tried in order; the first present one wins.
macro_rules! lenient_struct {
    ($name:ident { $($field:ident: [$($key:literal),+],)+ }) => {
        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let fields =
                    $crate::banner::lenient::LenientFields::read(deserializer, stringify!($name))?;
                let mut value = Self::default();
                $(fields.apply(&[$($key),+], &mut value.$field);)+
                Ok(value)
            }
        }
    };
}

pub(crate) use lenient_struct;

pub(crate) struct LenientFields {
    section: &'static str,
    fields: Map<String, Value>,
}

impl LenientFields {
    pub(crate) fn read<'de, D>(deserializer: D, section: &'static str) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = match Value::deserialize(deserializer)? {
            Value::Object(fields) => fields,
            Value::Null => Map::new(),
            other => {
                debug!(section, value = %other, "config section is not an object; using defaults");
                Map::new()
            }
        };
        Ok(Self { section, fields })
    }

    pub(crate) fn apply<T: DeserializeOwned>(&self, keys: &[&str], slot: &mut T) {
        let Some((key, raw)) = keys
            .iter()
            .find_map(|key| self.fields.get(*key).map(|raw| (*key, raw)))
        else {
            return;
        };

        match decode(raw) {
            Some(value) => *slot = value,
            None => debug!(
                section = self.section,
                field = key,
                value = %raw,
                "unusable config value; using default"
            ),
        }
    }
}

fn decode<T: DeserializeOwned>(raw: &Value) -> Option<T> {
    if let Ok(value) = T::deserialize(raw) {
        return Some(value);
    }
    let Value::String(text) = raw else {
        return None;
    };
    let scalar = serde_json::from_str::<Value>(text.trim()).ok()?;
    if scalar.is_number() || scalar.is_boolean() {
        T::deserialize(&scalar).ok()
    } else {
        None
    }
}
