//! Field-level serde adapters for service records.

use serde::{Deserialize, Deserializer};

/// Decodes `null` as the type's default.
///
/// The services marshal empty slices, maps, and strings as `null`; with
/// `#[serde(default)]` alone only a missing field falls back.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Record {
        #[serde(deserialize_with = "null_as_default")]
        ports: Vec<String>,
        #[serde(deserialize_with = "null_as_default")]
        labels: BTreeMap<String, String>,
        #[serde(deserialize_with = "null_as_default")]
        name: String,
    }

    #[test]
    fn null_falls_back_to_default() {
        let record: Record = serde_json::from_str(r#"{"ports":null,"labels":null,"name":null}"#).expect("decode");
        assert!(record.ports.is_empty());
        assert!(record.labels.is_empty());
        assert!(record.name.is_empty());
    }

    #[test]
    fn values_and_missing_fields_still_decode() {
        let record: Record = serde_json::from_str(r#"{"ports":["80"]}"#).expect("decode");
        assert_eq!(record.ports, ["80"]);
        assert!(record.name.is_empty());
    }

    #[test]
    fn wrong_type_is_still_rejected() {
        assert!(serde_json::from_str::<Record>(r#"{"ports":"80"}"#).is_err());
    }
}
