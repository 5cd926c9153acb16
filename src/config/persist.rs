//! JSON persistence of the step configuration.
//!
//! The host stores the step's state as an opaque string. We write a JSON
//! object with exactly the recognized keys, sorted, indented by four spaces.
//! Loading overlays the stored keys onto an existing configuration so keys
//! missing from older files keep their current (default) value.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::domain::{ConfigKey, Configuration};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("invalid step configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("step configuration must be a JSON object")]
    NotAnObject,

    #[error("configuration value for `{key}` must be a string")]
    NonString { key: ConfigKey },
}

/// Serialize every key as a sorted JSON object.
pub fn to_json(config: &Configuration) -> Result<String, PersistError> {
    let map: BTreeMap<&str, &str> = config.iter().map(|(k, v)| (k.as_str(), v)).collect();

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    map.serialize(&mut ser)?;
    // serde_json only ever writes valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Overlay the keys stored in `text` onto `config`.
///
/// Unknown keys are skipped with a warning. Nothing is applied if any
/// recognized value is malformed.
pub fn overlay_json(config: &mut Configuration, text: &str) -> Result<(), PersistError> {
    let Value::Object(object) = serde_json::from_str::<Value>(text)? else {
        return Err(PersistError::NotAnObject);
    };

    let mut updates = Vec::with_capacity(object.len());
    for (name, value) in object {
        let Ok(key) = name.parse::<ConfigKey>() else {
            warn!(key = %name, "ignoring unknown configuration key");
            continue;
        };
        match value {
            Value::String(s) => updates.push((key, s)),
            _ => return Err(PersistError::NonString { key }),
        }
    }

    for (key, value) in updates {
        config.set(key, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults;

    #[test]
    fn writes_sorted_keys_with_four_space_indent() {
        let text = to_json(&defaults()).unwrap();
        assert!(text.starts_with("{\n    \"GUI\": \"True\",\n"));
        let gui = text.find("\"GUI\"").unwrap();
        let xtol = text.find("\"xtol\"").unwrap();
        assert!(gui < xtol);
    }

    #[test]
    fn round_trip_preserves_values() {
        let mut config = defaults();
        config.set(ConfigKey::Identifier, "femur-fit");
        config.set(ConfigKey::FixedNodes, "1,5-7");
        let text = to_json(&config).unwrap();

        let mut loaded = defaults();
        overlay_json(&mut loaded, &text).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_keys_keep_defaults() {
        let mut config = defaults();
        overlay_json(&mut config, r#"{"identifier": "a", "legacy": "x"}"#).unwrap();
        assert_eq!(config.identifier(), "a");
        assert_eq!(config.get(ConfigKey::Xtol), "1e-6");
    }

    #[test]
    fn rejects_non_string_values_without_partial_update() {
        let mut config = defaults();
        let err = overlay_json(&mut config, r#"{"identifier": "a", "xtol": 1e-6}"#).unwrap_err();
        assert!(matches!(err, PersistError::NonString { key: ConfigKey::Xtol }));
        assert_eq!(config, defaults());

        assert!(matches!(overlay_json(&mut config, "[]"), Err(PersistError::NotAnObject)));
        assert!(matches!(overlay_json(&mut config, "{"), Err(PersistError::Json(_))));
    }
}
