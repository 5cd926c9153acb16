//! Step configuration files on disk.
//!
//! Same JSON layout the step hands to its host. Reading starts from the
//! defaults so older files missing newer keys still load.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::config::{defaults, persist};
use crate::domain::Configuration;
use crate::error::AppError;

pub fn read_config_json(path: &Path) -> Result<Configuration, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to read config '{}': {e}", path.display())))?;

    let mut config = defaults();
    persist::overlay_json(&mut config, &text)
        .map_err(|e| AppError::new(3, format!("{}: {e}", path.display())))?;
    Ok(config)
}

pub fn write_config_json(path: &Path, config: &Configuration) -> Result<(), AppError> {
    let text = persist::to_json(config).map_err(|e| AppError::new(3, e.to_string()))?;
    fs::write(path, text)
        .map_err(|e| AppError::new(2, format!("Failed to write config '{}': {e}", path.display())))?;
    info!(path = %path.display(), "wrote configuration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConfigKey;

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("step.json");

        let mut config = defaults();
        config.set(ConfigKey::Identifier, "femur");
        write_config_json(&path, &config).unwrap();

        assert_eq!(read_config_json(&path).unwrap(), config);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.json");
        fs::write(&path, r#"{"identifier": "old"}"#).unwrap();

        let config = read_config_json(&path).unwrap();
        assert_eq!(config.identifier(), "old");
        assert_eq!(config.get(ConfigKey::FitMode), "DPEP");
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"xtol": 1}"#).unwrap();

        assert_eq!(read_config_json(&path).unwrap_err().exit_code(), 3);
    }
}
