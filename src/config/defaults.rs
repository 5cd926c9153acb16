//! Default configuration.

use crate::domain::{ConfigKey, Configuration};

/// Default string value of a key.
pub const fn default_value(key: ConfigKey) -> &'static str {
    match key {
        ConfigKey::Identifier => "",
        ConfigKey::MeshDiscretisation => "5.0",
        ConfigKey::SobelovDiscretisation => "[8,8]",
        ConfigKey::SobelovWeight => "[1e-6, 1e-6, 1e-6, 1e-6, 2e-6]",
        ConfigKey::NormalDiscretisation => "8",
        ConfigKey::NormalWeight => "50.0",
        ConfigKey::MaxSubIterations => "3",
        ConfigKey::Xtol => "1e-6",
        ConfigKey::MaxIterations => "5",
        ConfigKey::FitMode => "DPEP",
        ConfigKey::NClosestPoints => "1",
        ConfigKey::KdtreeArgs => "{}",
        ConfigKey::Verbose => "True",
        ConfigKey::FixedNodes => "None",
        ConfigKey::Gui => "True",
    }
}

/// The configuration a freshly added step starts with.
pub fn defaults() -> Configuration {
    Configuration::from_fn(|key| default_value(key).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_key() {
        let config = defaults();
        assert_eq!(config.identifier(), "");
        assert_eq!(config.get(ConfigKey::FitMode), "DPEP");
        assert_eq!(config.get(ConfigKey::Gui), "True");
        assert_eq!(config.iter().count(), ConfigKey::COUNT);
    }
}
