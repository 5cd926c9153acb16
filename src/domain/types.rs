//! Shared domain types.
//!
//! These types stay plain so they can be:
//!
//! - exchanged between the editor, the translator and the step
//! - persisted as a flat string map
//! - handed to an external fitting routine without conversion

use std::fmt;
use std::str::FromStr;

use nalgebra::{DMatrix, DVector, Point3};

/// One recognized configuration key.
///
/// The persisted spelling (`as_str`) is part of the on-disk format and must
/// not change. `sobelov` is the historical spelling used by saved workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigKey {
    Identifier,
    MeshDiscretisation,
    SobelovDiscretisation,
    SobelovWeight,
    NormalDiscretisation,
    NormalWeight,
    MaxSubIterations,
    Xtol,
    MaxIterations,
    FitMode,
    NClosestPoints,
    KdtreeArgs,
    Verbose,
    FixedNodes,
    Gui,
}

impl ConfigKey {
    pub const COUNT: usize = 15;

    /// Every key, in form order.
    pub const ALL: [ConfigKey; ConfigKey::COUNT] = [
        ConfigKey::Identifier,
        ConfigKey::MeshDiscretisation,
        ConfigKey::SobelovDiscretisation,
        ConfigKey::SobelovWeight,
        ConfigKey::NormalDiscretisation,
        ConfigKey::NormalWeight,
        ConfigKey::MaxSubIterations,
        ConfigKey::Xtol,
        ConfigKey::MaxIterations,
        ConfigKey::FitMode,
        ConfigKey::NClosestPoints,
        ConfigKey::KdtreeArgs,
        ConfigKey::Verbose,
        ConfigKey::FixedNodes,
        ConfigKey::Gui,
    ];

    /// Persisted key name.
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::Identifier => "identifier",
            ConfigKey::MeshDiscretisation => "mesh discretisation",
            ConfigKey::SobelovDiscretisation => "sobelov discretisation",
            ConfigKey::SobelovWeight => "sobelov weight",
            ConfigKey::NormalDiscretisation => "normal discretisation",
            ConfigKey::NormalWeight => "normal weight",
            ConfigKey::MaxSubIterations => "max sub-iterations",
            ConfigKey::Xtol => "xtol",
            ConfigKey::MaxIterations => "max iterations",
            ConfigKey::FitMode => "fit mode",
            ConfigKey::NClosestPoints => "n closest points",
            ConfigKey::KdtreeArgs => "kdtree args",
            ConfigKey::Verbose => "verbose",
            ConfigKey::FixedNodes => "fixed nodes",
            ConfigKey::Gui => "GUI",
        }
    }

    /// Keyword the fitting routine knows this value by.
    ///
    /// `None` for keys that only steer the step itself.
    pub fn fit_argument(self) -> Option<&'static str> {
        match self {
            ConfigKey::Identifier | ConfigKey::Gui => None,
            ConfigKey::MeshDiscretisation => Some("GD"),
            ConfigKey::SobelovDiscretisation => Some("sobD"),
            ConfigKey::SobelovWeight => Some("sobW"),
            ConfigKey::NormalDiscretisation => Some("normalD"),
            ConfigKey::NormalWeight => Some("normalW"),
            ConfigKey::MaxSubIterations => Some("itMaxPerIt"),
            ConfigKey::Xtol => Some("xtol"),
            ConfigKey::MaxIterations => Some("itMax"),
            ConfigKey::FitMode => Some("gObjType"),
            ConfigKey::NClosestPoints => Some("nClosestPoints"),
            ConfigKey::KdtreeArgs => Some("treeArgs"),
            ConfigKey::Verbose => Some("fitVerbose"),
            ConfigKey::FixedNodes => Some("fixedNodes"),
        }
    }

    /// Position in `ALL`.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown configuration key `{s}`"))
    }
}

/// The step's flat configuration: one string per `ConfigKey`, always complete.
///
/// Values stay strings at rest; they are only parsed by the translator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    values: [String; ConfigKey::COUNT],
}

impl Configuration {
    /// Build a configuration by asking `value` for every key.
    pub fn from_fn(mut value: impl FnMut(ConfigKey) -> String) -> Self {
        Self {
            values: std::array::from_fn(|i| value(ConfigKey::ALL[i])),
        }
    }

    pub fn get(&self, key: ConfigKey) -> &str {
        &self.values[key.index()]
    }

    pub fn set(&mut self, key: ConfigKey, value: impl Into<String>) {
        self.values[key.index()] = value.into();
    }

    pub fn identifier(&self) -> &str {
        self.get(ConfigKey::Identifier)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConfigKey, &str)> {
        ConfigKey::ALL.into_iter().map(move |k| (k, self.get(k)))
    }
}

impl Default for Configuration {
    fn default() -> Self {
        crate::config::defaults()
    }
}

/// Observed surface points.
pub type PointCloud = Vec<Point3<f64>>;

/// Sampling density for a penalty or data term.
///
/// The fitting routine accepts either one value for every element direction
/// or one value per direction.
#[derive(Debug, Clone, PartialEq)]
pub enum Discretisation {
    Uniform(f64),
    PerAxis(Vec<f64>),
}

/// Weights of the Sobolev penalty terms (scalar or one per term).
#[derive(Debug, Clone, PartialEq)]
pub enum PenaltyWeights {
    Uniform(f64),
    PerTerm(Vec<f64>),
}

/// Fitted nodal parameters.
///
/// One matrix per coordinate component, `nodes x derivatives` each, which
/// together form the 3-D parameter array the model is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct NodalParams {
    pub components: Vec<DMatrix<f64>>,
}

impl NodalParams {
    /// `(components, nodes, derivatives)`; zero-sized when empty.
    pub fn shape(&self) -> (usize, usize, usize) {
        match self.components.first() {
            Some(m) => (self.components.len(), m.nrows(), m.ncols()),
            None => (0, 0, 0),
        }
    }
}

/// Results of one completed fit, as exposed on the output ports.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOutcome<M> {
    pub model: M,
    pub params: NodalParams,
    pub rms: f64,
    /// Per-point distance errors (square roots of the routine's squared errors).
    pub residuals: DVector<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_round_trip() {
        for key in ConfigKey::ALL {
            assert_eq!(key.as_str().parse::<ConfigKey>().unwrap(), key);
        }
        assert!("GD".parse::<ConfigKey>().is_err());
    }

    #[test]
    fn only_step_keys_lack_fit_argument() {
        let missing: Vec<ConfigKey> = ConfigKey::ALL
            .into_iter()
            .filter(|k| k.fit_argument().is_none())
            .collect();
        assert_eq!(missing, vec![ConfigKey::Identifier, ConfigKey::Gui]);
    }

    #[test]
    fn set_replaces_single_value() {
        let mut config = Configuration::from_fn(|_| String::new());
        config.set(ConfigKey::Xtol, "1e-3");
        assert_eq!(config.get(ConfigKey::Xtol), "1e-3");
        assert_eq!(config.iter().filter(|(_, v)| !v.is_empty()).count(), 1);
    }
}
