//! Configuration → fitting-routine arguments.
//!
//! Every key except `identifier` and `GUI` feeds one argument:
//! - `fit mode` is passed through as a raw string
//! - `fixed nodes` goes through the range-expansion grammar
//! - everything else is parsed as a literal and then type-checked for the
//!   argument it feeds
//!
//! The first failing key aborts translation; no partial record is returned.

use std::collections::BTreeMap;

use nalgebra::{DVector, Point3};
use tracing::debug;

use crate::config::fixed_nodes::parse_fixed_nodes;
use crate::config::literal::{Literal, parse_literal};
use crate::domain::{ConfigKey, Configuration, Discretisation, PenaltyWeights};
use crate::error::{ConfigError, ConfigErrorReason};
use crate::fit::{AbortSignal, FitArguments};

/// Build the argument record for one fitting call.
///
/// The progress sink and abort signal start unset; callers attach them with
/// `FitArguments::with_progress` / `with_abort`.
pub fn translate<'a, M>(
    config: &Configuration,
    model: &'a M,
    points: &'a [Point3<f64>],
    weights: Option<&'a DVector<f64>>,
) -> Result<FitArguments<'a, M>, ConfigError> {
    let args = FitArguments {
        model,
        points,
        weights,
        mesh_discretisation: discretisation(config, ConfigKey::MeshDiscretisation)?,
        sobelov_discretisation: discretisation(config, ConfigKey::SobelovDiscretisation)?,
        sobelov_weight: penalty_weights(config, ConfigKey::SobelovWeight)?,
        normal_discretisation: discretisation(config, ConfigKey::NormalDiscretisation)?,
        normal_weight: number(config, ConfigKey::NormalWeight)?,
        max_sub_iterations: count(config, ConfigKey::MaxSubIterations)?,
        xtol: number(config, ConfigKey::Xtol)?,
        max_iterations: count(config, ConfigKey::MaxIterations)?,
        fit_mode: config.get(ConfigKey::FitMode).to_string(),
        n_closest_points: count(config, ConfigKey::NClosestPoints)?,
        kdtree_args: mapping(config, ConfigKey::KdtreeArgs)?,
        verbose: boolean(config, ConfigKey::Verbose)?,
        fixed_nodes: parse_fixed_nodes(config.get(ConfigKey::FixedNodes))
            .map_err(|e| ConfigError::new(ConfigKey::FixedNodes, e))?,
        full_errors: true,
        progress: None,
        abort: AbortSignal::new(),
    };

    debug!(
        points = points.len(),
        weighted = weights.is_some(),
        fixed_nodes = args.fixed_nodes.len(),
        fit_mode = %args.fit_mode,
        "translated configuration into fit arguments"
    );
    Ok(args)
}

/// Parse the `GUI` flag: whether the step runs interactively.
pub fn gui_enabled(config: &Configuration) -> Result<bool, ConfigError> {
    boolean(config, ConfigKey::Gui)
}

fn literal(config: &Configuration, key: ConfigKey) -> Result<Literal, ConfigError> {
    parse_literal(config.get(key)).map_err(|e| ConfigError::new(key, e))
}

fn mismatch(key: ConfigKey, expected: &'static str, found: &Literal) -> ConfigError {
    ConfigError::new(
        key,
        ConfigErrorReason::Type {
            expected,
            found: found.kind().to_string(),
        },
    )
}

fn number(config: &Configuration, key: ConfigKey) -> Result<f64, ConfigError> {
    let value = literal(config, key)?;
    value.as_f64().ok_or_else(|| mismatch(key, "a number", &value))
}

fn count(config: &Configuration, key: ConfigKey) -> Result<usize, ConfigError> {
    match literal(config, key)? {
        Literal::Int(v) if v >= 0 => Ok(v as usize),
        Literal::Int(v) => Err(ConfigError::new(
            key,
            ConfigErrorReason::Type {
                expected: "a non-negative integer",
                found: v.to_string(),
            },
        )),
        other => Err(mismatch(key, "a non-negative integer", &other)),
    }
}

fn boolean(config: &Configuration, key: ConfigKey) -> Result<bool, ConfigError> {
    match literal(config, key)? {
        Literal::Bool(v) => Ok(v),
        other => Err(mismatch(key, "`True` or `False`", &other)),
    }
}

fn mapping(config: &Configuration, key: ConfigKey) -> Result<BTreeMap<String, Literal>, ConfigError> {
    match literal(config, key)? {
        Literal::Map(m) => Ok(m),
        other => Err(mismatch(key, "a mapping", &other)),
    }
}

enum Numbers {
    Scalar(f64),
    Seq(Vec<f64>),
}

/// A number, or a sequence of numbers.
fn scalar_or_seq(key: ConfigKey, value: Literal) -> Result<Numbers, ConfigError> {
    if let Some(v) = value.as_f64() {
        return Ok(Numbers::Scalar(v));
    }
    match value {
        Literal::Seq(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in &items {
                out.push(
                    item.as_f64()
                        .ok_or_else(|| mismatch(key, "a sequence of numbers", item))?,
                );
            }
            Ok(Numbers::Seq(out))
        }
        other => Err(mismatch(key, "a number or a sequence of numbers", &other)),
    }
}

fn discretisation(config: &Configuration, key: ConfigKey) -> Result<Discretisation, ConfigError> {
    Ok(match scalar_or_seq(key, literal(config, key)?)? {
        Numbers::Scalar(v) => Discretisation::Uniform(v),
        Numbers::Seq(v) => Discretisation::PerAxis(v),
    })
}

fn penalty_weights(config: &Configuration, key: ConfigKey) -> Result<PenaltyWeights, ConfigError> {
    Ok(match scalar_or_seq(key, literal(config, key)?)? {
        Numbers::Scalar(v) => PenaltyWeights::Uniform(v),
        Numbers::Seq(v) => PenaltyWeights::PerTerm(v),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults;

    fn cloud() -> Vec<Point3<f64>> {
        (0..10).map(|i| Point3::new(i as f64, 0.0, 1.0)).collect()
    }

    #[test]
    fn defaults_translate_with_full_errors() {
        let points = cloud();
        let args = translate(&defaults(), &(), &points, None).unwrap();

        assert!(args.full_errors);
        assert_eq!(args.points.len(), 10);
        assert_eq!(args.mesh_discretisation, Discretisation::Uniform(5.0));
        assert_eq!(args.sobelov_discretisation, Discretisation::PerAxis(vec![8.0, 8.0]));
        assert_eq!(
            args.sobelov_weight,
            PenaltyWeights::PerTerm(vec![1e-6, 1e-6, 1e-6, 1e-6, 2e-6])
        );
        assert_eq!(args.normal_discretisation, Discretisation::Uniform(8.0));
        assert_eq!(args.normal_weight, 50.0);
        assert_eq!(args.max_sub_iterations, 3);
        assert_eq!(args.xtol, 1e-6);
        assert_eq!(args.max_iterations, 5);
        assert_eq!(args.fit_mode, "DPEP");
        assert_eq!(args.n_closest_points, 1);
        assert!(args.kdtree_args.is_empty());
        assert!(args.verbose);
        assert!(args.fixed_nodes.is_empty());
        assert!(args.progress.is_none());
    }

    #[test]
    fn fit_mode_is_never_parsed() {
        let mut config = defaults();
        config.set(ConfigKey::FitMode, "[not a literal");
        let points = cloud();
        let args = translate(&config, &(), &points, None).unwrap();
        assert_eq!(args.fit_mode, "[not a literal");
    }

    #[test]
    fn malformed_literal_names_key() {
        let mut config = defaults();
        config.set(ConfigKey::SobelovDiscretisation, "[8,");
        let points = cloud();
        let err = translate(&config, &(), &points, None).unwrap_err();
        assert_eq!(err.key, ConfigKey::SobelovDiscretisation);
        assert!(matches!(err.reason, ConfigErrorReason::Syntax(_)));
    }

    #[test]
    fn type_mismatch_names_key() {
        let mut config = defaults();
        config.set(ConfigKey::MaxIterations, "5.0");
        let points = cloud();
        let err = translate(&config, &(), &points, None).unwrap_err();
        assert_eq!(err.key, ConfigKey::MaxIterations);

        let mut config = defaults();
        config.set(ConfigKey::NClosestPoints, "-1");
        let err = translate(&config, &(), &points, None).unwrap_err();
        assert_eq!(err.key, ConfigKey::NClosestPoints);

        let mut config = defaults();
        config.set(ConfigKey::Verbose, "1");
        let err = translate(&config, &(), &points, None).unwrap_err();
        assert_eq!(err.key, ConfigKey::Verbose);
    }

    #[test]
    fn fixed_node_errors_name_key_and_token() {
        let mut config = defaults();
        config.set(ConfigKey::FixedNodes, "1,a-3");
        let points = cloud();
        let err = translate(&config, &(), &points, None).unwrap_err();
        assert_eq!(err.key, ConfigKey::FixedNodes);
        assert!(err.to_string().contains("`a-3`"));
    }

    #[test]
    fn kdtree_args_forwarded() {
        let mut config = defaults();
        config.set(ConfigKey::KdtreeArgs, "{'leafsize': 16}");
        config.set(ConfigKey::FixedNodes, "1,5-7,10");
        let points = cloud();
        let args = translate(&config, &(), &points, None).unwrap();
        assert_eq!(args.kdtree_args.get("leafsize"), Some(&Literal::Int(16)));
        assert_eq!(args.fixed_nodes, vec![1, 5, 6, 7, 10]);
    }

    #[test]
    fn gui_flag_parses() {
        let mut config = defaults();
        assert!(gui_enabled(&config).unwrap());
        config.set(ConfigKey::Gui, "False");
        assert!(!gui_enabled(&config).unwrap());
        config.set(ConfigKey::Gui, "yes");
        assert_eq!(gui_enabled(&config).unwrap_err().key, ConfigKey::Gui);
    }

    #[test]
    fn runaway_values_fail_with_key() {
        let points = cloud();

        let mut config = defaults();
        config.set(ConfigKey::SobelovWeight, "[".repeat(100_000));
        let err = translate(&config, &(), &points, None).unwrap_err();
        assert_eq!(err.key, ConfigKey::SobelovWeight);
        assert!(err.to_string().contains("nesting too deep"), "{err}");

        let mut config = defaults();
        config.set(ConfigKey::FixedNodes, "0-9223372036854775807");
        let err = translate(&config, &(), &points, None).unwrap_err();
        assert_eq!(err.key, ConfigKey::FixedNodes);
        assert!(err.to_string().contains("too many fixed nodes"), "{err}");
    }
}
