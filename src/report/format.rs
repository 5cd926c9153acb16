//! Plain-text formatting for the `fwfit` binary.
//!
//! Kept apart from parsing and translation so output changes stay local.

use crate::domain::{ConfigKey, Configuration, Discretisation, PenaltyWeights};
use crate::fit::FitArguments;
use crate::step::{Port, STEP_CATEGORY, STEP_NAME};

/// Two-column `key  value` table in form order.
pub fn format_config(config: &Configuration) -> String {
    let width = ConfigKey::ALL
        .iter()
        .map(|k| k.as_str().len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    out.push_str(format!("{:<width$}  {}", "key", "value").trim_end());
    out.push('\n');
    out.push_str(&format!("{:-<width$}  {:-<16}\n", "", ""));
    for (key, value) in config.iter() {
        out.push_str(format!("{:<width$}  {}", key.as_str(), value).trim_end());
        out.push('\n');
    }
    out
}

/// Resolved argument record, listed by the routine's keyword names.
pub fn format_fit_arguments<M>(args: &FitArguments<'_, M>) -> String {
    let rows: [(ConfigKey, String); 13] = [
        (ConfigKey::MeshDiscretisation, fmt_discretisation(&args.mesh_discretisation)),
        (ConfigKey::SobelovDiscretisation, fmt_discretisation(&args.sobelov_discretisation)),
        (ConfigKey::SobelovWeight, fmt_weights(&args.sobelov_weight)),
        (ConfigKey::NormalDiscretisation, fmt_discretisation(&args.normal_discretisation)),
        (ConfigKey::NormalWeight, fmt_num(args.normal_weight)),
        (ConfigKey::MaxSubIterations, args.max_sub_iterations.to_string()),
        (ConfigKey::Xtol, fmt_num(args.xtol)),
        (ConfigKey::MaxIterations, args.max_iterations.to_string()),
        (ConfigKey::FitMode, args.fit_mode.clone()),
        (ConfigKey::NClosestPoints, args.n_closest_points.to_string()),
        (ConfigKey::KdtreeArgs, fmt_mapping(args)),
        (ConfigKey::Verbose, args.verbose.to_string()),
        (ConfigKey::FixedNodes, format_fixed_nodes(&args.fixed_nodes)),
    ];

    let mut out = String::new();
    out.push_str(&format!(
        "Data: points={} | weights={}\n\n",
        args.points.len(),
        args.weights.map_or_else(|| "none".to_string(), |w| w.len().to_string()),
    ));
    for (key, value) in rows {
        // Every row above names a key with a routine keyword.
        let keyword = key.fit_argument().unwrap_or(key.as_str());
        out.push_str(format!("{keyword:<16} {value}").trim_end());
        out.push('\n');
    }
    out.push_str(&format!("{:<16} {}\n", "fullErrors", args.full_errors));
    out
}

/// `[1, 5, 6, 7]`, or `none` for an empty list.
pub fn format_fixed_nodes(nodes: &[i64]) -> String {
    if nodes.is_empty() {
        return "none".to_string();
    }
    let parts: Vec<String> = nodes.iter().map(i64::to_string).collect();
    format!("[{}]", parts.join(", "))
}

/// Step name, category and the port table announced to the host.
pub fn format_step_description() -> String {
    let mut out = String::new();
    out.push_str(&format!("{} ({})\n\n", STEP_NAME, STEP_CATEGORY));
    out.push_str(format!("{:<4} {:<20} {:<9} {}", "idx", "port", "direction", "type").trim_end());
    out.push('\n');
    out.push_str(&format!("{:-<4} {:-<20} {:-<9} {:-<12}\n", "", "", "", ""));
    for port in Port::ALL {
        let (_, _, data_type) = port.descriptor();
        let direction = if port.is_input() { "uses" } else { "provides" };
        out.push_str(&format!(
            "{:<4} {:<20} {:<9} {}\n",
            port.index(),
            port.name(),
            direction,
            data_type
        ));
    }
    out
}

fn fmt_num(v: f64) -> String {
    format!("{v}")
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| fmt_num(*x)).collect();
    format!("[{}]", parts.join(", "))
}

fn fmt_discretisation(d: &Discretisation) -> String {
    match d {
        Discretisation::Uniform(v) => fmt_num(*v),
        Discretisation::PerAxis(v) => fmt_vec(v),
    }
}

fn fmt_weights(w: &PenaltyWeights) -> String {
    match w {
        PenaltyWeights::Uniform(v) => fmt_num(*v),
        PenaltyWeights::PerTerm(v) => fmt_vec(v),
    }
}

fn fmt_mapping<M>(args: &FitArguments<'_, M>) -> String {
    let parts: Vec<String> = args
        .kdtree_args
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    format!("{{{}}}", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use super::*;
    use crate::config::{defaults, translate};

    #[test]
    fn config_table_lists_every_key() {
        let table = format_config(&defaults());
        assert_eq!(table.lines().count(), ConfigKey::COUNT + 2);
        assert!(table.lines().any(|l| l.starts_with("fit mode") && l.ends_with("DPEP")));
    }

    #[test]
    fn arguments_use_routine_keywords() {
        let mut config = defaults();
        config.set(ConfigKey::FixedNodes, "1,5-7");
        config.set(ConfigKey::KdtreeArgs, "{'leafsize': 8}");
        let points = vec![Point3::origin(); 3];
        let args = translate(&config, &(), &points, None).unwrap();

        let text = format_fit_arguments(&args);
        assert!(text.starts_with("Data: points=3 | weights=none"));
        assert!(text.contains("sobD             [8, 8]"));
        assert!(text.contains("fixedNodes       [1, 5, 6, 7]"));
        assert!(text.contains("treeArgs         {leafsize=8}"));
        assert!(text.contains("fullErrors       true"));
    }

    #[test]
    fn empty_fixed_nodes_read_none() {
        assert_eq!(format_fixed_nodes(&[]), "none");
        assert_eq!(format_fixed_nodes(&[3]), "[3]");
    }

    #[test]
    fn step_description_lists_ports() {
        let text = format_step_description();
        assert!(text.starts_with("Fieldwork Mesh Fitting (Fitting)"));
        assert_eq!(text.lines().count(), 4 + Port::ALL.len());
        assert!(text.contains("0    point cloud          uses      http://physiomeproject.org/workflow/1.0/rdf-schema#pointcloud"));
        assert!(text.contains("5    RMS error            provides  python#float"));
    }
}
