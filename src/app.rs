//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the real main that:
//! - installs logging
//! - parses CLI arguments
//! - loads configuration, point-cloud and weight files
//! - runs the editor or the translator
//! - prints reports

use std::path::Path;

use clap::Parser;
use tracing::{info, warn};

use crate::cli::{Cli, Command, EditArgs, SetArgs, TranslateArgs};
use crate::config::fixed_nodes::parse_fixed_nodes;
use crate::config::{defaults, gui_enabled, persist, translate};
use crate::domain::{ConfigKey, Configuration, PointCloud};
use crate::editor::{ConfigEditor, ConfigForm, DialogOutcome, FieldForm, ValidationPolicy};
use crate::error::{AppError, ConfigError};
use crate::io::{read_config_json, read_point_cloud_csv, read_weights_csv, write_config_json};
use crate::step::StandaloneHost;

/// Entry point for the `fwfit` binary.
pub fn run() -> Result<(), AppError> {
    crate::logging::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Defaults => handle_defaults(),
        Command::Describe => {
            print!("{}", crate::report::format_step_description());
            Ok(())
        }
        Command::Translate(args) => handle_translate(&args),
        Command::FixedNodes { spec } => handle_fixed_nodes(&spec),
        Command::Edit(args) => handle_edit(&args),
        Command::Set(args) => handle_set(&args),
    }
}

fn handle_defaults() -> Result<(), AppError> {
    let text = persist::to_json(&defaults()).map_err(|e| AppError::new(3, e.to_string()))?;
    println!("{text}");
    Ok(())
}

fn handle_translate(args: &TranslateArgs) -> Result<(), AppError> {
    let config = read_config_json(&args.config)?;
    let points: PointCloud = match &args.points {
        Some(path) => read_point_cloud_csv(path)?,
        None => PointCloud::new(),
    };
    let weights = args.weights.as_deref().map(read_weights_csv).transpose()?;

    if let Some(w) = &weights {
        if !points.is_empty() && w.len() != points.len() {
            warn!(weights = w.len(), points = points.len(), "weight count differs from point count");
        }
    }

    // The mesh model is supplied by the host at run time; only the
    // configuration-derived arguments are resolved here.
    let fit_args = translate(&config, &(), &points, weights.as_ref())?;
    let mode = if gui_enabled(&config)? { "interactive" } else { "headless" };

    println!("{}", crate::report::format_config(&config));
    println!("Execution: {mode}");
    println!("{}", crate::report::format_fit_arguments(&fit_args));
    Ok(())
}

fn handle_fixed_nodes(spec: &str) -> Result<(), AppError> {
    let nodes = parse_fixed_nodes(spec).map_err(|e| ConfigError::new(ConfigKey::FixedNodes, e))?;
    println!("{}", crate::report::format_fixed_nodes(&nodes));
    Ok(())
}

fn handle_edit(args: &EditArgs) -> Result<(), AppError> {
    let config = load_or_defaults(&args.config)?;
    let host = StandaloneHost::with_identifiers(args.taken.iter().cloned());
    let policy = if args.no_validate {
        ValidationPolicy::AlwaysValid
    } else {
        ValidationPolicy::UniqueIdentifier
    };

    match crate::tui::edit_config(&config, &host, policy)? {
        Some(edited) => {
            write_config_json(&args.config, &edited)?;
            println!("Saved {}", args.config.display());
        }
        None => info!("edit canceled; configuration left unchanged"),
    }
    Ok(())
}

fn handle_set(args: &SetArgs) -> Result<(), AppError> {
    let config = load_or_defaults(&args.config)?;
    let updated = apply_assignments(&config, &args.assignments, &args.taken, args.force)?;

    // Refuse to save values the translator would reject.
    translate(&updated, &(), &[], None)?;

    write_config_json(&args.config, &updated)?;
    println!("{}", crate::report::format_config(&updated));
    Ok(())
}

/// Apply `key=value` edits through a headless form, honouring identifier
/// uniqueness against `taken` unless `force` is set.
pub fn apply_assignments(
    config: &Configuration,
    assignments: &[(ConfigKey, String)],
    taken: &[String],
    force: bool,
) -> Result<Configuration, AppError> {
    let host = StandaloneHost::with_identifiers(taken.iter().cloned());
    let mut editor = ConfigEditor::new(FieldForm::new(), &host);
    editor.load(config);
    for (key, value) in assignments {
        editor.form_mut().set_text(*key, value);
    }
    editor.form_mut().confirm_answer = force;

    match editor.accept() {
        DialogOutcome::Accepted => Ok(editor.read()),
        DialogOutcome::Rejected => Err(AppError::new(
            3,
            format!(
                "identifier `{}` is already used by another step (use --force to save anyway)",
                editor.form().text(ConfigKey::Identifier)
            ),
        )),
    }
}

fn load_or_defaults(path: &Path) -> Result<Configuration, AppError> {
    if path.exists() {
        read_config_json(path)
    } else {
        info!(path = %path.display(), "config file not found; starting from defaults");
        Ok(defaults())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments_update_form_values() {
        let updated = apply_assignments(
            &defaults(),
            &[
                (ConfigKey::Identifier, "femur".to_string()),
                (ConfigKey::MaxIterations, "10".to_string()),
            ],
            &[],
            false,
        )
        .unwrap();
        assert_eq!(updated.identifier(), "femur");
        assert_eq!(updated.get(ConfigKey::MaxIterations), "10");
        assert_eq!(updated.get(ConfigKey::FitMode), "DPEP");
    }

    #[test]
    fn taken_identifier_needs_force() {
        let assignments = [(ConfigKey::Identifier, "tibia".to_string())];
        let taken = ["tibia".to_string()];

        let err = apply_assignments(&defaults(), &assignments, &taken, false).unwrap_err();
        assert_eq!(err.exit_code(), 3);

        let forced = apply_assignments(&defaults(), &assignments, &taken, true).unwrap();
        assert_eq!(forced.identifier(), "tibia");
    }
}
