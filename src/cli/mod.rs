//! Command-line parsing for the `fwfit` tool.
//!
//! Argument parsing stays here; dispatch lives in `app`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::ConfigKey;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "fwfit",
    version,
    about = "Configure and inspect the fieldwork mesh fitting step"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the default step configuration as JSON.
    Defaults,
    /// Print the step's name, category and port table.
    Describe,
    /// Translate a configuration and print the resolved fitting arguments.
    Translate(TranslateArgs),
    /// Expand a fixed-node list such as `1,5-7,10`.
    FixedNodes {
        /// Node list to expand.
        spec: String,
    },
    /// Edit a configuration file in the terminal form editor.
    Edit(EditArgs),
    /// Set configuration values without the form editor.
    Set(SetArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct TranslateArgs {
    /// Step configuration JSON.
    #[arg(long, value_name = "JSON")]
    pub config: PathBuf,

    /// Point cloud CSV (`x,y,z` rows).
    #[arg(long, value_name = "CSV")]
    pub points: Option<PathBuf>,

    /// Data weights CSV (one column).
    #[arg(long, value_name = "CSV")]
    pub weights: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct EditArgs {
    /// Step configuration JSON; created from defaults if missing.
    #[arg(long, value_name = "JSON")]
    pub config: PathBuf,

    /// Identifiers already used by other steps in the workflow.
    #[arg(long = "taken", value_name = "ID")]
    pub taken: Vec<String>,

    /// Skip the identifier uniqueness check.
    #[arg(long)]
    pub no_validate: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct SetArgs {
    /// Step configuration JSON; created from defaults if missing.
    #[arg(long, value_name = "JSON")]
    pub config: PathBuf,

    /// Identifiers already used by other steps in the workflow.
    #[arg(long = "taken", value_name = "ID")]
    pub taken: Vec<String>,

    /// Save even if the identifier is already taken.
    #[arg(long)]
    pub force: bool,

    /// Assignments such as `"max iterations=10"`.
    #[arg(value_name = "KEY=VALUE", required = true, value_parser = parse_assignment)]
    pub assignments: Vec<(ConfigKey, String)>,
}

/// Split `key=value` at the first `=`; the key must be a persisted key name.
fn parse_assignment(s: &str) -> Result<(ConfigKey, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))?;
    let key: ConfigKey = key.trim().parse()?;
    Ok((key, value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_splits_at_first_equals() {
        assert_eq!(
            parse_assignment("kdtree args={'k'=1}").unwrap(),
            (ConfigKey::KdtreeArgs, "{'k'=1}".to_string())
        );
        assert!(parse_assignment("xtol").is_err());
        assert!(parse_assignment("GD=1").is_err());
    }

    #[test]
    fn set_parses_multiple_assignments() {
        let cli = Cli::try_parse_from([
            "fwfit",
            "set",
            "--config",
            "step.json",
            "--taken",
            "a",
            "--taken",
            "b",
            "identifier=femur",
            "max iterations=10",
        ])
        .unwrap();
        let Command::Set(args) = cli.command else {
            panic!("expected set");
        };
        assert_eq!(args.taken, vec!["a", "b"]);
        assert_eq!(args.assignments.len(), 2);
        assert_eq!(args.assignments[1], (ConfigKey::MaxIterations, "10".to_string()));
    }

    #[test]
    fn fixed_nodes_takes_positional_spec() {
        let cli = Cli::try_parse_from(["fwfit", "fixed-nodes", "1,5-7"]).unwrap();
        assert!(matches!(cli.command, Command::FixedNodes { ref spec } if spec == "1,5-7"));
    }

    #[test]
    fn describe_takes_no_arguments() {
        let cli = Cli::try_parse_from(["fwfit", "describe"]).unwrap();
        assert!(matches!(cli.command, Command::Describe));
        assert!(Cli::try_parse_from(["fwfit", "describe", "extra"]).is_err());
    }
}
