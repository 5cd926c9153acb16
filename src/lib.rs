//! `fieldwork-fit-step` library crate.
//!
//! A workflow step that fits a fieldwork mesh to a point cloud. The crate
//! covers the step's configuration (editing, validation, persistence),
//! translation of that configuration into the arguments of an external
//! surface-fitting routine, and the step's run/reset/abort life cycle.
//!
//! The binary (`fwfit`) is a thin wrapper so that:
//!
//! - core logic is testable without spawning processes
//! - hosts can embed `step::FittingStep` directly

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod editor;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod report;
pub mod step;
pub mod tui;
