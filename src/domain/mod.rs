//! Domain types used throughout the step.
//!
//! This module defines:
//!
//! - the configuration key set and the flat `Configuration` record
//! - fit-facing value types (`Discretisation`, `PenaltyWeights`, `NodalParams`)
//! - fit outputs (`FitOutcome`)

pub mod types;

pub use types::*;
