//! Step configuration: defaults, parsing and translation.
//!
//! - `defaults`: the configuration a new step starts with
//! - `literal`: restricted literal parser for stored values
//! - `fixed_nodes`: the `1,5-7,10` node-list grammar
//! - `translate`: configuration → `FitArguments`
//! - `persist`: JSON (de)serialization

pub mod defaults;
pub mod fixed_nodes;
pub mod literal;
pub mod persist;
pub mod translate;

pub use defaults::*;
pub use translate::*;
