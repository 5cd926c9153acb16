//! Input/output helpers.
//!
//! - point-cloud and weight CSV ingest (`point_cloud`)
//! - step configuration JSON files (`config_file`)

pub mod config_file;
pub mod point_cloud;

pub use config_file::*;
pub use point_cloud::*;
