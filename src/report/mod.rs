//! Terminal reports: configuration tables, resolved fit arguments and the
//! step's port table.

pub mod format;

pub use format::*;
