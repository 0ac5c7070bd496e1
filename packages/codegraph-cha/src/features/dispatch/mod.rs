//! # Method Dispatch Table
//!
//! For every abstract method descriptor observed at an interface call site,
//! the set of concrete functions that may run. Resolution is purely
//! structural: a type contributes when one of its method sets satisfies the
//! descriptor's interface, whether or not a value of that type ever reaches
//! the call. The table is therefore a superset of the real dispatch targets.
//!
//! Calls through function values are resolved the same way, keyed by
//! signature, against every address-takeable function.

pub mod domain;
pub mod infrastructure;

pub use domain::{DispatchOptions, DispatchPolicy, DispatchStats};
pub use infrastructure::dispatch_table::DispatchTable;
