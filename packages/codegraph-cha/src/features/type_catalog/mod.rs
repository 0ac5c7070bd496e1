//! # Type Catalog
//!
//! Indexes every concrete named type of the program together with the two
//! method sets it exposes:
//! - **Value** mode: methods with a value receiver
//! - **Pointer** mode: value- and pointer-receiver methods
//!
//! Methods promoted through embedded fields are part of both sets (see
//! [`infrastructure::catalog`] for the selection rules).

pub mod domain;
pub mod infrastructure;

pub use domain::method_set::{DispatchMode, MethodEntry, MethodSet};
pub use infrastructure::catalog::TypeCatalog;
