//! # Class Hierarchy Analysis
//!
//! Builds a sound, context-insensitive call graph for a whole program:
//! 1. catalog every named type with its value and pointer method sets
//! 2. resolve each abstract call key observed in the program (dispatch table)
//! 3. walk every call site and emit static or dynamic edges
//!
//! Precision is traded for speed: a dynamic call reaches every compatible
//! target in the program, whether or not a value of that type flows there.

pub mod application;
pub mod domain;
pub mod ports;

pub use application::analyzer::{build_call_graph, call_graph, ChaAnalyzer};
pub use domain::{ChaResult, ChaStats};
pub use ports::CallGraphAlgorithm;
