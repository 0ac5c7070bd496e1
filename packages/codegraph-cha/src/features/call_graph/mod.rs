//! # Call Graph
//!
//! Output of the analysis: one node per function, one edge per resolved
//! (caller, callee, call site) relationship, tagged static or dynamic.
//!
//! - `domain`: graph, its builder, edge and site records
//! - `application`: read-only traversals and textual/JSON rendering
//! - `ports`: name-based query trait for downstream consumers

pub mod application;
pub mod domain;
pub mod ports;

pub use application::render::{render_edges, render_report, EdgeFilter, GraphExport};
pub use application::visit::{callees_of, path_search, visit_edges};
pub use domain::graph::{
    CallEdge, CallEdgeRef, CallGraph, CallGraphBuilder, CallNode, CallSiteInfo, EdgeKind, NodeId,
    TargetKind,
};
pub use ports::CallGraphProvider;
