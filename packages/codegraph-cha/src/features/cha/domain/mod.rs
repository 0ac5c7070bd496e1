use crate::features::call_graph::CallGraph;
use serde::{Deserialize, Serialize};

/// Analysis output
#[derive(Debug, Clone)]
pub struct ChaResult {
    pub graph: CallGraph,
    pub stats: ChaStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChaStats {
    pub functions: usize,
    pub named_types: usize,
    pub call_sites: usize,
    pub static_edges: usize,
    pub dynamic_edges: usize,
    /// Interface or function-value call sites with no compatible target
    pub unresolved_dynamic_sites: usize,
    /// Distinct method descriptors seen at interface call sites
    pub descriptors: usize,
    /// Distinct signatures seen at function-value call sites
    pub signatures: usize,
    pub parallel: bool,
    pub duration_ms: f64,
}
