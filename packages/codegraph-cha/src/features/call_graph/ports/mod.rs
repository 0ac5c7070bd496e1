//! Call Graph Protocol
//!
//! Name-based query surface for consumers that do not care how the graph is
//! stored. Names are qualified function names (`pkg.f`, `(*pkg.T).m`).

use super::domain::graph::CallGraph;
use std::collections::BTreeSet;

/// Call graph protocol
///
/// Any call graph implementation must provide:
/// - get_callees(func) -> distinct callee names, sorted
/// - get_functions() -> every function name, sorted
pub trait CallGraphProvider {
    /// Functions called by `func_name`; empty if it makes no calls or is unknown
    fn get_callees(&self, func_name: &str) -> Vec<String>;

    fn get_functions(&self) -> Vec<String>;

    /// Reverse lookup.
    /// Default implementation returns empty (override for better performance).
    fn get_callers(&self, _func_name: &str) -> Vec<String> {
        Vec::new()
    }

    fn contains_function(&self, func_name: &str) -> bool {
        self.get_functions().iter().any(|f| f == func_name)
    }

    fn num_functions(&self) -> usize {
        self.get_functions().len()
    }
}

impl CallGraphProvider for CallGraph {
    fn get_callees(&self, func_name: &str) -> Vec<String> {
        let Some(node) = self.node_named(func_name) else {
            return Vec::new();
        };
        self.out_edges(node)
            .map(|e| e.callee.name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn get_functions(&self) -> Vec<String> {
        let mut names: Vec<String> = self.nodes().map(|(_, n)| n.name.clone()).collect();
        names.sort();
        names
    }

    fn get_callers(&self, func_name: &str) -> Vec<String> {
        let Some(node) = self.node_named(func_name) else {
            return Vec::new();
        };
        self.in_edges(node)
            .map(|e| e.caller.name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn contains_function(&self, func_name: &str) -> bool {
        self.node_named(func_name).is_some()
    }

    fn num_functions(&self) -> usize {
        self.node_count()
    }
}
