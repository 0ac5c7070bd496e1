//! Read-only traversals over a finished [`CallGraph`]

use crate::features::call_graph::domain::graph::{CallEdgeRef, CallGraph, NodeId};
use rustc_hash::FxHashMap;
use std::collections::{BTreeSet, VecDeque};

/// Visit every edge once, grouped by caller in node order.
/// Stops at the first error and returns it.
pub fn visit_edges<'g, E, F>(graph: &'g CallGraph, mut visit: F) -> Result<(), E>
where
    F: FnMut(CallEdgeRef<'g>) -> Result<(), E>,
{
    for (node, _) in graph.nodes() {
        for edge in graph.out_edges(node) {
            visit(edge)?;
        }
    }
    Ok(())
}

/// Shortest edge path (breadth-first) from `start` to any node matching
/// `is_end`. `Some(vec![])` when `start` itself matches.
pub fn path_search<'g, P>(
    graph: &'g CallGraph,
    start: NodeId,
    mut is_end: P,
) -> Option<Vec<CallEdgeRef<'g>>>
where
    P: FnMut(NodeId) -> bool,
{
    if is_end(start) {
        return Some(Vec::new());
    }

    let mut parent: FxHashMap<NodeId, CallEdgeRef<'g>> = FxHashMap::default();
    let mut queue = VecDeque::from([start]);

    while let Some(node) = queue.pop_front() {
        for edge in graph.out_edges(node) {
            let next = edge.callee_id;
            if next == start || parent.contains_key(&next) {
                continue;
            }
            parent.insert(next, edge);
            if is_end(next) {
                let mut path = vec![edge];
                let mut cursor = edge.caller_id;
                while cursor != start {
                    let step = parent[&cursor];
                    path.push(step);
                    cursor = step.caller_id;
                }
                path.reverse();
                return Some(path);
            }
            queue.push_back(next);
        }
    }
    None
}

/// Distinct callees of `node`, in node order
pub fn callees_of(graph: &CallGraph, node: NodeId) -> Vec<NodeId> {
    graph
        .out_edges(node)
        .map(|e| e.callee_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
