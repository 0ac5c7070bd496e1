//! Call graph storage
//!
//! Built through [`CallGraphBuilder`], the only mutable surface; once
//! [`CallGraphBuilder::finish`] returns, the [`CallGraph`] is read-only.
//! Node indices are never removed, so a [`NodeId`] stays valid for the life
//! of the graph.

use crate::shared::models::{CallMode, CallSiteId, CallTarget, Function, FunctionId};
use petgraph::graph::{DiGraph, EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Node handle, stable for the life of the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(NodeIndex);

impl NodeId {
    pub fn index(self) -> usize {
        self.0.index()
    }
}

/// Graph node: one per function of the program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallNode {
    pub function: FunctionId,
    /// Qualified function name
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Target fixed at the call site
    Static,
    /// Target found by structural matching of an abstract call
    Dynamic,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::Static => write!(f, "static"),
            EdgeKind::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Classification of a call site's target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Direct,
    Interface,
    FunctionValue,
    Builtin,
}

impl From<&CallTarget> for TargetKind {
    fn from(target: &CallTarget) -> Self {
        match target {
            CallTarget::Static { .. } => TargetKind::Direct,
            CallTarget::Invoke { .. } => TargetKind::Interface,
            CallTarget::Indirect { .. } => TargetKind::FunctionValue,
            CallTarget::Builtin { .. } => TargetKind::Builtin,
        }
    }
}

/// Every call site is recorded, including those that resolved to no edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSiteInfo {
    pub id: CallSiteId,
    pub mode: CallMode,
    pub target: TargetKind,
}

/// Edge weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEdge {
    pub site: CallSiteId,
    pub kind: EdgeKind,
}

/// Borrowed view of one edge with both endpoints resolved
#[derive(Debug, Clone, Copy)]
pub struct CallEdgeRef<'g> {
    pub caller_id: NodeId,
    pub callee_id: NodeId,
    pub caller: &'g CallNode,
    pub callee: &'g CallNode,
    pub site: CallSiteId,
    pub kind: EdgeKind,
    site_info: Option<&'g CallSiteInfo>,
}

impl<'g> CallEdgeRef<'g> {
    pub fn site_info(&self) -> Option<&'g CallSiteInfo> {
        self.site_info
    }

    /// Human-readable description, e.g. "dynamic method call" or
    /// "concurrent static function call"
    pub fn description(&self) -> String {
        let prefix = match self.site_info.map(|s| s.mode) {
            Some(CallMode::Go) => "concurrent ",
            Some(CallMode::Defer) => "deferred ",
            Some(CallMode::Call) | None => "",
        };
        let what = match (self.kind, self.site_info.map(|s| s.target)) {
            (EdgeKind::Static, _) => "static function call",
            (EdgeKind::Dynamic, Some(TargetKind::Interface)) => "dynamic method call",
            (EdgeKind::Dynamic, _) => "dynamic function call",
        };
        format!("{}{}", prefix, what)
    }

    /// Total order used for deterministic output
    pub fn sort_key(&self) -> (&'g str, &'g str, CallSiteId) {
        (self.caller.name.as_str(), self.callee.name.as_str(), self.site)
    }
}

impl fmt::Display for CallEdgeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --> {}", self.caller.name, self.callee.name)
    }
}

/// Immutable call graph
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    graph: DiGraph<CallNode, CallEdge>,
    by_function: FxHashMap<FunctionId, NodeIndex>,
    by_name: FxHashMap<String, NodeIndex>,
    sites: BTreeMap<CallSiteId, CallSiteInfo>,
}

impl CallGraph {
    pub fn builder() -> CallGraphBuilder {
        CallGraphBuilder::new()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn edge_count_of(&self, kind: EdgeKind) -> usize {
        self.graph
            .edge_weights()
            .filter(|edge| edge.kind == kind)
            .count()
    }

    /// `None` for an id that does not belong to this graph
    pub fn node(&self, id: NodeId) -> Option<&CallNode> {
        self.graph.node_weight(id.0)
    }

    pub fn node_for(&self, function: FunctionId) -> Option<NodeId> {
        self.by_function.get(&function).copied().map(NodeId)
    }

    pub fn node_named(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied().map(NodeId)
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &CallNode)> + '_ {
        self.graph
            .node_indices()
            .map(move |idx| (NodeId(idx), &self.graph[idx]))
    }

    /// Every edge, in insertion order
    pub fn edges(&self) -> impl Iterator<Item = CallEdgeRef<'_>> + '_ {
        self.graph.edge_references().map(move |e| self.edge_ref(e))
    }

    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = CallEdgeRef<'_>> + '_ {
        self.graph
            .edges_directed(node.0, Direction::Outgoing)
            .map(move |e| self.edge_ref(e))
    }

    pub fn in_edges(&self, node: NodeId) -> impl Iterator<Item = CallEdgeRef<'_>> + '_ {
        self.graph
            .edges_directed(node.0, Direction::Incoming)
            .map(move |e| self.edge_ref(e))
    }

    /// Edges sorted by (caller name, callee name, site)
    pub fn sorted_edges(&self) -> Vec<CallEdgeRef<'_>> {
        let mut edges: Vec<CallEdgeRef<'_>> = self.edges().collect();
        edges.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        edges
    }

    /// Recorded call sites in site order
    pub fn sites(&self) -> impl Iterator<Item = &CallSiteInfo> + '_ {
        self.sites.values()
    }

    pub fn site(&self, id: CallSiteId) -> Option<&CallSiteInfo> {
        self.sites.get(&id)
    }

    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// Edges originating at one call site; empty for an unresolved dynamic
    /// site as well as for an unknown one (check [`CallGraph::site`])
    pub fn edges_at_site(&self, id: CallSiteId) -> Vec<CallEdgeRef<'_>> {
        match self.node_for(id.caller) {
            Some(caller) => self.out_edges(caller).filter(|e| e.site == id).collect(),
            None => Vec::new(),
        }
    }

    fn edge_ref<'g>(&'g self, e: EdgeReference<'g, CallEdge>) -> CallEdgeRef<'g> {
        let weight = e.weight();
        CallEdgeRef {
            caller_id: NodeId(e.source()),
            callee_id: NodeId(e.target()),
            caller: &self.graph[e.source()],
            callee: &self.graph[e.target()],
            site: weight.site,
            kind: weight.kind,
            site_info: self.sites.get(&weight.site),
        }
    }
}

/// Incremental construction of a [`CallGraph`]
#[derive(Debug, Default)]
pub struct CallGraphBuilder {
    graph: DiGraph<CallNode, CallEdge>,
    by_function: FxHashMap<FunctionId, NodeIndex>,
    seen: FxHashSet<(NodeIndex, NodeIndex, CallSiteId)>,
    sites: BTreeMap<CallSiteId, CallSiteInfo>,
}

impl CallGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(nodes, edges),
            by_function: FxHashMap::with_capacity_and_hasher(nodes, Default::default()),
            seen: FxHashSet::with_capacity_and_hasher(edges, Default::default()),
            sites: BTreeMap::new(),
        }
    }

    /// Node of `function`, created on first request
    pub fn add_node(&mut self, function: &Function) -> NodeId {
        if let Some(&idx) = self.by_function.get(&function.id) {
            return NodeId(idx);
        }
        let idx = self.graph.add_node(CallNode {
            function: function.id,
            name: function.qualified_name(),
        });
        self.by_function.insert(function.id, idx);
        NodeId(idx)
    }

    pub fn node_for(&self, function: FunctionId) -> Option<NodeId> {
        self.by_function.get(&function).copied().map(NodeId)
    }

    pub fn record_site(&mut self, info: CallSiteInfo) {
        self.sites.insert(info.id, info);
    }

    /// Insert an edge unless the (caller, callee, site) triple already has
    /// one. Returns whether an edge was added.
    pub fn add_edge(
        &mut self,
        caller: NodeId,
        callee: NodeId,
        site: CallSiteId,
        kind: EdgeKind,
    ) -> bool {
        if !self.seen.insert((caller.0, callee.0, site)) {
            return false;
        }
        self.graph.add_edge(caller.0, callee.0, CallEdge { site, kind });
        true
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn finish(self) -> CallGraph {
        let by_name = self
            .graph
            .node_indices()
            .map(|idx| (self.graph[idx].name.clone(), idx))
            .collect();
        CallGraph {
            graph: self.graph,
            by_function: self.by_function,
            by_name,
            sites: self.sites,
        }
    }
}
