//! Textual and JSON renderings of a call graph
//!
//! Text output is sorted so it can be compared against golden files.

use crate::features::call_graph::domain::graph::{
    CallEdgeRef, CallGraph, CallNode, CallSiteInfo, EdgeKind,
};
use crate::shared::models::{CallSiteId, FunctionId, Program};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EdgeFilter {
    #[default]
    All,
    Static,
    Dynamic,
}

impl EdgeFilter {
    pub fn accepts(self, kind: EdgeKind) -> bool {
        match self {
            EdgeFilter::All => true,
            EdgeFilter::Static => kind == EdgeKind::Static,
            EdgeFilter::Dynamic => kind == EdgeKind::Dynamic,
        }
    }

    fn title(self) -> &'static str {
        match self {
            EdgeFilter::All => "Calls",
            EdgeFilter::Static => "Static calls",
            EdgeFilter::Dynamic => "Dynamic calls",
        }
    }
}

/// Name of a node relative to package `from`, falling back to the qualified
/// name when the graph was built from another program
fn display_name(node: &CallNode, program: &Program, from: Option<&str>) -> String {
    match program.function(node.function) {
        Some(func) if func.id == node.function => func.relative_name(from),
        _ => node.name.clone(),
    }
}

/// Sorted `caller --> callee` lines for edges accepted by `filter`.
///
/// One line per edge, so a pair connected at two call sites appears twice.
pub fn render_edges(
    graph: &CallGraph,
    program: &Program,
    filter: EdgeFilter,
    from: Option<&str>,
) -> Vec<String> {
    let mut lines: Vec<String> = graph
        .edges()
        .filter(|e| filter.accepts(e.kind))
        .map(|e| {
            format!(
                "{} --> {}",
                display_name(e.caller, program, from),
                display_name(e.callee, program, from)
            )
        })
        .collect();
    lines.sort();
    lines
}

/// Titled block of [`render_edges`] output, two-space indented, no trailing
/// newline:
///
/// ```text
/// Dynamic calls
///   (*C).f --> main.g
/// ```
pub fn render_report(
    graph: &CallGraph,
    program: &Program,
    filter: EdgeFilter,
    from: Option<&str>,
) -> String {
    let mut out = String::from(filter.title());
    for line in render_edges(graph, program, filter, from) {
        out.push_str("\n  ");
        out.push_str(&line);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeExport {
    pub function: FunctionId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeExport {
    pub caller: FunctionId,
    pub callee: FunctionId,
    pub site: CallSiteId,
    pub kind: EdgeKind,
    pub description: String,
}

impl From<CallEdgeRef<'_>> for EdgeExport {
    fn from(edge: CallEdgeRef<'_>) -> Self {
        Self {
            caller: edge.caller.function,
            callee: edge.callee.function,
            site: edge.site,
            kind: edge.kind,
            description: edge.description(),
        }
    }
}

/// Serializable snapshot of a call graph, ordered deterministically
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphExport {
    pub nodes: Vec<NodeExport>,
    pub edges: Vec<EdgeExport>,
    pub sites: Vec<CallSiteInfo>,
}

impl GraphExport {
    pub fn from_graph(graph: &CallGraph) -> Self {
        let mut nodes: Vec<NodeExport> = graph
            .nodes()
            .map(|(_, n)| NodeExport {
                function: n.function,
                name: n.name.clone(),
            })
            .collect();
        nodes.sort_by_key(|n| n.function);

        let mut edges: Vec<EdgeExport> = graph.edges().map(EdgeExport::from).collect();
        edges.sort_by_key(|e| (e.site, e.callee));

        Self {
            nodes,
            edges,
            sites: graph.sites().copied().collect(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Write pretty JSON to `path`
    pub fn write_to(&self, path: impl AsRef<Path>) -> crate::errors::Result<()> {
        let json = self.to_json_pretty()?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
