/*
 * Codegraph CHA - Class Hierarchy Analysis call graphs
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Program model (functions, types, call sites) and validation
 * - features/    : type_catalog → dispatch → call_graph → cha
 * - config/      : ChaConfig with YAML loading
 *
 * Performance:
 * - Dispatch keys resolved once per program, not per call site
 * - Rayon work-stealing for method sets and per-function resolution
 */

#![allow(clippy::module_inception)]
#![allow(clippy::new_without_default)]

pub mod config;
pub mod errors;
pub mod features;
pub mod shared;

pub use config::{ChaConfig, ConfigError};
pub use errors::{ChaError, Result};
pub use features::call_graph::{
    callees_of, path_search, render_edges, render_report, visit_edges, CallEdgeRef, CallGraph,
    CallGraphBuilder, CallGraphProvider, CallNode, CallSiteInfo, EdgeFilter, EdgeKind,
    GraphExport, NodeId, TargetKind,
};
pub use features::cha::{
    build_call_graph, call_graph, CallGraphAlgorithm, ChaAnalyzer, ChaResult, ChaStats,
};
pub use features::dispatch::{DispatchOptions, DispatchPolicy, DispatchStats, DispatchTable};
pub use features::type_catalog::{DispatchMode, MethodEntry, MethodSet, TypeCatalog};
pub use shared::models::{
    CallMode, CallSite, CallSiteId, CallTarget, EmbeddedField, Function, FunctionId,
    FunctionOrigin, Instruction, InterfaceMethod, InterfaceType, MethodDescriptor, NamedType,
    Program, ProgramBuilder, ProgramData, ProgramError, Receiver, Signature, Type, TypeName,
};

/// Load a program from JSON and build its CHA call graph with `config`
pub fn analyze_json(json: &str, config: ChaConfig) -> Result<ChaResult> {
    let analyzer = ChaAnalyzer::try_new(config)?;
    let program = Program::from_json(json)?;
    Ok(analyzer.analyze(&program))
}
