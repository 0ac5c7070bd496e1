//! CHA Analyzer
//!
//! # Usage
//! ```text
//! use codegraph_cha::{ChaAnalyzer, ChaConfig, ProgramBuilder};
//!
//! let program = builder.build()?;
//! let result = ChaAnalyzer::new(ChaConfig::default()).analyze(&program);
//! println!("{} edges", result.graph.edge_count());
//! ```

use crate::config::{ChaConfig, ConfigResult};
use crate::features::call_graph::{
    CallGraph, CallGraphBuilder, CallSiteInfo, EdgeKind, TargetKind,
};
use crate::features::cha::domain::{ChaResult, ChaStats};
use crate::features::cha::ports::CallGraphAlgorithm;
use crate::features::dispatch::{DispatchOptions, DispatchTable};
use crate::features::type_catalog::TypeCatalog;
use crate::shared::models::{CallTarget, Function, FunctionId, Program};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct ChaAnalyzer {
    config: ChaConfig,
}

impl ChaAnalyzer {
    pub fn new(config: ChaConfig) -> Self {
        Self { config }
    }

    /// Like [`ChaAnalyzer::new`], rejecting an out-of-range configuration
    pub fn try_new(config: ChaConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChaConfig {
        &self.config
    }

    /// Whether `program` is large enough to be worth splitting across threads
    fn use_parallel(&self, program: &Program) -> bool {
        cfg!(feature = "parallel")
            && self.config.parallel
            && program.function_count() >= self.config.parallel_threshold
    }

    pub fn analyze(&self, program: &Program) -> ChaResult {
        let start = Instant::now();
        let parallel = self.use_parallel(program);

        let run = || self.run(program, parallel);
        let (graph, table, named_types) = match self.config.num_threads {
            Some(threads) if parallel => match rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("cha-worker-{}", i))
                .build()
            {
                Ok(pool) => pool.install(run),
                Err(e) => {
                    warn!("Failed to build {}-thread pool, using global pool: {}", threads, e);
                    run()
                }
            },
            _ => run(),
        };

        let mut stats = collect_stats(program, &graph, &table);
        stats.named_types = named_types;
        stats.parallel = parallel;
        stats.duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        info!(
            "CHA call graph: {} functions, {} sites, {} static + {} dynamic edges, {} unresolved dynamic sites ({:.2}ms, parallel={})",
            stats.functions,
            stats.call_sites,
            stats.static_edges,
            stats.dynamic_edges,
            stats.unresolved_dynamic_sites,
            stats.duration_ms,
            parallel
        );

        ChaResult { graph, stats }
    }

    fn run(&self, program: &Program, parallel: bool) -> (CallGraph, DispatchTable, usize) {
        let catalog = TypeCatalog::build_with(program, self.config.promote_embedded, parallel);
        debug!("type catalog: {} named types", catalog.type_count());

        let options = DispatchOptions {
            policy: self.config.dispatch_policy,
            resolve_indirect: self.config.resolve_indirect_calls,
            parallel,
        };
        let table = DispatchTable::build(program, &catalog, &options);
        let graph = build_call_graph(program, &table, parallel);
        (graph, table, catalog.type_count())
    }
}

impl CallGraphAlgorithm for ChaAnalyzer {
    fn name(&self) -> &'static str {
        "cha"
    }

    fn build(&self, program: &Program) -> CallGraph {
        self.analyze(program).graph
    }
}

/// CHA call graph of `program` with the default configuration
pub fn call_graph(program: &Program) -> CallGraph {
    ChaAnalyzer::default().analyze(program).graph
}

/// Targets of one call site before they are turned into edges
enum Targets<'t> {
    None,
    Static(FunctionId),
    Dynamic(&'t [FunctionId]),
}

struct PendingSite<'t> {
    info: CallSiteInfo,
    targets: Targets<'t>,
}

fn resolve_function<'t>(func: &Function, table: &'t DispatchTable) -> Vec<PendingSite<'t>> {
    func.call_sites()
        .map(|(id, site)| {
            let targets = match &site.target {
                CallTarget::Static { callee } => Targets::Static(*callee),
                CallTarget::Invoke { method } => Targets::Dynamic(table.lookup(method)),
                CallTarget::Indirect { signature } => {
                    Targets::Dynamic(table.lookup_signature(signature))
                }
                CallTarget::Builtin { .. } => Targets::None,
            };
            PendingSite {
                info: CallSiteInfo {
                    id,
                    mode: site.mode,
                    target: TargetKind::from(&site.target),
                },
                targets,
            }
        })
        .collect()
}

/// Build the call graph of `program` against a prepared dispatch table.
///
/// Every function gets a node, every call site is recorded, and each
/// (caller, callee, site) triple yields at most one edge. With `parallel`
/// set, call sites are resolved per function on the rayon pool; the merge
/// runs in function order so the result is identical to the sequential one.
pub fn build_call_graph(program: &Program, table: &DispatchTable, parallel: bool) -> CallGraph {
    let functions = program.functions();
    let mut builder = CallGraphBuilder::with_capacity(functions.len(), functions.len() * 2);
    for func in functions {
        builder.add_node(func);
    }

    let pending: Vec<Vec<PendingSite<'_>>> = if parallel {
        functions
            .par_iter()
            .map(|f| resolve_function(f, table))
            .collect()
    } else {
        functions.iter().map(|f| resolve_function(f, table)).collect()
    };

    for (func, sites) in functions.iter().zip(pending) {
        let Some(caller) = builder.node_for(func.id) else {
            continue;
        };
        for PendingSite { info, targets } in sites {
            builder.record_site(info);
            match targets {
                Targets::None => {}
                Targets::Static(callee) => {
                    if let Some(callee) = builder.node_for(callee) {
                        builder.add_edge(caller, callee, info.id, EdgeKind::Static);
                    }
                }
                Targets::Dynamic(callees) => {
                    for &callee in callees {
                        if let Some(callee) = builder.node_for(callee) {
                            builder.add_edge(caller, callee, info.id, EdgeKind::Dynamic);
                        }
                    }
                }
            }
        }
    }

    let graph = builder.finish();
    debug!(
        "call graph: {} nodes, {} edges, {} sites",
        graph.node_count(),
        graph.edge_count(),
        graph.site_count()
    );
    graph
}

fn collect_stats(program: &Program, graph: &CallGraph, table: &DispatchTable) -> ChaStats {
    let resolved: FxHashSet<_> = graph.edges().map(|e| e.site).collect();
    let unresolved_dynamic_sites = graph
        .sites()
        .filter(|s| matches!(s.target, TargetKind::Interface | TargetKind::FunctionValue))
        .filter(|s| !resolved.contains(&s.id))
        .count();

    ChaStats {
        functions: program.function_count(),
        call_sites: graph.site_count(),
        static_edges: graph.edge_count_of(EdgeKind::Static),
        dynamic_edges: graph.edge_count_of(EdgeKind::Dynamic),
        unresolved_dynamic_sites,
        descriptors: table.stats().descriptors,
        signatures: table.stats().signatures,
        ..ChaStats::default()
    }
}
