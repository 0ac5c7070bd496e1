//! Golden call graphs
//!
//! Renders the dynamic edges of small, well-understood programs and compares
//! them with their expected listings.

#[path = "../common/mod.rs"]
mod common;

use codegraph_cha::{
    render_report, ChaAnalyzer, ChaConfig, DispatchPolicy, EdgeFilter, EdgeKind, Program,
};
use common::*;
use pretty_assertions::assert_eq;

fn dynamic_report(program: &Program, config: ChaConfig) -> String {
    let result = ChaAnalyzer::try_new(config).unwrap().analyze(program);
    render_report(&result.graph, program, EdgeFilter::Dynamic, Some("main"))
}

fn whole_interface() -> ChaConfig {
    ChaConfig::default().dispatch_policy(DispatchPolicy::InterfaceSatisfaction)
}

#[test]
fn test_shapes_golden() {
    assert_eq!(dynamic_report(&shapes_program(), ChaConfig::default()), SHAPES_WANT);
}

#[test]
fn test_shapes_isolated_function_has_node() {
    let program = shapes_program();
    let graph = codegraph_cha::call_graph(&program);
    let describe = program
        .functions()
        .iter()
        .find(|f| f.name == "Describe")
        .unwrap();
    let node = graph.node_for(describe.id).unwrap();
    assert_eq!(graph.out_edges(node).count(), 0);
    assert_eq!(graph.in_edges(node).count(), 0);
    assert_eq!(graph.edge_count_of(EdgeKind::Static), 0);
}

#[test]
fn test_iface_golden_whole_interface() {
    assert_eq!(dynamic_report(&iface_program(), whole_interface()), IFACE_WANT);
}

#[test]
fn test_iface_golden_method_match() {
    assert_eq!(
        dynamic_report(&iface_program(), ChaConfig::default()),
        IFACE_METHOD_MATCH_WANT
    );
}

#[test]
fn test_recv_golden() {
    let program = recv_program();
    assert_eq!(dynamic_report(&program, ChaConfig::default()), RECV_WANT);
    assert_eq!(dynamic_report(&program, whole_interface()), RECV_WANT);
}

#[test]
fn test_recv_wrapper_calls_value_method_statically() {
    let program = recv_program();
    let graph = codegraph_cha::call_graph(&program);
    let report = render_report(&graph, &program, EdgeFilter::Static, Some("main"));
    assert_eq!(report, "Static calls\n  (*C).f --> (C).f");
}

#[test]
fn test_func_golden() {
    assert_eq!(dynamic_report(&func_program(), ChaConfig::default()), FUNC_WANT);
}

#[test]
fn test_func_golden_without_indirect_resolution() {
    let config = ChaConfig::default().resolve_indirect_calls(false);
    assert_eq!(dynamic_report(&func_program(), config), "Dynamic calls");
}

#[test]
fn test_embedding_golden() {
    assert_eq!(dynamic_report(&embedding_program(), ChaConfig::default()), EMBEDDING_WANT);
}

#[test]
fn test_embedding_without_promotion() {
    // Base itself still implements both interfaces
    let config = ChaConfig::default().promote_embedded(false);
    assert_eq!(dynamic_report(&embedding_program(), config), EMBEDDING_WANT);
}

#[test]
fn test_shadowing_golden_whole_interface() {
    assert_eq!(dynamic_report(&shadowing_program(), whole_interface()), SHADOWING_WANT);
}

#[test]
fn test_shadowing_golden_method_match() {
    assert_eq!(
        dynamic_report(&shadowing_program(), ChaConfig::default()),
        SHADOWING_METHOD_MATCH_WANT
    );
}

#[test]
fn test_goldens_stable_across_parallel_modes() {
    for program in [
        shapes_program(),
        iface_program(),
        recv_program(),
        func_program(),
        shadowing_program(),
    ] {
        let sequential = dynamic_report(&program, ChaConfig::sequential());
        let parallel = dynamic_report(
            &program,
            ChaConfig::default().parallel_threshold(1).num_threads(Some(2)),
        );
        assert_eq!(sequential, parallel);
    }
}

#[test]
fn test_qualified_rendering() {
    let program = recv_program();
    let graph = codegraph_cha::call_graph(&program);
    let lines = codegraph_cha::render_edges(&graph, &program, EdgeFilter::Dynamic, None);
    assert_eq!(lines[0], "main.f --> (*main.C).f");
}
