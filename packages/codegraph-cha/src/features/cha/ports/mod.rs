use crate::features::call_graph::CallGraph;
use crate::shared::models::Program;

/// Whole-program call graph construction strategy
pub trait CallGraphAlgorithm: Send + Sync {
    fn name(&self) -> &'static str;

    fn build(&self, program: &Program) -> CallGraph;
}
