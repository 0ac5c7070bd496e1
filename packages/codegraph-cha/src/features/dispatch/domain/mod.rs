//! Dispatch policy, options and statistics

use serde::{Deserialize, Serialize};

/// Rule deciding whether a type's method set contributes to an interface
/// call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    /// The set contains a method of the descriptor's exact name and signature
    #[default]
    MethodMatch,
    /// As `MethodMatch`, and the set also implements every other method of
    /// the descriptor's interface
    InterfaceSatisfaction,
}

/// Inputs to [`DispatchTable::build`] besides the program and catalog
///
/// [`DispatchTable::build`]: crate::features::dispatch::DispatchTable::build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    pub policy: DispatchPolicy,
    /// Resolve calls through function values; off means they resolve to nothing
    pub resolve_indirect: bool,
    pub parallel: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            policy: DispatchPolicy::MethodMatch,
            resolve_indirect: true,
            parallel: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchStats {
    /// Distinct interface method descriptors
    pub descriptors: usize,
    /// Descriptors no type in the program implements
    pub empty_descriptors: usize,
    /// Sum of targets over all descriptors
    pub method_targets: usize,
    /// Distinct signatures of calls through function values
    pub signatures: usize,
    /// Sum of targets over all signatures
    pub function_targets: usize,
}
