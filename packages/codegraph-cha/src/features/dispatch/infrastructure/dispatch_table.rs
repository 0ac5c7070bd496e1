//! Eager dispatch table construction
//!
//! A pre-pass collects every distinct descriptor and indirect-call signature
//! of the program; each key is then resolved once against the whole type
//! catalog. The table is immutable afterwards.

use crate::features::dispatch::domain::{DispatchOptions, DispatchPolicy, DispatchStats};
use crate::features::type_catalog::{DispatchMode, TypeCatalog};
use crate::shared::models::{CallTarget, FunctionId, MethodDescriptor, Program, Signature};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    methods: FxHashMap<MethodDescriptor, Vec<FunctionId>>,
    functions: FxHashMap<Signature, Vec<FunctionId>>,
    stats: DispatchStats,
}

impl DispatchTable {
    /// Resolve every dynamic call key of `program`
    pub fn build(program: &Program, catalog: &TypeCatalog, options: &DispatchOptions) -> Self {
        let policy = options.policy;
        let mut descriptors: FxHashSet<&MethodDescriptor> = FxHashSet::default();
        let mut signatures: FxHashSet<&Signature> = FxHashSet::default();
        for (_, site) in program.call_sites() {
            match &site.target {
                CallTarget::Invoke { method } => {
                    descriptors.insert(method);
                }
                CallTarget::Indirect { signature } if options.resolve_indirect => {
                    signatures.insert(signature);
                }
                CallTarget::Indirect { .. }
                | CallTarget::Static { .. }
                | CallTarget::Builtin { .. } => {}
            }
        }

        let methods: FxHashMap<MethodDescriptor, Vec<FunctionId>> = if options.parallel {
            descriptors
                .into_par_iter()
                .map(|d| (d.clone(), Self::resolve_method(catalog, d, policy)))
                .collect()
        } else {
            descriptors
                .into_iter()
                .map(|d| (d.clone(), Self::resolve_method(catalog, d, policy)))
                .collect()
        };

        let functions = if signatures.is_empty() {
            FxHashMap::default()
        } else {
            Self::functions_by_signature(program, &signatures)
        };

        let stats = DispatchStats {
            descriptors: methods.len(),
            empty_descriptors: methods.values().filter(|t| t.is_empty()).count(),
            method_targets: methods.values().map(Vec::len).sum(),
            signatures: functions.len(),
            function_targets: functions.values().map(Vec::len).sum(),
        };
        tracing::debug!(
            "dispatch table: {} descriptors ({} unimplemented, {} targets), {} signatures ({} targets)",
            stats.descriptors,
            stats.empty_descriptors,
            stats.method_targets,
            stats.signatures,
            stats.function_targets
        );

        Self {
            methods,
            functions,
            stats,
        }
    }

    /// Every function implementing `descriptor`, sorted by id.
    ///
    /// Each type is checked in both modes; a mode contributes its method of
    /// the descriptor's name and signature. Under
    /// [`DispatchPolicy::InterfaceSatisfaction`] the mode's set must also
    /// implement the whole interface.
    pub fn resolve_method(
        catalog: &TypeCatalog,
        descriptor: &MethodDescriptor,
        policy: DispatchPolicy,
    ) -> Vec<FunctionId> {
        let required = match policy {
            DispatchPolicy::MethodMatch => None,
            DispatchPolicy::InterfaceSatisfaction => {
                match catalog.interface_methods(&descriptor.interface) {
                    Some(methods) => Some(methods),
                    None => return Vec::new(),
                }
            }
        };

        let mut targets = BTreeSet::new();
        for ty in catalog.all_types() {
            for mode in DispatchMode::ALL {
                let Some(set) = catalog.method_set(ty, mode) else {
                    continue;
                };
                if required.is_some_and(|methods| !set.satisfies(methods)) {
                    continue;
                }
                if let Some(entry) = set.lookup(&descriptor.name, &descriptor.signature) {
                    targets.insert(entry.function);
                }
            }
        }
        targets.into_iter().collect()
    }

    /// Address-takeable functions grouped by signature, restricted to the
    /// signatures actually called through function values
    fn functions_by_signature(
        program: &Program,
        wanted: &FxHashSet<&Signature>,
    ) -> FxHashMap<Signature, Vec<FunctionId>> {
        let mut by_sig: FxHashMap<Signature, Vec<FunctionId>> = wanted
            .iter()
            .map(|sig| ((*sig).clone(), Vec::new()))
            .collect();
        for func in program.functions() {
            if !func.is_address_takeable() {
                continue;
            }
            if let Some(targets) = by_sig.get_mut(&func.signature) {
                targets.push(func.id);
            }
        }
        by_sig
    }

    /// Implementations of an interface method; empty when none exists or
    /// the descriptor never occurs in the program
    pub fn lookup(&self, descriptor: &MethodDescriptor) -> &[FunctionId] {
        self.methods
            .get(descriptor)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Candidate targets of a call through a function value
    pub fn lookup_signature(&self, signature: &Signature) -> &[FunctionId] {
        self.functions
            .get(signature)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Descriptors in the table, in descriptor order
    pub fn descriptors(&self) -> Vec<&MethodDescriptor> {
        let mut out: Vec<&MethodDescriptor> = self.methods.keys().collect();
        out.sort();
        out
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }
}
