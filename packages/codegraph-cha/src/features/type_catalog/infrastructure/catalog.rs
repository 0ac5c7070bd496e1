//! Type catalog construction
//!
//! Method set rules:
//! - Value set of `T`: value-receiver methods of `T`.
//! - Pointer set of `*T`: value- and pointer-receiver methods of `T`; a
//!   pointer-receiver method shadows a (synthetic) value one of the same name.
//! - Embedding `S` promotes the set of `S` for the same mode; embedding `*S`
//!   promotes the pointer set of `S` in both modes.
//! - The shallowest depth wins. Two different functions at the same
//!   shallowest depth are ambiguous and neither is in the set; reaching the
//!   same function along two paths is not ambiguous.
//! - Selection ignores the mode: a pointer-receiver method reached in value
//!   mode still hides deeper methods of its name and still collides with
//!   others at its depth, but is not itself in the value set.
//!
//! Promotion is resolved breadth-first, one embedding level at a time, and
//! each (type, mode) pair is expanded at most once, so embedding cycles
//! through pointers terminate.

use crate::features::type_catalog::domain::method_set::{DispatchMode, MethodEntry, MethodSet};
use crate::shared::models::{InterfaceMethod, Program, TypeName};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Named types and interfaces of a program with precomputed method sets
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    /// Concrete named types, in name order
    types: Vec<TypeName>,
    value_sets: FxHashMap<TypeName, MethodSet>,
    pointer_sets: FxHashMap<TypeName, MethodSet>,
    interfaces: BTreeMap<TypeName, Vec<InterfaceMethod>>,
}

/// Method slot while resolving promotion. `callable` is false for a
/// pointer-receiver method reached in value mode: it still claims the name at
/// its depth but is left out of the final set.
enum Slot {
    Unique { entry: MethodEntry, callable: bool },
    Ambiguous,
}

impl TypeCatalog {
    /// Build the catalog for a whole program
    pub fn build(program: &Program, promote_embedded: bool) -> Self {
        Self::build_with(program, promote_embedded, false)
    }

    /// Build the catalog, computing method sets on the rayon pool when
    /// `parallel` is set
    pub fn build_with(program: &Program, promote_embedded: bool, parallel: bool) -> Self {
        let mut types: Vec<TypeName> = program
            .named_types()
            .iter()
            .map(|named| named.name.clone())
            .collect();
        types.sort();

        let compute = |name: &TypeName| {
            let value = collect_method_set(program, name, DispatchMode::Value, promote_embedded);
            let pointer =
                collect_method_set(program, name, DispatchMode::Pointer, promote_embedded);
            (name.clone(), value, pointer)
        };
        let computed: Vec<(TypeName, MethodSet, MethodSet)> = if parallel {
            types.par_iter().map(compute).collect()
        } else {
            types.iter().map(compute).collect()
        };

        let mut value_sets = FxHashMap::default();
        let mut pointer_sets = FxHashMap::default();
        for (name, value, pointer) in computed {
            value_sets.insert(name.clone(), value);
            pointer_sets.insert(name, pointer);
        }

        let interfaces = program
            .interfaces()
            .iter()
            .filter_map(|iface| {
                program
                    .interface_methods(&iface.name)
                    .map(|methods| (iface.name.clone(), methods.to_vec()))
            })
            .collect();

        tracing::debug!(
            "type catalog: {} named types, {} interfaces (promotion={})",
            types.len(),
            program.interfaces().len(),
            promote_embedded
        );

        Self {
            types,
            value_sets,
            pointer_sets,
            interfaces,
        }
    }

    /// Every concrete named type, in name order
    pub fn all_types(&self) -> &[TypeName] {
        &self.types
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Method set of `ty` reachable in `mode`; `None` for unknown types
    pub fn method_set(&self, ty: &TypeName, mode: DispatchMode) -> Option<&MethodSet> {
        match mode {
            DispatchMode::Value => self.value_sets.get(ty),
            DispatchMode::Pointer => self.pointer_sets.get(ty),
        }
    }

    /// Required methods of an interface, embedded interfaces included
    pub fn interface_methods(&self, iface: &TypeName) -> Option<&[InterfaceMethod]> {
        self.interfaces.get(iface).map(Vec::as_slice)
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &TypeName> + '_ {
        self.interfaces.keys()
    }

    /// Whether `ty` in `mode` satisfies `iface`
    pub fn implements(&self, ty: &TypeName, mode: DispatchMode, iface: &TypeName) -> bool {
        match (self.method_set(ty, mode), self.interface_methods(iface)) {
            (Some(set), Some(required)) => set.satisfies(required),
            _ => false,
        }
    }

    /// Every (type, mode) pair satisfying `iface`, in type order
    pub fn implementors(&self, iface: &TypeName) -> Vec<(&TypeName, DispatchMode)> {
        self.types
            .iter()
            .flat_map(|ty| DispatchMode::ALL.into_iter().map(move |mode| (ty, mode)))
            .filter(|(ty, mode)| self.implements(ty, *mode, iface))
            .collect()
    }
}

/// Methods declared directly on `ty`, each paired with whether it can be
/// called in `mode`. A pointer-receiver method replaces a value one of the
/// same name only in pointer mode.
fn declared_entries(
    program: &Program,
    ty: &TypeName,
    mode: DispatchMode,
) -> BTreeMap<String, (MethodEntry, bool)> {
    let mut entries: BTreeMap<String, (MethodEntry, bool)> = BTreeMap::new();
    for func in program.declared_methods(ty) {
        let Some(recv) = &func.receiver else { continue };
        let entry = MethodEntry {
            function: func.id,
            signature: func.signature.clone(),
            depth: 0,
        };
        let callable = !recv.pointer || mode == DispatchMode::Pointer;
        match entries.entry(func.name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert((entry, callable));
            }
            Entry::Occupied(mut slot) => {
                let held = slot.get().1;
                if callable && (!held || recv.pointer) {
                    slot.insert((entry, callable));
                }
            }
        }
    }
    entries
}

fn collect_method_set(
    program: &Program,
    root: &TypeName,
    mode: DispatchMode,
    promote_embedded: bool,
) -> MethodSet {
    let mut found: BTreeMap<String, Slot> = BTreeMap::new();
    let mut seen: FxHashSet<(&TypeName, DispatchMode)> = FxHashSet::default();
    let mut level: Vec<(&TypeName, DispatchMode)> = vec![(root, mode)];
    let mut depth = 0u32;

    while !level.is_empty() {
        let mut at_depth: BTreeMap<String, Slot> = BTreeMap::new();
        let mut next = Vec::new();

        for (ty, mode) in level {
            if !seen.insert((ty, mode)) {
                continue;
            }
            for (name, (mut entry, callable)) in declared_entries(program, ty, mode) {
                if found.contains_key(&name) {
                    continue;
                }
                entry.depth = depth;
                match at_depth.entry(name) {
                    Entry::Vacant(slot) => {
                        slot.insert(Slot::Unique { entry, callable });
                    }
                    Entry::Occupied(mut slot) => {
                        let merged = match slot.get() {
                            Slot::Unique {
                                entry: held,
                                callable: held_callable,
                            } if held.function == entry.function => Slot::Unique {
                                entry,
                                callable: callable || *held_callable,
                            },
                            _ => Slot::Ambiguous,
                        };
                        slot.insert(merged);
                    }
                }
            }
            if !promote_embedded {
                continue;
            }
            if let Some(named) = program.named_type(ty) {
                for field in &named.embedded {
                    let field_mode = if field.pointer {
                        DispatchMode::Pointer
                    } else {
                        mode
                    };
                    next.push((&field.ty, field_mode));
                }
            }
        }

        found.extend(at_depth);
        level = next;
        depth += 1;
    }

    let methods = found
        .into_iter()
        .filter_map(|(name, slot)| match slot {
            Slot::Unique {
                entry,
                callable: true,
            } => Some((name, entry)),
            _ => None,
        })
        .collect();
    MethodSet::from_map(methods)
}
