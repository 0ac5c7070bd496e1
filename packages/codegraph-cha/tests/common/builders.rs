//! Random program generation for property tests
//!
//! A [`ProgramShape`] is a plain description of a program that is valid by
//! construction: names are unique, embedding only points at earlier types,
//! and every descriptor names a method of its interface.

use codegraph_cha::{
    EmbeddedField, MethodDescriptor, Program, ProgramBuilder, Receiver, Signature, Type, TypeName,
};
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use std::collections::BTreeMap;

pub const METHOD_NAMES: [&str; 3] = ["a", "b", "c"];

/// Small signature pool so that name and signature collisions are common
pub fn signature(index: usize) -> Signature {
    match index % 3 {
        0 => Signature::empty(),
        1 => Signature::new(vec![], vec![Type::basic("float64")]),
        _ => Signature::new(vec![Type::basic("int")], vec![]),
    }
}

#[derive(Debug, Clone)]
pub struct TypeShape {
    /// method name index → (signature index, pointer receiver)
    pub methods: BTreeMap<usize, (usize, bool)>,
    /// (earlier type selector, embed by pointer)
    pub embeds: Option<(usize, bool)>,
}

#[derive(Debug, Clone)]
pub enum SiteShape {
    Static(usize),
    Invoke { interface: usize, method: usize },
    Indirect(usize),
    Builtin,
}

#[derive(Debug, Clone)]
pub struct FunctionShape {
    pub signature: usize,
    pub sites: Vec<SiteShape>,
}

#[derive(Debug, Clone)]
pub struct ProgramShape {
    /// Each interface: method name index → signature index
    pub interfaces: Vec<BTreeMap<usize, usize>>,
    pub types: Vec<TypeShape>,
    pub functions: Vec<FunctionShape>,
}

impl ProgramShape {
    pub fn build(&self) -> Program {
        self.builder().build().expect("generated program is valid")
    }

    /// Same program plus one more type implementing every method of
    /// interface `target` through pointer receivers
    pub fn build_with_implementor(&self, target: usize) -> Program {
        let mut b = self.builder();
        let extra = b.named_type("Extra");
        if !self.interfaces.is_empty() {
            let methods = &self.interfaces[target % self.interfaces.len()];
            for (&name, &sig) in methods {
                b.method(Receiver::pointer(extra.clone()), METHOD_NAMES[name], signature(sig));
            }
        }
        b.build().expect("generated program is valid")
    }

    /// Methods selectable on `T{index}` in value or pointer mode, found by
    /// walking its embedding chain: name index → (declaring type, signature
    /// index). The first declaration of a name along the chain claims it even
    /// when its receiver makes it uncallable in that mode.
    pub fn expected_method_set(
        &self,
        index: usize,
        pointer: bool,
    ) -> BTreeMap<usize, (usize, usize)> {
        let mut selected: BTreeMap<usize, (usize, usize, bool)> = BTreeMap::new();
        let mut current = index;
        let mut by_pointer = pointer;
        loop {
            for (&name, &(sig, pointer_receiver)) in &self.types[current].methods {
                selected
                    .entry(name)
                    .or_insert((current, sig, by_pointer || !pointer_receiver));
            }
            match self.types[current].embeds {
                Some((target, embed_pointer)) if current > 0 => {
                    current = target % current;
                    by_pointer |= embed_pointer;
                }
                _ => break,
            }
        }
        selected
            .into_iter()
            .filter(|(_, (_, _, callable))| *callable)
            .map(|(name, (owner, sig, _))| (name, (owner, sig)))
            .collect()
    }

    fn builder(&self) -> ProgramBuilder {
        let mut b = ProgramBuilder::new("gen");

        let interfaces: Vec<TypeName> = self
            .interfaces
            .iter()
            .enumerate()
            .map(|(i, methods)| {
                let methods = methods
                    .iter()
                    .map(|(&name, &sig)| (METHOD_NAMES[name], signature(sig)));
                b.interface(&format!("I{}", i), methods)
            })
            .collect();

        let mut types: Vec<TypeName> = Vec::with_capacity(self.types.len());
        for (i, shape) in self.types.iter().enumerate() {
            let embedded = match shape.embeds {
                Some((target, pointer)) if i > 0 => vec![EmbeddedField {
                    ty: types[target % i].clone(),
                    pointer,
                }],
                _ => Vec::new(),
            };
            types.push(b.struct_type(&format!("T{}", i), embedded));
        }
        for (shape, ty) in self.types.iter().zip(&types) {
            for (&name, &(sig, pointer)) in &shape.methods {
                let receiver = Receiver {
                    ty: ty.clone(),
                    pointer,
                };
                b.method(receiver, METHOD_NAMES[name], signature(sig));
            }
        }

        let ids: Vec<_> = self
            .functions
            .iter()
            .enumerate()
            .map(|(i, f)| b.function(&format!("f{}", i), signature(f.signature)))
            .collect();
        for (shape, &caller) in self.functions.iter().zip(&ids) {
            for site in &shape.sites {
                match site {
                    SiteShape::Static(callee) => {
                        b.call(caller, ids[callee % ids.len()]);
                    }
                    SiteShape::Invoke { interface, method } if !interfaces.is_empty() => {
                        let index = interface % interfaces.len();
                        let methods: Vec<(&usize, &usize)> =
                            self.interfaces[index].iter().collect();
                        let (&name, &sig) = methods[method % methods.len()];
                        let descriptor = MethodDescriptor::new(
                            interfaces[index].clone(),
                            METHOD_NAMES[name],
                            signature(sig),
                        );
                        b.invoke(caller, descriptor);
                    }
                    SiteShape::Invoke { .. } => {}
                    SiteShape::Indirect(sig) => {
                        b.call_indirect(caller, signature(*sig));
                    }
                    SiteShape::Builtin => {
                        b.call_builtin(caller, "len");
                    }
                }
            }
        }
        b
    }
}

fn site_shape() -> impl Strategy<Value = SiteShape> {
    prop_oneof![
        3 => any::<usize>().prop_map(SiteShape::Static),
        4 => (any::<usize>(), any::<usize>())
            .prop_map(|(interface, method)| SiteShape::Invoke { interface, method }),
        2 => (0..3usize).prop_map(SiteShape::Indirect),
        1 => Just(SiteShape::Builtin),
    ]
}

fn type_shape() -> impl Strategy<Value = TypeShape> {
    (
        btree_map(0..3usize, (0..3usize, any::<bool>()), 0..=3),
        proptest::option::of((any::<usize>(), any::<bool>())),
    )
        .prop_map(|(methods, embeds)| TypeShape { methods, embeds })
}

fn function_shape() -> impl Strategy<Value = FunctionShape> {
    (0..3usize, vec(site_shape(), 0..5))
        .prop_map(|(signature, sites)| FunctionShape { signature, sites })
}

pub fn program_shape() -> impl Strategy<Value = ProgramShape> {
    (
        vec(btree_map(0..3usize, 0..3usize, 1..=3), 0..4),
        vec(type_shape(), 0..7),
        vec(function_shape(), 1..8),
    )
        .prop_map(|(interfaces, types, functions)| ProgramShape {
            interfaces,
            types,
            functions,
        })
}
