//! Program: the closed world handed to the analysis
//!
//! A [`Program`] can only be obtained through validation, either from a
//! [`ProgramBuilder`] or from a serialized [`ProgramData`] document. Every
//! static callee, receiver type, embedded type and method descriptor it
//! contains is known to resolve.

use super::function::{
    CallMode, CallSite, CallTarget, Function, FunctionOrigin, Instruction, MethodDescriptor,
};
use super::ids::{CallSiteId, FunctionId};
use super::types::{
    EmbeddedField, InterfaceMethod, InterfaceType, NamedType, Receiver, Signature, Type, TypeName,
};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Malformed program input
#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("duplicate function '{0}'")]
    DuplicateFunction(String),

    #[error("duplicate type '{0}'")]
    DuplicateType(TypeName),

    #[error("unknown type '{name}' referenced by {context}")]
    UnknownType { name: TypeName, context: String },

    #[error("type '{owner}' embeds interface '{embedded}'; lower it to wrapper methods first")]
    EmbeddedInterface { owner: TypeName, embedded: TypeName },

    #[error("interface '{0}' embeds itself")]
    InterfaceCycle(TypeName),

    #[error("interface '{interface}' has conflicting declarations of method '{method}'")]
    ConflictingInterfaceMethod { interface: TypeName, method: String },

    #[error("type '{ty}' declares method '{method}' twice")]
    DuplicateMethod { ty: TypeName, method: String },

    #[error("{context}: variadic signature must end in a slice parameter")]
    InvalidVariadic { context: String },

    #[error("instruction added to unknown function {0}")]
    UnknownCaller(FunctionId),

    #[error("{site}: static callee {callee} is not part of the program")]
    DanglingCallee { site: CallSiteId, callee: FunctionId },

    #[error("{site}: unknown interface '{interface}'")]
    UnknownInterface { site: CallSiteId, interface: TypeName },

    #[error("{site}: interface '{interface}' has no method {method}")]
    UnknownMethod {
        site: CallSiteId,
        interface: TypeName,
        method: String,
    },

    #[error("invalid program document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialized form of a program, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramData {
    #[serde(default)]
    pub functions: Vec<Function>,
    #[serde(default)]
    pub named_types: Vec<NamedType>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceType>,
}

/// Validated, immutable program
#[derive(Debug, Clone)]
pub struct Program {
    functions: Vec<Function>,
    named_types: Vec<NamedType>,
    interfaces: Vec<InterfaceType>,
    type_index: FxHashMap<TypeName, usize>,
    interface_index: FxHashMap<TypeName, usize>,
    /// Flattened through embedding, sorted by method name
    interface_methods: FxHashMap<TypeName, Vec<InterfaceMethod>>,
    /// Receiver type → methods declared on it, in function order
    methods_by_type: FxHashMap<TypeName, Vec<FunctionId>>,
}

impl Program {
    /// Parse and validate a JSON [`ProgramData`] document
    pub fn from_json(json: &str) -> Result<Self, ProgramError> {
        let data: ProgramData = serde_json::from_str(json)?;
        Self::try_from(data)
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn function(&self, id: FunctionId) -> Option<&Function> {
        self.functions.get(id.index())
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn named_types(&self) -> &[NamedType] {
        &self.named_types
    }

    pub fn named_type(&self, name: &TypeName) -> Option<&NamedType> {
        self.type_index.get(name).map(|&i| &self.named_types[i])
    }

    pub fn interfaces(&self) -> &[InterfaceType] {
        &self.interfaces
    }

    pub fn interface(&self, name: &TypeName) -> Option<&InterfaceType> {
        self.interface_index.get(name).map(|&i| &self.interfaces[i])
    }

    /// Full method requirement of an interface, embedded interfaces included
    pub fn interface_methods(&self, name: &TypeName) -> Option<&[InterfaceMethod]> {
        self.interface_methods.get(name).map(Vec::as_slice)
    }

    /// Methods declared with `ty` as receiver (value or pointer)
    pub fn declared_methods(&self, ty: &TypeName) -> impl Iterator<Item = &Function> + '_ {
        self.methods_by_type
            .get(ty)
            .into_iter()
            .flatten()
            .map(move |id| &self.functions[id.index()])
    }

    pub fn call_site(&self, id: CallSiteId) -> Option<&CallSite> {
        self.function(id.caller)?
            .instructions
            .get(id.index as usize)
            .and_then(Instruction::as_call)
    }

    /// Every call site of the program, in function then instruction order
    pub fn call_sites(&self) -> impl Iterator<Item = (CallSiteId, &CallSite)> + '_ {
        self.functions.iter().flat_map(Function::call_sites)
    }

    /// Back to the serializable form
    pub fn to_data(&self) -> ProgramData {
        ProgramData {
            functions: self.functions.clone(),
            named_types: self.named_types.clone(),
            interfaces: self.interfaces.clone(),
        }
    }
}

impl TryFrom<ProgramData> for Program {
    type Error = ProgramError;

    fn try_from(mut data: ProgramData) -> Result<Self, Self::Error> {
        for (index, func) in data.functions.iter_mut().enumerate() {
            func.id = FunctionId::from_index(index);
        }

        let (type_index, interface_index) = index_types(&data)?;
        let known = |name: &TypeName| {
            type_index.contains_key(name) || interface_index.contains_key(name)
        };

        for named in &data.named_types {
            for field in &named.embedded {
                if interface_index.contains_key(&field.ty) {
                    return Err(ProgramError::EmbeddedInterface {
                        owner: named.name.clone(),
                        embedded: field.ty.clone(),
                    });
                }
                if !type_index.contains_key(&field.ty) {
                    return Err(unknown_type(&field.ty, format!("embedding in '{}'", named.name)));
                }
            }
            if let Some(underlying) = &named.underlying {
                check_type_refs(underlying, &known, || format!("type '{}'", named.name))?;
            }
        }

        for iface in &data.interfaces {
            for embedded in &iface.embedded {
                if !interface_index.contains_key(embedded) {
                    return Err(unknown_type(embedded, format!("interface '{}'", iface.name)));
                }
            }
            for method in &iface.methods {
                let context = || format!("method '{}' of interface '{}'", method.name, iface.name);
                check_signature(&method.signature, &known, context)?;
            }
        }

        let interface_methods = flatten_interfaces(&data.interfaces, &interface_index)?;

        let mut seen_names = FxHashSet::default();
        let mut methods_by_type: FxHashMap<TypeName, Vec<FunctionId>> = FxHashMap::default();
        for func in &data.functions {
            let qualified = func.qualified_name();
            let context = || format!("function '{}'", qualified);
            check_signature(&func.signature, &known, context)?;
            if let Some(recv) = &func.receiver {
                if !type_index.contains_key(&recv.ty) {
                    return Err(unknown_type(&recv.ty, format!("receiver of '{}'", qualified)));
                }
                methods_by_type
                    .entry(recv.ty.clone())
                    .or_default()
                    .push(func.id);
            }
            if !seen_names.insert(qualified.clone()) {
                return Err(ProgramError::DuplicateFunction(qualified));
            }
        }

        for (ty, methods) in &methods_by_type {
            check_method_clashes(ty, methods, &data.functions)?;
        }

        let function_count = data.functions.len();
        for func in &data.functions {
            for (site, call) in func.call_sites() {
                match &call.target {
                    CallTarget::Static { callee } => {
                        if callee.index() >= function_count {
                            return Err(ProgramError::DanglingCallee {
                                site,
                                callee: *callee,
                            });
                        }
                    }
                    CallTarget::Invoke { method } => {
                        check_descriptor(site, method, &interface_methods)?;
                        check_signature(&method.signature, &known, || format!("call site {}", site))?;
                    }
                    CallTarget::Indirect { signature } => {
                        check_signature(signature, &known, || format!("call site {}", site))?;
                    }
                    CallTarget::Builtin { .. } => {}
                }
            }
        }

        Ok(Program {
            functions: data.functions,
            named_types: data.named_types,
            interfaces: data.interfaces,
            type_index,
            interface_index,
            interface_methods,
            methods_by_type,
        })
    }
}

fn unknown_type(name: &TypeName, context: String) -> ProgramError {
    ProgramError::UnknownType {
        name: name.clone(),
        context,
    }
}

fn index_types(
    data: &ProgramData,
) -> Result<(FxHashMap<TypeName, usize>, FxHashMap<TypeName, usize>), ProgramError> {
    let mut type_index = FxHashMap::default();
    let mut interface_index = FxHashMap::default();
    for (i, named) in data.named_types.iter().enumerate() {
        if type_index.insert(named.name.clone(), i).is_some() {
            return Err(ProgramError::DuplicateType(named.name.clone()));
        }
    }
    for (i, iface) in data.interfaces.iter().enumerate() {
        if type_index.contains_key(&iface.name)
            || interface_index.insert(iface.name.clone(), i).is_some()
        {
            return Err(ProgramError::DuplicateType(iface.name.clone()));
        }
    }
    Ok((type_index, interface_index))
}

fn check_type_refs(
    ty: &Type,
    known: &impl Fn(&TypeName) -> bool,
    context: impl Fn() -> String,
) -> Result<(), ProgramError> {
    let mut refs = Vec::new();
    ty.named_refs(&mut refs);
    match refs.into_iter().find(|name| !known(name)) {
        Some(missing) => Err(unknown_type(missing, context())),
        None => Ok(()),
    }
}

fn check_signature(
    sig: &Signature,
    known: &impl Fn(&TypeName) -> bool,
    context: impl Fn() -> String,
) -> Result<(), ProgramError> {
    if sig.variadic && !matches!(sig.params.last(), Some(Type::Slice(_))) {
        return Err(ProgramError::InvalidVariadic { context: context() });
    }
    let mut refs = Vec::new();
    sig.named_refs(&mut refs);
    match refs.into_iter().find(|name| !known(name)) {
        Some(missing) => Err(unknown_type(missing, context())),
        None => Ok(()),
    }
}

/// Two methods of one name on a type are allowed only as a source method plus
/// a synthetic one on the other receiver kind.
fn check_method_clashes(
    ty: &TypeName,
    methods: &[FunctionId],
    functions: &[Function],
) -> Result<(), ProgramError> {
    let mut by_name: BTreeMap<&str, Vec<&Function>> = BTreeMap::new();
    for id in methods {
        let func = &functions[id.index()];
        by_name.entry(func.name.as_str()).or_default().push(func);
    }
    for (name, funcs) in by_name {
        let clash = match funcs.as_slice() {
            [_] => false,
            [a, b] => {
                let pointer = |f: &Function| f.receiver.as_ref().map_or(false, |r| r.pointer);
                pointer(a) == pointer(b)
                    || (a.origin != FunctionOrigin::Synthetic && b.origin != FunctionOrigin::Synthetic)
            }
            _ => true,
        };
        if clash {
            return Err(ProgramError::DuplicateMethod {
                ty: ty.clone(),
                method: name.to_string(),
            });
        }
    }
    Ok(())
}

fn flatten_interfaces(
    interfaces: &[InterfaceType],
    index: &FxHashMap<TypeName, usize>,
) -> Result<FxHashMap<TypeName, Vec<InterfaceMethod>>, ProgramError> {
    fn visit(
        name: &TypeName,
        interfaces: &[InterfaceType],
        index: &FxHashMap<TypeName, usize>,
        in_progress: &mut FxHashSet<TypeName>,
        done: &mut FxHashMap<TypeName, Vec<InterfaceMethod>>,
    ) -> Result<(), ProgramError> {
        if done.contains_key(name) {
            return Ok(());
        }
        if !in_progress.insert(name.clone()) {
            return Err(ProgramError::InterfaceCycle(name.clone()));
        }
        let iface = &interfaces[index[name]];
        let mut methods: BTreeMap<String, Signature> = BTreeMap::new();
        let mut merge = |method: &InterfaceMethod| match methods.get(&method.name) {
            Some(existing) if *existing != method.signature => {
                Err(ProgramError::ConflictingInterfaceMethod {
                    interface: name.clone(),
                    method: method.name.clone(),
                })
            }
            Some(_) => Ok(()),
            None => {
                methods.insert(method.name.clone(), method.signature.clone());
                Ok(())
            }
        };
        for method in &iface.methods {
            merge(method)?;
        }
        for embedded in &iface.embedded {
            visit(embedded, interfaces, index, in_progress, done)?;
            for method in &done[embedded] {
                merge(method)?;
            }
        }
        in_progress.remove(name);
        let flat = methods
            .into_iter()
            .map(|(name, signature)| InterfaceMethod { name, signature })
            .collect();
        done.insert(name.clone(), flat);
        Ok(())
    }

    let mut done = FxHashMap::default();
    let mut in_progress = FxHashSet::default();
    for iface in interfaces {
        visit(&iface.name, interfaces, index, &mut in_progress, &mut done)?;
    }
    Ok(done)
}

fn check_descriptor(
    site: CallSiteId,
    method: &MethodDescriptor,
    interface_methods: &FxHashMap<TypeName, Vec<InterfaceMethod>>,
) -> Result<(), ProgramError> {
    let Some(required) = interface_methods.get(&method.interface) else {
        return Err(ProgramError::UnknownInterface {
            site,
            interface: method.interface.clone(),
        });
    };
    let declared = required
        .iter()
        .any(|m| m.name == method.name && m.signature == method.signature);
    if declared {
        Ok(())
    } else {
        Err(ProgramError::UnknownMethod {
            site,
            interface: method.interface.clone(),
            method: format!("{}{}", method.name, method.signature),
        })
    }
}

/// Incremental program construction
///
/// Types and functions default to the builder's package.
#[derive(Debug)]
pub struct ProgramBuilder {
    package: String,
    data: ProgramData,
    error: Option<ProgramError>,
}

impl ProgramBuilder {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            data: ProgramData::default(),
            error: None,
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Name of a type in the builder's package
    pub fn type_name(&self, name: &str) -> TypeName {
        TypeName::new(self.package.clone(), name)
    }

    pub fn named_type(&mut self, name: &str) -> TypeName {
        self.add_named_type(NamedType::new(self.type_name(name)))
    }

    /// Struct type with anonymous fields
    pub fn struct_type(&mut self, name: &str, embedded: Vec<EmbeddedField>) -> TypeName {
        let mut named = NamedType::new(self.type_name(name));
        named.embedded = embedded;
        self.add_named_type(named)
    }

    pub fn add_named_type(&mut self, named: NamedType) -> TypeName {
        let name = named.name.clone();
        self.data.named_types.push(named);
        name
    }

    pub fn interface<'a>(
        &mut self,
        name: &str,
        methods: impl IntoIterator<Item = (&'a str, Signature)>,
    ) -> TypeName {
        let iface = InterfaceType {
            name: self.type_name(name),
            methods: methods
                .into_iter()
                .map(|(name, signature)| InterfaceMethod {
                    name: name.to_string(),
                    signature,
                })
                .collect(),
            embedded: Vec::new(),
        };
        self.add_interface(iface)
    }

    pub fn add_interface(&mut self, iface: InterfaceType) -> TypeName {
        let name = iface.name.clone();
        self.data.interfaces.push(iface);
        name
    }

    pub fn function(&mut self, name: &str, signature: Signature) -> FunctionId {
        self.add_function(Function::new(self.package.clone(), name, signature))
    }

    pub fn method(&mut self, receiver: Receiver, name: &str, signature: Signature) -> FunctionId {
        let func = Function::new(self.package.clone(), name, signature).with_receiver(receiver);
        self.add_function(func)
    }

    pub fn add_function(&mut self, mut func: Function) -> FunctionId {
        let id = FunctionId::from_index(self.data.functions.len());
        func.id = id;
        self.data.functions.push(func);
        id
    }

    pub fn call(&mut self, caller: FunctionId, callee: FunctionId) -> CallSiteId {
        self.call_site(caller, CallSite::new(CallTarget::Static { callee }))
    }

    pub fn go(&mut self, caller: FunctionId, callee: FunctionId) -> CallSiteId {
        let site = CallSite::new(CallTarget::Static { callee }).with_mode(CallMode::Go);
        self.call_site(caller, site)
    }

    pub fn defer(&mut self, caller: FunctionId, callee: FunctionId) -> CallSiteId {
        let site = CallSite::new(CallTarget::Static { callee }).with_mode(CallMode::Defer);
        self.call_site(caller, site)
    }

    pub fn invoke(&mut self, caller: FunctionId, method: MethodDescriptor) -> CallSiteId {
        self.call_site(caller, CallSite::new(CallTarget::Invoke { method }))
    }

    pub fn call_indirect(&mut self, caller: FunctionId, signature: Signature) -> CallSiteId {
        self.call_site(caller, CallSite::new(CallTarget::Indirect { signature }))
    }

    pub fn call_builtin(&mut self, caller: FunctionId, name: &str) -> CallSiteId {
        let target = CallTarget::Builtin {
            name: name.to_string(),
        };
        self.call_site(caller, CallSite::new(target))
    }

    pub fn call_site(&mut self, caller: FunctionId, site: CallSite) -> CallSiteId {
        let index = self.instruction(caller, Instruction::Call(site));
        CallSiteId::new(caller, index)
    }

    /// Append an instruction, returning its position
    pub fn instruction(&mut self, caller: FunctionId, inst: Instruction) -> usize {
        match self.data.functions.get_mut(caller.index()) {
            Some(func) => {
                func.instructions.push(inst);
                func.instructions.len() - 1
            }
            None => {
                self.error.get_or_insert(ProgramError::UnknownCaller(caller));
                0
            }
        }
    }

    pub fn build(self) -> Result<Program, ProgramError> {
        match self.error {
            Some(err) => Err(err),
            None => Program::try_from(self.data),
        }
    }
}
