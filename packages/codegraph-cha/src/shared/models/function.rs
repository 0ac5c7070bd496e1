//! Functions, instructions and call sites

use super::ids::{CallSiteId, FunctionId};
use super::types::{Receiver, Signature, TypeName};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a function came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionOrigin {
    /// Declared in source
    #[default]
    Source,
    /// Anonymous function literal
    Closure,
    /// Compiler-generated (wrappers, thunks, bound methods)
    Synthetic,
    /// Package initializer; never address-taken
    PackageInit,
}

/// A function of the program, owning its instruction list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    /// Assigned from the position inside the program
    #[serde(default)]
    pub id: FunctionId,
    pub package: String,
    pub name: String,
    #[serde(default)]
    pub signature: Signature,
    #[serde(default)]
    pub receiver: Option<Receiver>,
    #[serde(default)]
    pub origin: FunctionOrigin,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
}

impl Function {
    pub fn new(package: impl Into<String>, name: impl Into<String>, signature: Signature) -> Self {
        Self {
            id: FunctionId::default(),
            package: package.into(),
            name: name.into(),
            signature,
            receiver: None,
            origin: FunctionOrigin::Source,
            instructions: Vec::new(),
        }
    }

    pub fn with_receiver(mut self, receiver: Receiver) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn with_origin(mut self, origin: FunctionOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }

    /// Whether a function value referring to this function can exist.
    ///
    /// Methods reach function values only through closures (bound methods,
    /// thunks), which are functions of their own.
    pub fn is_address_takeable(&self) -> bool {
        self.receiver.is_none() && self.origin != FunctionOrigin::PackageInit
    }

    /// Fully qualified name, unique within a program
    pub fn qualified_name(&self) -> String {
        self.relative_name(None)
    }

    /// Name relative to package `from`.
    ///
    /// Functions: `f` or `pkg.f`. Methods: `(T).m`, `(*T).m`, with `T`
    /// qualified when it lives in another package.
    pub fn relative_name(&self, from: Option<&str>) -> String {
        match &self.receiver {
            Some(recv) => {
                let star = if recv.pointer { "*" } else { "" };
                format!("({}{}).{}", star, recv.ty.relative_to(from), self.name)
            }
            None => match from {
                Some(pkg) if pkg == self.package => self.name.clone(),
                _ if self.package.is_empty() => self.name.clone(),
                _ => format!("{}.{}", self.package, self.name),
            },
        }
    }

    /// Call sites in program order
    pub fn call_sites(&self) -> impl Iterator<Item = (CallSiteId, &CallSite)> + '_ {
        let caller = self.id;
        self.instructions
            .iter()
            .enumerate()
            .filter_map(move |(index, inst)| match inst {
                Instruction::Call(site) => Some((CallSiteId::new(caller, index), site)),
                Instruction::Other(_) => None,
            })
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}

/// Instructions as far as call graph construction is concerned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instruction {
    Call(CallSite),
    /// Any non-call instruction, by opcode
    Other(String),
}

impl Instruction {
    pub fn as_call(&self) -> Option<&CallSite> {
        match self {
            Instruction::Call(site) => Some(site),
            Instruction::Other(_) => None,
        }
    }
}

/// Plain call, `go` statement or `defer` statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallMode {
    #[default]
    Call,
    Go,
    Defer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    #[serde(default)]
    pub mode: CallMode,
    pub target: CallTarget,
}

impl CallSite {
    pub fn new(target: CallTarget) -> Self {
        Self {
            mode: CallMode::Call,
            target,
        }
    }

    pub fn with_mode(mut self, mode: CallMode) -> Self {
        self.mode = mode;
        self
    }
}

/// What a call site refers to, classified by the front end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CallTarget {
    /// Direct call, or call through a value known to be one function
    Static { callee: FunctionId },
    /// Method call through an interface value
    Invoke { method: MethodDescriptor },
    /// Call through a function value of unknown identity
    Indirect { signature: Signature },
    /// Language intrinsic (`len`, `append`, ...)
    Builtin { name: String },
}

impl CallTarget {
    pub fn is_dynamic(&self) -> bool {
        matches!(self, CallTarget::Invoke { .. } | CallTarget::Indirect { .. })
    }
}

/// Abstract method: interface plus method name and signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub interface: TypeName,
    pub name: String,
    pub signature: Signature,
}

impl MethodDescriptor {
    pub fn new(interface: TypeName, name: impl Into<String>, signature: Signature) -> Self {
        Self {
            interface,
            name: name.into(),
            signature,
        }
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}).{}{}", self.interface, self.name, self.signature)
    }
}
