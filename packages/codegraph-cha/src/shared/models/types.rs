//! Type model: named types, interfaces, signatures
//!
//! Types are compared structurally. Two [`Signature`]s are the same method
//! signature iff they are equal as values; there is no variance and no
//! overload resolution.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualified name of a named type or interface
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeName {
    pub package: String,
    pub name: String,
}

impl TypeName {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Name relative to `from`: unqualified inside the same package.
    pub fn relative_to(&self, from: Option<&str>) -> String {
        match from {
            Some(pkg) if pkg == self.package => self.name.clone(),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.package, self.name)
        }
    }
}

/// Structural type expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Basic(String),
    Named(TypeName),
    Pointer(Box<Type>),
    Slice(Box<Type>),
    Map(Box<Type>, Box<Type>),
    Func(Box<Signature>),
}

impl Type {
    pub fn basic(name: impl Into<String>) -> Self {
        Type::Basic(name.into())
    }

    pub fn named(package: impl Into<String>, name: impl Into<String>) -> Self {
        Type::Named(TypeName::new(package, name))
    }

    pub fn pointer_to(inner: Type) -> Self {
        Type::Pointer(Box::new(inner))
    }

    pub fn slice_of(elem: Type) -> Self {
        Type::Slice(Box::new(elem))
    }

    /// Every named type mentioned anywhere inside this type expression.
    pub fn named_refs<'a>(&'a self, out: &mut Vec<&'a TypeName>) {
        match self {
            Type::Basic(_) => {}
            Type::Named(name) => out.push(name),
            Type::Pointer(inner) | Type::Slice(inner) => inner.named_refs(out),
            Type::Map(key, value) => {
                key.named_refs(out);
                value.named_refs(out);
            }
            Type::Func(sig) => sig.named_refs(out),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Basic(name) => write!(f, "{}", name),
            Type::Named(name) => write!(f, "{}", name),
            Type::Pointer(inner) => write!(f, "*{}", inner),
            Type::Slice(elem) => write!(f, "[]{}", elem),
            Type::Map(key, value) => write!(f, "map[{}]{}", key, value),
            Type::Func(sig) => write!(f, "func{}", sig),
        }
    }
}

/// Parameter and result types of a function, receiver excluded
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub params: Vec<Type>,
    #[serde(default)]
    pub results: Vec<Type>,
    /// Last parameter is a variadic slice
    #[serde(default)]
    pub variadic: bool,
}

impl Signature {
    pub fn new(params: Vec<Type>, results: Vec<Type>) -> Self {
        Self {
            params,
            results,
            variadic: false,
        }
    }

    /// `func()`
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn named_refs<'a>(&'a self, out: &mut Vec<&'a TypeName>) {
        for ty in self.params.iter().chain(self.results.iter()) {
            ty.named_refs(out);
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        let last = self.params.len().saturating_sub(1);
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match param {
                Type::Slice(elem) if self.variadic && i == last => write!(f, "...{}", elem)?,
                _ => write!(f, "{}", param)?,
            }
        }
        write!(f, ")")?;
        match self.results.as_slice() {
            [] => Ok(()),
            [single] => write!(f, " {}", single),
            many => {
                write!(f, " (")?;
                for (i, result) in many.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", result)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Receiver of a method: the named type and whether it is taken by pointer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Receiver {
    pub ty: TypeName,
    #[serde(default)]
    pub pointer: bool,
}

impl Receiver {
    pub fn value(ty: TypeName) -> Self {
        Self { ty, pointer: false }
    }

    pub fn pointer(ty: TypeName) -> Self {
        Self { ty, pointer: true }
    }
}

/// Anonymous (embedded) field of a named struct type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmbeddedField {
    pub ty: TypeName,
    #[serde(default)]
    pub pointer: bool,
}

/// Concrete named type. Its methods are the functions whose receiver names it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedType {
    pub name: TypeName,
    /// Underlying type description, informational only
    #[serde(default)]
    pub underlying: Option<Type>,
    #[serde(default)]
    pub embedded: Vec<EmbeddedField>,
}

impl NamedType {
    pub fn new(name: TypeName) -> Self {
        Self {
            name,
            underlying: None,
            embedded: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterfaceMethod {
    pub name: String,
    pub signature: Signature,
}

/// Interface type: required methods, plus the interfaces it embeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceType {
    pub name: TypeName,
    #[serde(default)]
    pub methods: Vec<InterfaceMethod>,
    #[serde(default)]
    pub embedded: Vec<TypeName>,
}
