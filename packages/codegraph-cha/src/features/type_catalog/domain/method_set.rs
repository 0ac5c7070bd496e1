//! Method sets and dispatch modes

use crate::shared::models::{FunctionId, InterfaceMethod, Signature};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which capability set of a concrete type is reachable at a dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DispatchMode {
    /// The interface holds a `T`: value-receiver methods only
    Value,
    /// The interface holds a `*T`: value- and pointer-receiver methods
    Pointer,
}

impl DispatchMode {
    pub const ALL: [DispatchMode; 2] = [DispatchMode::Value, DispatchMode::Pointer];

    pub fn through_pointer(through_pointer: bool) -> Self {
        if through_pointer {
            DispatchMode::Pointer
        } else {
            DispatchMode::Value
        }
    }
}

/// One method of a method set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodEntry {
    /// Implementing function
    pub function: FunctionId,
    pub signature: Signature,
    /// 0 for declared methods, embedding depth for promoted ones
    pub depth: u32,
}

/// Method name → implementing function
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSet {
    methods: BTreeMap<String, MethodEntry>,
}

impl MethodSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_map(methods: BTreeMap<String, MethodEntry>) -> Self {
        Self { methods }
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&MethodEntry> {
        self.methods.get(name)
    }

    /// Exact lookup: same name and identical signature
    #[inline]
    pub fn lookup(&self, name: &str, signature: &Signature) -> Option<&MethodEntry> {
        self.methods
            .get(name)
            .filter(|entry| entry.signature == *signature)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Methods in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MethodEntry)> + '_ {
        self.methods.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Structural interface satisfaction: every required method is present
    /// with an identical signature.
    pub fn satisfies(&self, required: &[InterfaceMethod]) -> bool {
        required
            .iter()
            .all(|m| self.lookup(&m.name, &m.signature).is_some())
    }
}
