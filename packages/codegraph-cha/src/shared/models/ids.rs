//! Stable identities for functions and call sites

use serde::{Deserialize, Serialize};
use std::fmt;

/// Function identity: index of the function inside its [`Program`].
///
/// [`Program`]: super::Program
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FunctionId(pub u32);

impl FunctionId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        FunctionId(index as u32)
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn#{}", self.0)
    }
}

/// Call site identity: the owning function plus the instruction position.
///
/// Ordering is (caller, index), which is program order inside a function.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CallSiteId {
    pub caller: FunctionId,
    pub index: u32,
}

impl CallSiteId {
    pub fn new(caller: FunctionId, index: usize) -> Self {
        Self {
            caller,
            index: index as u32,
        }
    }
}

impl fmt::Display for CallSiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.caller, self.index)
    }
}
