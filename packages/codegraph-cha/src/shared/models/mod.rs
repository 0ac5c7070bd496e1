//! Program model (functions, call sites, types)

pub mod function;
pub mod ids;
pub mod program;
pub mod types;

pub use function::{
    CallMode, CallSite, CallTarget, Function, FunctionOrigin, Instruction, MethodDescriptor,
};
pub use ids::{CallSiteId, FunctionId};
pub use program::{Program, ProgramBuilder, ProgramData, ProgramError};
pub use types::{
    EmbeddedField, InterfaceMethod, InterfaceType, NamedType, Receiver, Signature, Type, TypeName,
};
