//! Feature modules - each feature follows Hexagonal Architecture
//!
//! - domain/         - plain data, no analysis logic
//! - ports/          - trait seams
//! - application/    - use cases
//! - infrastructure/ - index and table construction
//!
//! Dependency order: type_catalog → dispatch → call_graph → cha

pub mod call_graph;
pub mod cha;
pub mod dispatch;
pub mod type_catalog;
