pub mod render;
pub mod visit;
