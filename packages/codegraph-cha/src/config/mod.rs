//! Configuration system
//!
//! A single [`ChaConfig`] controls call graph construction. It can be built
//! in code with builder-style setters or loaded from a versioned YAML file:
//!
//! ```yaml
//! version: 1
//! cha:
//!   parallel: true
//!   num_threads: 8
//!   promote_embedded: true
//! ```

pub mod cha_config;
pub mod error;
pub mod io;

pub use cha_config::ChaConfig;
pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigFileV1, SUPPORTED_VERSIONS};
