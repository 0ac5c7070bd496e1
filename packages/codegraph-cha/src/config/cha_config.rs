//! Call graph construction settings

use super::error::{ConfigError, ConfigResult};
use crate::features::dispatch::DispatchPolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChaConfig {
    /// Build the dispatch table and edge lists with rayon
    pub parallel: bool,

    /// Minimum number of functions before parallel construction is used
    pub parallel_threshold: usize,

    /// Size of a dedicated worker pool (None = global rayon pool)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_threads: Option<usize>,

    /// Count methods promoted through embedded fields toward method sets
    pub promote_embedded: bool,

    /// Resolve calls through function values to every function of the
    /// same signature
    pub resolve_indirect_calls: bool,

    /// Whether interface calls require the receiver type to implement the
    /// whole interface or only the called method
    pub dispatch_policy: DispatchPolicy,
}

impl ChaConfig {
    /// Field names accepted in the `cha` section of a config file
    pub const FIELDS: &'static [&'static str] = &[
        "parallel",
        "parallel_threshold",
        "num_threads",
        "promote_embedded",
        "resolve_indirect_calls",
        "dispatch_policy",
    ];

    /// Everything on a single thread, for reproducible debugging
    pub fn sequential() -> Self {
        Self::default().parallel(false)
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.parallel_threshold == 0 || self.parallel_threshold > 1_000_000 {
            return Err(ConfigError::range_with_hint(
                "parallel_threshold",
                self.parallel_threshold,
                1,
                1_000_000,
                "Threshold is a function count",
            ));
        }

        if let Some(n) = self.num_threads {
            if n == 0 || n > 512 {
                return Err(ConfigError::range_with_hint(
                    "num_threads",
                    n,
                    1,
                    512,
                    "Use None for the global rayon pool",
                ));
            }
            if !self.parallel {
                return Err(ConfigError::Validation(
                    "num_threads is set but parallel construction is disabled".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Builder: Set parallel
    pub fn parallel(mut self, v: bool) -> Self {
        self.parallel = v;
        self
    }

    /// Builder: Set parallel_threshold
    pub fn parallel_threshold(mut self, v: usize) -> Self {
        self.parallel_threshold = v;
        self
    }

    /// Builder: Set num_threads
    pub fn num_threads(mut self, v: Option<usize>) -> Self {
        self.num_threads = v;
        self
    }

    /// Builder: Set promote_embedded
    pub fn promote_embedded(mut self, v: bool) -> Self {
        self.promote_embedded = v;
        self
    }

    /// Builder: Set resolve_indirect_calls
    pub fn resolve_indirect_calls(mut self, v: bool) -> Self {
        self.resolve_indirect_calls = v;
        self
    }

    /// Builder: Set dispatch_policy
    pub fn dispatch_policy(mut self, v: DispatchPolicy) -> Self {
        self.dispatch_policy = v;
        self
    }
}

impl Default for ChaConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: 256,
            num_threads: None,
            promote_embedded: true,
            resolve_indirect_calls: true,
            dispatch_policy: DispatchPolicy::MethodMatch,
        }
    }
}
