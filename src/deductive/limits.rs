//! Search configuration and the budget that bounds a single learning call.
//!
//! The wall clock is only tracked on native targets; `std::time::Instant` is
//! not available on wasm32, where only the expansion budget applies.

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

use crate::error::SynthesisError;

/// Limits for one learning call. The defaults are far above what the
/// reference scenarios need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLimits {
    /// Maximum operator nesting of a learned program
    pub max_depth: usize,

    /// Maximum number of node expansions (symbol learns and dependent
    /// branches) before giving up
    pub max_expansions: u64,

    /// Maximum wall-clock time in milliseconds
    pub max_time_ms: u64,

    /// Sub-spaces remembered per learning call
    pub cache_capacity: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_expansions: 250_000,
            max_time_ms: 5_000,
            cache_capacity: 4096,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// How many ranked programs a learning call returns
    pub top_k: usize,
    pub limits: ResourceLimits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            top_k: 4,
            limits: ResourceLimits::default(),
        }
    }
}

impl Config {
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }
}

pub struct Budget {
    max_expansions: u64,
    max_time_ms: u64,
    expansions: u64,
    #[cfg(not(target_arch = "wasm32"))]
    start_time: Instant,
}

impl Budget {
    pub fn new(limits: &ResourceLimits) -> Self {
        Self {
            max_expansions: limits.max_expansions,
            max_time_ms: limits.max_time_ms,
            expansions: 0,
            #[cfg(not(target_arch = "wasm32"))]
            start_time: Instant::now(),
        }
    }

    pub fn expansions(&self) -> u64 {
        self.expansions
    }

    /// Accounts for one expansion and fails once any limit is exceeded.
    pub fn tick(&mut self) -> Result<(), SynthesisError> {
        self.expansions += 1;
        if self.expansions > self.max_expansions {
            return Err(SynthesisError::BudgetExceeded {
                limit: "max_expansions",
                value: self.expansions,
            });
        }
        self.check_timeout()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn check_timeout(&self) -> Result<(), SynthesisError> {
        let elapsed_ms = self.start_time.elapsed().as_millis() as u64;
        if elapsed_ms > self.max_time_ms {
            return Err(SynthesisError::BudgetExceeded {
                limit: "max_time_ms",
                value: elapsed_ms,
            });
        }
        Ok(())
    }

    #[cfg(target_arch = "wasm32")]
    fn check_timeout(&self) -> Result<(), SynthesisError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expansion_budget() {
        let limits = ResourceLimits {
            max_expansions: 2,
            ..ResourceLimits::default()
        };
        let mut budget = Budget::new(&limits);
        assert!(budget.tick().is_ok());
        assert!(budget.tick().is_ok());
        assert_eq!(
            budget.tick(),
            Err(SynthesisError::BudgetExceeded {
                limit: "max_expansions",
                value: 3
            })
        );
        assert_eq!(budget.expansions(), 3);
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.top_k, 4);
        assert_eq!(config.limits.max_depth, 3);
        assert_eq!(Config::default().with_top_k(1).top_k, 1);
    }
}
