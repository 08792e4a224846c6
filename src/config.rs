//! Planner configuration and validation.
//!
//! The planner is tuned by two numbers: `max_chunk_size`, an upper bound
//! on chunk length in characters, and `epsilon`, the per-edge cost of
//! reusing a previously-seen chunk. Both are validated once, at
//! construction, rather than re-checked on every `plan` call.

use crate::error::{KaraError, Result};

/// Default reuse cost, matching spec.md's resolution of the epsilon
/// default (one reference copy used `0.01`, another `0.1`; `0.01` is
/// specified).
pub const DEFAULT_EPSILON: f64 = 0.01;

/// Validated tuning parameters for [`crate::planner::plan`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerConfig {
    max_chunk_size: usize,
    epsilon: f64,
}

impl PlannerConfig {
    /// Construct a config, validating both fields.
    ///
    /// # Errors
    ///
    /// Returns [`KaraError::InvalidConfiguration`] if `max_chunk_size == 0`
    /// or `epsilon` is not strictly between `0.0` and `1.0`.
    pub fn new(max_chunk_size: usize, epsilon: f64) -> Result<Self> {
        if max_chunk_size == 0 {
            return Err(KaraError::InvalidConfiguration(
                "max_chunk_size must be > 0".to_string(),
            ));
        }
        if !(epsilon > 0.0 && epsilon < 1.0) {
            return Err(KaraError::InvalidConfiguration(format!(
                "epsilon must be in (0, 1), got {epsilon}"
            )));
        }
        Ok(Self {
            max_chunk_size,
            epsilon,
        })
    }

    /// Construct a config with the default epsilon (`0.01`).
    pub fn with_max_chunk_size(max_chunk_size: usize) -> Result<Self> {
        Self::new(max_chunk_size, DEFAULT_EPSILON)
    }

    /// Upper bound on chunk length, in characters.
    #[must_use]
    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Per-edge cost of reusing a previously-seen chunk.
    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}
