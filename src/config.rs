use crate::ConfigError;

/// Simulation parameters, validated eagerly before any state is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Number of long-lived worker threads; ideally at most the available
    /// parallelism, but any positive count is accepted.
    pub workers: usize,
    /// Sparsity divisor: an interior cell starts alive with probability
    /// `1 / sparsity`.
    pub sparsity: u32,
    /// Random seed for the initial state; `None` seeds from entropy and
    /// makes the run non-deterministic.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            workers: 8,
            sparsity: 2,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if self.height == 0 {
            return Err(ConfigError::ZeroHeight);
        }
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.sparsity == 0 {
            return Err(ConfigError::ZeroSparsity);
        }
        Ok(())
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }
}
