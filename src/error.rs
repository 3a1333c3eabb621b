use std::collections::TryReserveError;
use thiserror::Error;

/// Rejected configuration, reported before any allocation happens.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid width must be positive")]
    ZeroWidth,
    #[error("grid height must be positive")]
    ZeroHeight,
    #[error("worker count must be positive")]
    ZeroWorkers,
    #[error("sparsity divisor must be positive")]
    ZeroSparsity,
    #[error("grid of {0} cells exceeds the addressable cell limit")]
    GridTooLarge(usize),
}

/// Fatal engine faults. There are no recoverable runtime errors during
/// steady-state generation advance; everything here aborts the simulation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to allocate simulation state: {0}")]
    Allocation(#[from] TryReserveError),
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("a worker panicked during its update pass")]
    WorkerPanicked,
    #[error("engine is stopped")]
    Stopped,
}
