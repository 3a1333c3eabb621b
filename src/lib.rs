#![warn(clippy::all, clippy::cargo)]

//! A fixed-size Game of Life simulator driven by a pool of long-lived
//! workers synchronized with a hand-rolled spin barrier. Each generation the
//! engine snapshots the grid, fans the update out over the workers and
//! commits a color-graded packed-pixel buffer; a presentation layer consumes
//! it through "advance one generation, read resulting pixels".

mod config;
mod engine;
mod error;
mod pool;
mod rule;
mod store;
mod topology;

pub use config::EngineConfig;
pub use engine::SimulationEngine;
pub use error::{ConfigError, EngineError};
pub use pool::partition;
pub use rule::{count_alive_neighbors, next_state, step_cell, CellColor};
pub use store::GenerationStore;
pub use topology::{Cell, GridTopology, MOORE_NEIGHBORS};
