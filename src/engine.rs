//! The engine facade: composes topology, store and worker pool, and exposes
//! the advance/read/stop contract consumed by the presentation layer.

use std::hint;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::pool::{BarrierFlags, SimShared, WorkerPool};
use crate::store::GenerationStore;
use crate::topology::GridTopology;

pub struct SimulationEngine {
    shared: Arc<SimShared>,
    pool: WorkerPool,
    generation: u64,
}

impl SimulationEngine {
    /// Builds an engine with a randomly seeded initial state.
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let topology = GridTopology::build(config.width, config.height)?;
        let store = GenerationStore::init(&topology, config.sparsity, config.seed)?;
        Self::assemble(config, topology, store)
    }

    /// Builds an engine with every cell dead, for explicit pattern seeding.
    pub fn blank(config: &EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let topology = GridTopology::build(config.width, config.height)?;
        let store = GenerationStore::blank(&topology)?;
        Self::assemble(config, topology, store)
    }

    fn assemble(
        config: &EngineConfig,
        topology: GridTopology,
        store: GenerationStore,
    ) -> Result<Self, EngineError> {
        let shared = Arc::new(SimShared {
            topology,
            store,
            sync: BarrierFlags::new(config.workers),
        });
        let pool = WorkerPool::spawn(&shared, config.workers)?;
        tracing::info!(
            width = config.width,
            height = config.height,
            workers = config.workers,
            "simulation engine started"
        );
        Ok(Self {
            shared,
            pool,
            generation: 0,
        })
    }

    /// Advances the grid by one generation: snapshot, then one full barrier
    /// cycle over all workers. Returns only once every cell of the new
    /// generation has been committed.
    pub fn advance_generation(&mut self) -> Result<(), EngineError> {
        let sync = &self.shared.sync;
        if sync.stopped() {
            return Err(EngineError::Stopped);
        }

        // All workers are idle here, so rewriting `previous` is safe; the
        // release store on "go" publishes the snapshot to every worker.
        unsafe { self.shared.store.snapshot() };

        sync.open_generation();
        while !sync.all_done() {
            hint::spin_loop();
        }
        sync.close_generation();
        while !sync.all_idle() {
            hint::spin_loop();
        }

        if sync.failed() {
            // The faulting worker already stopped the pool.
            return Err(EngineError::WorkerPanicked);
        }
        self.generation += 1;
        Ok(())
    }

    /// Writes the packed ARGB pixel of every cell into `dst`, which must
    /// hold exactly `width * height` entries. The contents stay valid until
    /// the next [`Self::advance_generation`] call.
    pub fn read_pixels(&self, dst: &mut [u32]) {
        // No generation is in flight: advance_generation takes &mut self and
        // returns only after the full handshake.
        unsafe { self.shared.store.copy_pixels(dst) };
    }

    /// Signals the workers to exit at the next generation boundary.
    pub fn request_stop(&self) {
        tracing::debug!(generation = self.generation, "stop requested");
        self.shared.sync.request_stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.sync.stopped()
    }

    pub fn width(&self) -> usize {
        self.shared.topology.width()
    }

    pub fn height(&self) -> usize {
        self.shared.topology.height()
    }

    /// Number of generations produced so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get_cell(&self, x: usize, y: usize) -> bool {
        let i = self.shared.topology.index_of(x, y);
        unsafe { self.shared.store.alive(i) }
    }

    /// Overwrites the state of one cell. Setting a disabled (border) cell is
    /// a no-op: the border invariant is unconditional.
    pub fn set_cell(&mut self, x: usize, y: usize, alive: bool) {
        let i = self.shared.topology.index_of(x, y);
        if self.shared.topology.cell(i).disabled {
            return;
        }
        unsafe { self.shared.store.set_alive(i, alive) };
    }
}

impl Drop for SimulationEngine {
    fn drop(&mut self) {
        self.shared.sync.request_stop();
        self.pool.join();
        tracing::debug!(generation = self.generation, "simulation engine torn down");
    }
}
