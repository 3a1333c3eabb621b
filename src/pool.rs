//! Fixed pool of long-lived workers coordinated by a spin barrier.
//!
//! Each worker owns one contiguous slice of the cell index space and applies
//! the update rule to it once per generation. The handshake is two-phase:
//! workers wait for "go" to assert, report done, then wait for "go" to
//! de-assert. Every transition uses acquire/release atomics so grid writes of
//! one generation are visible to the `previous` reads of the next.

use std::hint;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::rule;
use crate::store::GenerationStore;
use crate::topology::GridTopology;

/// Splits `[0, n)` into `k` contiguous, non-overlapping, gap-free ranges
/// whose sizes differ by at most one.
pub fn partition(n: usize, k: usize) -> Vec<Range<usize>> {
    assert!(k > 0);
    (0..k).map(|i| (n * i) / k..(n * (i + 1)) / k).collect()
}

/// Barrier coordination signals shared by the controller and all workers.
pub(crate) struct BarrierFlags {
    /// Asserted by the controller for the duration of one generation.
    go: AtomicBool,
    /// Cooperative shutdown; checked by workers at the Idle -> Working
    /// transition, so cancellation lands on generation boundaries only.
    stop: AtomicBool,
    /// Set by a worker whose update pass panicked.
    failed: AtomicBool,
    /// One flag per worker, set when its slice is finished.
    done: Box<[AtomicBool]>,
}

impl BarrierFlags {
    pub(crate) fn new(workers: usize) -> Self {
        Self {
            go: AtomicBool::new(false),
            stop: AtomicBool::new(false),
            failed: AtomicBool::new(false),
            done: (0..workers).map(|_| AtomicBool::new(false)).collect(),
        }
    }

    pub(crate) fn open_generation(&self) {
        self.go.store(true, Ordering::Release);
    }

    pub(crate) fn close_generation(&self) {
        self.go.store(false, Ordering::Release);
    }

    pub(crate) fn all_done(&self) -> bool {
        self.done.iter().all(|flag| flag.load(Ordering::Acquire))
    }

    pub(crate) fn all_idle(&self) -> bool {
        self.done.iter().all(|flag| !flag.load(Ordering::Acquire))
    }

    pub(crate) fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub(crate) fn stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    pub(crate) fn failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }
}

/// Everything a worker touches: the immutable topology, the shared store and
/// the barrier flags.
pub(crate) struct SimShared {
    pub(crate) topology: GridTopology,
    pub(crate) store: GenerationStore,
    pub(crate) sync: BarrierFlags,
}

fn update_range(shared: &SimShared, range: Range<usize>) {
    // Safe per the store contract: we are inside the Working phase, the
    // snapshot is complete and `previous` stays untouched until every worker
    // reports done.
    let previous = unsafe { shared.store.previous() };
    for i in range {
        let cell = shared.topology.cell(i);
        if cell.disabled {
            continue;
        }
        let color = unsafe { shared.store.color(i) };
        let (alive, color, pixel) = rule::step_cell(cell, previous, color);
        unsafe { shared.store.commit(i, alive, color, pixel) };
    }
}

fn worker_loop(shared: &SimShared, worker: usize, range: Range<usize>) {
    let sync = &shared.sync;
    loop {
        // Idle: spin until the controller opens a generation.
        while !sync.go.load(Ordering::Acquire) {
            if sync.stop.load(Ordering::Acquire) {
                return;
            }
            hint::spin_loop();
        }

        // A panic inside the pass must not leave the controller spinning on
        // a never-set done flag, so it is caught, flagged and the handshake
        // still runs to completion before the worker exits.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            update_range(shared, range.clone());
        }));
        if outcome.is_err() {
            sync.failed.store(true, Ordering::Release);
            sync.stop.store(true, Ordering::Release);
        }

        sync.done[worker].store(true, Ordering::Release);
        // Hold in Done until the controller acknowledges the generation;
        // without this a fast worker could re-enter its slice early.
        while sync.go.load(Ordering::Acquire) {
            hint::spin_loop();
        }
        sync.done[worker].store(false, Ordering::Release);

        if outcome.is_err() {
            return;
        }
    }
}

/// The worker threads themselves; created once, joined at engine teardown.
pub(crate) struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub(crate) fn spawn(shared: &Arc<SimShared>, workers: usize) -> std::io::Result<Self> {
        let ranges = partition(shared.topology.len(), workers);
        let mut handles = Vec::with_capacity(workers);
        for (idx, range) in ranges.into_iter().enumerate() {
            let worker_shared = Arc::clone(shared);
            let spawned = thread::Builder::new()
                .name(format!("life-worker-{idx}"))
                .spawn(move || worker_loop(&worker_shared, idx, range));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    // Release the workers spawned so far before bailing out.
                    shared.sync.request_stop();
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(err);
                }
            }
        }
        Ok(Self { handles })
    }

    /// Joins every worker. The stop flag must already be set; workers are
    /// spinning in Idle whenever no generation is in flight.
    pub(crate) fn join(&mut self) {
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}
