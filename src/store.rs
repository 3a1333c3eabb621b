//! Double-buffered generation state plus per-cell visual state.
//!
//! The arrays use interior mutability so the controller and the partitioned
//! workers can share one store through an `Arc`. The unsafe accessors encode
//! the barrier-protocol contract: `previous` is never written between a
//! snapshot and generation completion, and each index of `current`, the
//! colors and the pixels is written by exactly one worker per generation.

use std::cell::UnsafeCell;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::EngineError;
use crate::rule::CellColor;
use crate::topology::GridTopology;

pub struct GenerationStore {
    len: usize,
    /// Alive states being computed this generation.
    current: Box<[UnsafeCell<bool>]>,
    /// Immutable snapshot read by all workers during the update phase.
    previous: Box<[UnsafeCell<bool>]>,
    colors: Box<[UnsafeCell<CellColor>]>,
    pixels: Box<[UnsafeCell<u32>]>,
}

// Shared read/write access is governed by the barrier handshake; write-sets
// never overlap and every cross-generation access is ordered by the
// release/acquire transitions on the pool flags.
unsafe impl Sync for GenerationStore {}

fn alloc_cells<T>(
    n: usize,
    mut value: impl FnMut(usize) -> T,
) -> Result<Box<[UnsafeCell<T>]>, EngineError> {
    let mut v = Vec::new();
    v.try_reserve_exact(n)?;
    v.extend((0..n).map(|i| UnsafeCell::new(value(i))));
    Ok(v.into_boxed_slice())
}

impl GenerationStore {
    /// Random initial state: disabled cells permanently dead, every enabled
    /// cell alive with probability `1 / sparsity`, drawn independently per
    /// cell. `seed: None` seeds from entropy.
    pub fn init(
        topology: &GridTopology,
        sparsity: u32,
        seed: Option<u64>,
    ) -> Result<Self, EngineError> {
        let mut rng = match seed {
            Some(x) => ChaCha8Rng::seed_from_u64(x),
            None => ChaCha8Rng::from_entropy(),
        };
        let fill_rate = 1.0 / f64::from(sparsity);
        let n = topology.len();

        let mut states = Vec::new();
        states.try_reserve_exact(n)?;
        for i in 0..n {
            let alive = !topology.cell(i).disabled && rng.gen_bool(fill_rate);
            states.push(alive);
        }
        Self::from_states(&states)
    }

    /// All cells dead; used for deterministic pattern seeding.
    pub fn blank(topology: &GridTopology) -> Result<Self, EngineError> {
        Self::from_states(&vec![false; topology.len()])
    }

    fn from_states(states: &[bool]) -> Result<Self, EngineError> {
        let n = states.len();
        Ok(Self {
            len: n,
            current: alloc_cells(n, |i| states[i])?,
            previous: alloc_cells(n, |i| states[i])?,
            colors: alloc_cells(n, |_| CellColor::BASE)?,
            pixels: alloc_cells(n, |i| if states[i] { CellColor::BASE.pack() } else { 0 })?,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Copies the entirety of `current` into `previous`.
    ///
    /// # Safety
    /// No worker may be in its Working phase: the controller calls this only
    /// while "go" is de-asserted and every done flag is clear.
    pub unsafe fn snapshot(&self) {
        std::ptr::copy_nonoverlapping(
            self.current.as_ptr() as *const bool,
            self.previous.as_ptr() as *mut bool,
            self.len,
        );
    }

    /// The previous-generation snapshot as a plain slice.
    ///
    /// # Safety
    /// Valid only while no snapshot is in progress, i.e. from the moment a
    /// worker observes "go" asserted until it reports done.
    pub unsafe fn previous(&self) -> &[bool] {
        std::slice::from_raw_parts(self.previous.as_ptr() as *const bool, self.len)
    }

    /// Commits the new state of cell `i` for this generation.
    ///
    /// # Safety
    /// `i` must lie inside the calling worker's partition range, and "go"
    /// must be asserted (exactly one writer per index per generation).
    pub unsafe fn commit(&self, i: usize, alive: bool, color: CellColor, pixel: u32) {
        *self.current[i].get() = alive;
        *self.colors[i].get() = color;
        *self.pixels[i].get() = pixel;
    }

    /// Last-committed color of cell `i`.
    ///
    /// # Safety
    /// Same access contract as [`Self::commit`] when called from a worker;
    /// the controller may call it whenever no generation is in flight.
    pub unsafe fn color(&self, i: usize) -> CellColor {
        *self.colors[i].get()
    }

    /// Last-committed alive state of cell `i`.
    ///
    /// # Safety
    /// Only while no generation is in flight.
    pub unsafe fn alive(&self, i: usize) -> bool {
        *self.current[i].get()
    }

    /// Last-committed packed pixel of cell `i`: alpha 0xFF while alive,
    /// all-zero while dead.
    ///
    /// # Safety
    /// Only while no generation is in flight.
    pub unsafe fn read_pixel(&self, i: usize) -> u32 {
        *self.pixels[i].get()
    }

    /// Writes all pixels into an externally-owned buffer of exactly `len`
    /// entries.
    ///
    /// # Safety
    /// Only while no generation is in flight.
    pub unsafe fn copy_pixels(&self, dst: &mut [u32]) {
        assert_eq!(
            dst.len(),
            self.len,
            "pixel buffer must hold exactly width * height entries"
        );
        std::ptr::copy_nonoverlapping(
            self.pixels.as_ptr() as *const u32,
            dst.as_mut_ptr(),
            self.len,
        );
    }

    /// Overwrites the alive state of cell `i`, resetting its visual state.
    ///
    /// # Safety
    /// Only while no generation is in flight.
    pub unsafe fn set_alive(&self, i: usize, alive: bool) {
        *self.current[i].get() = alive;
        *self.colors[i].get() = CellColor::BASE;
        *self.pixels[i].get() = if alive { CellColor::BASE.pack() } else { 0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_store_is_fully_dead() {
        let topo = GridTopology::build(8, 8).unwrap();
        let store = GenerationStore::blank(&topo).unwrap();
        for i in 0..store.len() {
            unsafe {
                assert!(!store.alive(i));
                assert_eq!(store.read_pixel(i), 0);
                assert_eq!(store.color(i), CellColor::BASE);
            }
        }
    }

    #[test]
    fn init_keeps_border_dead() {
        let topo = GridTopology::build(32, 32).unwrap();
        let store = GenerationStore::init(&topo, 1, Some(7)).unwrap();
        for i in 0..store.len() {
            let cell = topo.cell(i);
            let alive = unsafe { store.alive(i) };
            if cell.disabled {
                assert!(!alive, "border cell ({}, {}) alive", cell.x, cell.y);
            } else {
                // sparsity 1 means every interior cell starts alive
                assert!(alive, "interior cell ({}, {}) dead", cell.x, cell.y);
            }
        }
    }

    #[test]
    fn init_is_seed_deterministic() {
        let topo = GridTopology::build(48, 48).unwrap();
        let a = GenerationStore::init(&topo, 2, Some(42)).unwrap();
        let b = GenerationStore::init(&topo, 2, Some(42)).unwrap();
        for i in 0..a.len() {
            unsafe { assert_eq!(a.alive(i), b.alive(i)) };
        }
    }

    #[test]
    fn init_alive_fraction_matches_sparsity() {
        let topo = GridTopology::build(256, 256).unwrap();
        let store = GenerationStore::init(&topo, 2, Some(1)).unwrap();
        let mut interior = 0usize;
        let mut alive = 0usize;
        for i in 0..store.len() {
            if !topo.cell(i).disabled {
                interior += 1;
                if unsafe { store.alive(i) } {
                    alive += 1;
                }
            }
        }
        let fraction = alive as f64 / interior as f64;
        // 5 standard errors around 0.5 for a Bernoulli(0.5) sample.
        let bound = 5.0 * 0.5 / (interior as f64).sqrt();
        assert!(
            (fraction - 0.5).abs() < bound,
            "alive fraction {fraction} outside {bound} of 0.5"
        );
    }

    #[test]
    fn snapshot_copies_current_in_full() {
        let topo = GridTopology::build(10, 10).unwrap();
        let store = GenerationStore::blank(&topo).unwrap();
        unsafe {
            store.set_alive(topo.index_of(4, 4), true);
            store.set_alive(topo.index_of(5, 5), true);
            assert!(!store.previous()[topo.index_of(4, 4)]);
            store.snapshot();
            let previous = store.previous();
            for i in 0..store.len() {
                assert_eq!(previous[i], store.alive(i));
            }
        }
    }

    #[test]
    fn set_alive_resets_visual_state() {
        let topo = GridTopology::build(6, 6).unwrap();
        let store = GenerationStore::blank(&topo).unwrap();
        let i = topo.index_of(2, 2);
        unsafe {
            store.set_alive(i, true);
            assert_eq!(store.read_pixel(i), CellColor::BASE.pack());
            store.set_alive(i, false);
            assert_eq!(store.read_pixel(i), 0);
            assert_eq!(store.color(i), CellColor::BASE);
        }
    }
}
