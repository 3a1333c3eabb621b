//! The update rule: a pure mapping from a cell's previous-generation
//! neighborhood to its next alive/dead state and pixel color. No shared
//! mutable state, so everything here is directly unit-testable against
//! literal neighbor patterns.

use crate::topology::Cell;

/// Per-cell color channels. Green is fixed; red ratchets up toward 0xFF and
/// blue ratchets down toward 0x00 for every generation the cell stays alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl CellColor {
    /// Baseline color assigned at init, on death and for disabled cells.
    pub const BASE: Self = Self {
        r: 0x00,
        g: 0x99,
        b: 0xFF,
    };

    /// One gradient step, saturating at both ends.
    #[must_use]
    pub fn step(self) -> Self {
        Self {
            r: self.r.saturating_add(1),
            g: self.g,
            b: self.b.saturating_sub(1),
        }
    }

    /// Packs the channels into an opaque ARGB pixel.
    pub fn pack(self) -> u32 {
        (0xFF << 24) | (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }
}

/// Counts alive Moore neighbors of `cell` in the `previous` generation.
/// Stops at 4: no rule outcome changes above that threshold.
pub fn count_alive_neighbors(cell: &Cell, previous: &[bool]) -> u8 {
    let mut count = 0;
    for n in cell.neighbors.iter().flatten() {
        if previous[*n as usize] {
            count += 1;
            if count == 4 {
                break;
            }
        }
    }
    count
}

/// Standard life rule: birth on exactly 3 neighbors, survival on 2 or 3,
/// death otherwise.
pub fn next_state(was_alive: bool, alive_neighbors: u8) -> bool {
    alive_neighbors == 3 || (was_alive && alive_neighbors == 2)
}

/// Full per-cell step: next alive state, next color and the committed pixel.
///
/// Disabled cells never evaluate neighbors and always come out dead with the
/// baseline color and a fully transparent pixel. Dead cells reset their
/// channels to baseline so a re-born cell restarts the gradient.
pub fn step_cell(cell: &Cell, previous: &[bool], color: CellColor) -> (bool, CellColor, u32) {
    if cell.disabled {
        return (false, CellColor::BASE, 0);
    }
    let was_alive = previous[cell.idx as usize];
    if next_state(was_alive, count_alive_neighbors(cell, previous)) {
        let color = color.step();
        (true, color, color.pack())
    } else {
        (false, CellColor::BASE, 0)
    }
}
