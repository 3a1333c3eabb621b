//! Immutable grid adjacency, built once at engine construction.
//!
//! Cells live in an arena indexed by flat id `i = y*W + x`; neighbor
//! relations are stored as optional indices into the same arena, so no
//! reference can dangle or point outside the rectangle.

use crate::error::{ConfigError, EngineError};

/// Size of the Moore neighborhood.
pub const MOORE_NEIGHBORS: usize = 8;

/// Coordinate offsets in fixed Moore order: N, NE, E, SE, S, SW, W, NW.
const NEIGHBOR_OFFSETS: [(i64, i64); MOORE_NEIGHBORS] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// A single grid cell with its precomputed adjacency.
#[derive(Clone, Debug)]
pub struct Cell {
    /// Flat index of this cell, `y * width + x`.
    pub idx: u32,
    pub x: u32,
    pub y: u32,
    /// True iff the cell sits on the outer ring; disabled cells never
    /// evaluate neighbors and stay permanently dead.
    pub disabled: bool,
    /// Neighbor indices in Moore order; `None` means the neighbor falls
    /// outside the rectangle. Lookups are validated in (x, y) space, so a
    /// west lookup at x=0 is absent rather than wrapping to the previous row.
    pub neighbors: [Option<u32>; MOORE_NEIGHBORS],
}

/// The fixed rectangular grid: width, height and the cell arena.
/// Built exactly once and never mutated during simulation.
pub struct GridTopology {
    width: usize,
    height: usize,
    cells: Box<[Cell]>,
}

impl GridTopology {
    /// Builds the adjacency and border classification for a `width` x
    /// `height` rectangle. Deterministic; allocates the arena once.
    pub fn build(width: usize, height: usize) -> Result<Self, EngineError> {
        if width == 0 {
            return Err(ConfigError::ZeroWidth.into());
        }
        if height == 0 {
            return Err(ConfigError::ZeroHeight.into());
        }
        let n = width * height;
        if n > u32::MAX as usize {
            return Err(ConfigError::GridTooLarge(n).into());
        }

        let mut cells = Vec::new();
        cells.try_reserve_exact(n)?;
        for y in 0..height {
            for x in 0..width {
                let disabled = x == 0 || x == width - 1 || y == 0 || y == height - 1;
                let mut neighbors = [None; MOORE_NEIGHBORS];
                for (slot, &(dx, dy)) in NEIGHBOR_OFFSETS.iter().enumerate() {
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if (0..width as i64).contains(&nx) && (0..height as i64).contains(&ny) {
                        neighbors[slot] = Some((ny as usize * width + nx as usize) as u32);
                    }
                }
                cells.push(Cell {
                    idx: (y * width + x) as u32,
                    x: x as u32,
                    y: y as u32,
                    disabled,
                    neighbors,
                });
            }
        }
        Ok(Self {
            width,
            height,
            cells: cells.into_boxed_slice(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, i: usize) -> &Cell {
        &self.cells[i]
    }

    /// Flat index of the cell at (x, y). Panics if the coordinates fall
    /// outside the rectangle; an out-of-range x must never alias a cell of
    /// the neighboring row.
    pub fn index_of(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "coordinates ({x}, {y}) out of range for {}x{} grid",
            self.width,
            self.height
        );
        y * self.width + x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            GridTopology::build(0, 10),
            Err(EngineError::Config(ConfigError::ZeroWidth))
        ));
        assert!(matches!(
            GridTopology::build(10, 0),
            Err(EngineError::Config(ConfigError::ZeroHeight))
        ));
    }

    #[test]
    fn border_ring_is_disabled() {
        let topo = GridTopology::build(6, 5).unwrap();
        for y in 0..5 {
            for x in 0..6 {
                let cell = topo.cell(topo.index_of(x, y));
                let on_ring = x == 0 || x == 5 || y == 0 || y == 4;
                assert_eq!(cell.disabled, on_ring, "cell ({x}, {y})");
            }
        }
    }

    #[test]
    fn interior_cell_has_full_neighborhood_in_moore_order() {
        let topo = GridTopology::build(5, 5).unwrap();
        let cell = topo.cell(topo.index_of(2, 2));
        let expected = [
            (2, 3), // N
            (3, 3), // NE
            (3, 2), // E
            (3, 1), // SE
            (2, 1), // S
            (1, 1), // SW
            (1, 2), // W
            (1, 3), // NW
        ];
        for (slot, &(x, y)) in expected.iter().enumerate() {
            assert_eq!(
                cell.neighbors[slot],
                Some(topo.index_of(x, y) as u32),
                "slot {slot}"
            );
        }
    }

    #[test]
    fn corner_cell_has_three_neighbors() {
        let topo = GridTopology::build(4, 4).unwrap();
        let cell = topo.cell(topo.index_of(0, 0));
        let present = cell.neighbors.iter().flatten().count();
        assert_eq!(present, 3);
    }

    #[test]
    fn no_row_wraparound() {
        // West-side lookups at x=0 must be absent, not the last cell of the
        // previous row; mirrored for east-side lookups at x = width-1.
        let topo = GridTopology::build(7, 7).unwrap();
        let west_edge = topo.cell(topo.index_of(0, 3));
        // Slots SW, W, NW all step to x = -1.
        assert_eq!(west_edge.neighbors[5], None);
        assert_eq!(west_edge.neighbors[6], None);
        assert_eq!(west_edge.neighbors[7], None);

        let east_edge = topo.cell(topo.index_of(6, 3));
        // Slots NE, E, SE all step to x = width.
        assert_eq!(east_edge.neighbors[1], None);
        assert_eq!(east_edge.neighbors[2], None);
        assert_eq!(east_edge.neighbors[3], None);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn index_of_rejects_out_of_range_x_in_release_too() {
        // (width, 0) must fail loudly, not alias the first cell of row 1.
        let topo = GridTopology::build(8, 8).unwrap();
        topo.index_of(8, 0);
    }

    #[test]
    fn every_neighbor_index_is_in_range() {
        let topo = GridTopology::build(9, 4).unwrap();
        for i in 0..topo.len() {
            for n in topo.cell(i).neighbors.iter().flatten() {
                assert!((*n as usize) < topo.len());
            }
        }
    }
}
