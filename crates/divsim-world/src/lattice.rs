//! Bounded rectangular lattice cut into equal neighbourhood blocks.

use crate::config::{NeighborTopology, WorldConfig};

/// Precomputed adjacency and block membership of every lattice cell.
///
/// Cells are numbered row-major. The lattice does not wrap: border cells have
/// fewer neighbours.
#[derive(Debug, Clone)]
pub struct BoundedLattice {
    rows: usize,
    cols: usize,
    neighbors: Vec<Vec<usize>>,
    blocks: Vec<usize>,
    n_blocks: usize,
}

impl BoundedLattice {
    /// Builds the lattice described by a validated configuration.
    pub fn new(config: &WorldConfig) -> Self {
        let (rows, cols) = (config.grid_rows, config.grid_cols);
        let block_height = rows / config.neighborhood_rows;
        let block_width = cols / config.neighborhood_cols;
        let offsets: &[(isize, isize)] = match config.neighbor_topology {
            NeighborTopology::Rook => &[(-1, 0), (0, -1), (0, 1), (1, 0)],
            NeighborTopology::Queen => &[
                (-1, -1),
                (-1, 0),
                (-1, 1),
                (0, -1),
                (0, 1),
                (1, -1),
                (1, 0),
                (1, 1),
            ],
        };

        let mut neighbors = Vec::with_capacity(rows * cols);
        let mut blocks = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let adjacent = offsets
                    .iter()
                    .filter_map(|&(dr, dc)| {
                        let r = row.checked_add_signed(dr)?;
                        let c = col.checked_add_signed(dc)?;
                        (r < rows && c < cols).then_some(r * cols + c)
                    })
                    .collect();
                neighbors.push(adjacent);
                blocks.push((row / block_height) * config.neighborhood_cols + col / block_width);
            }
        }
        Self {
            rows,
            cols,
            neighbors,
            blocks,
            n_blocks: config.neighborhoods(),
        }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// True for a lattice without cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Neighbour cells of `cell`.
    pub fn neighbors(&self, cell: usize) -> &[usize] {
        &self.neighbors[cell]
    }

    /// Neighbourhood block containing `cell`.
    pub fn block(&self, cell: usize) -> usize {
        self.blocks[cell]
    }

    /// Number of neighbourhood blocks.
    pub fn n_blocks(&self) -> usize {
        self.n_blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(topology: NeighborTopology) -> WorldConfig {
        WorldConfig {
            grid_rows: 4,
            grid_cols: 6,
            neighborhood_rows: 2,
            neighborhood_cols: 3,
            neighbor_topology: topology,
            ..WorldConfig::default()
        }
    }

    #[test]
    fn corners_have_truncated_neighbourhoods() {
        let queen = BoundedLattice::new(&config(NeighborTopology::Queen));
        assert_eq!(queen.neighbors(0).len(), 3);
        assert_eq!(queen.neighbors(7).len(), 8);
        let rook = BoundedLattice::new(&config(NeighborTopology::Rook));
        assert_eq!(rook.neighbors(0).len(), 2);
        assert_eq!(rook.neighbors(7).len(), 4);
    }

    #[test]
    fn blocks_tile_the_grid() {
        let lattice = BoundedLattice::new(&config(NeighborTopology::Queen));
        assert_eq!(lattice.n_blocks(), 6);
        assert_eq!(lattice.block(0), 0);
        assert_eq!(lattice.block(2), 1);
        assert_eq!(lattice.block(5), 2);
        assert_eq!(lattice.block(12), 3);
        assert_eq!(lattice.block(23), 5);
    }
}
