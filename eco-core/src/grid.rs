/// Toroidal 4-connected (von Neumann) grid with cells indexed row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    neighbors: Vec<Vec<usize>>,
}

/// Offsets in neighborhood order: up, left, right, down.
const VON_NEUMANN_OFFSETS: [(i64, i64); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

impl Grid {
    pub fn new(width: u32, height: u32) -> Self {
        let mut grid = Self {
            width,
            height,
            neighbors: Vec::new(),
        };
        grid.neighbors = (0..grid.cell_count())
            .map(|idx| grid.compute_neighbors(idx))
            .collect();
        grid
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn cell_index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn coords(&self, idx: usize) -> (u32, u32) {
        let width = self.width as usize;
        ((idx % width) as u32, (idx / width) as u32)
    }

    /// Distinct wrapped neighbors of `idx`. On grids narrower than three
    /// cells the wrapped offsets collapse, and may include `idx` itself.
    pub fn neighbors(&self, idx: usize) -> &[usize] {
        &self.neighbors[idx]
    }

    pub fn wrap_position(&self, x: i64, y: i64) -> (u32, u32) {
        (
            x.rem_euclid(i64::from(self.width)) as u32,
            y.rem_euclid(i64::from(self.height)) as u32,
        )
    }

    fn compute_neighbors(&self, idx: usize) -> Vec<usize> {
        let (x, y) = self.coords(idx);
        let mut cells = Vec::with_capacity(VON_NEUMANN_OFFSETS.len());
        for (dx, dy) in VON_NEUMANN_OFFSETS {
            let (nx, ny) = self.wrap_position(i64::from(x) + dx, i64::from(y) + dy);
            let neighbor = ny as usize * self.width as usize + nx as usize;
            if !cells.contains(&neighbor) {
                cells.push(neighbor);
            }
        }
        cells
    }
}
