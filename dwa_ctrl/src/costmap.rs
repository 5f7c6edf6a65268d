//! # Obstacle query surface
//!
//! The occupancy cost grid is an external collaborator: the planner only
//! needs to ask "what does it cost to occupy this pose?". That question is
//! the [`ObstacleMap`] trait. A small uniform-grid implementation,
//! [`GridCostMap`], is provided for tests, benchmarks and the demo
//! executable; maintaining and inflating a real map is out of scope here.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The cost of occupying a single point or footprint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CellCost {
    /// Traversable space with a cost between 0 (free) and 1 (highest
    /// non-lethal cost).
    Cost(f64),

    /// Occupied space, cannot be traversed.
    Lethal,

    /// Space the map knows nothing about, including off-map queries.
    Unknown,
}

/// How unknown space is treated when scoring trajectories.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UnknownPolicy {
    /// Trajectories touching unknown space are rejected.
    Refuse,

    /// Unknown space is scored as free.
    TreatAsFree,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Read-only interface onto an occupancy cost grid.
///
/// Implementations must answer from memory, without blocking on I/O, since
/// these queries sit inside the planner's per-candidate scoring loop.
pub trait ObstacleMap {
    /// Cost of occupying a single point.
    fn point_cost(&self, position_m: Vector2<f64>) -> CellCost;

    /// Cost of placing the given oriented footprint polygon, with vertices
    /// already transformed into the planning frame.
    fn footprint_cost(&self, position_m: Vector2<f64>, footprint_m: &[Vector2<f64>]) -> CellCost;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A uniform grid cost map.
///
/// Cells default to free. Queries outside the grid answer
/// [`CellCost::Unknown`].
#[derive(Debug, Clone)]
pub struct GridCostMap {
    cell_size_m: f64,
    num_cells: Vector2<usize>,

    /// Position of the grid's (0, 0) cell corner in the planning frame
    origin_m: Vector2<f64>,

    cells: Vec<CellCost>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CellCost {
    /// Combine two costs, keeping the worse one. Lethal dominates unknown,
    /// unknown dominates any finite cost.
    pub fn worse(self, other: CellCost) -> CellCost {
        match (self, other) {
            (CellCost::Lethal, _) | (_, CellCost::Lethal) => CellCost::Lethal,
            (CellCost::Unknown, _) | (_, CellCost::Unknown) => CellCost::Unknown,
            (CellCost::Cost(a), CellCost::Cost(b)) => CellCost::Cost(a.max(b)),
        }
    }
}

impl GridCostMap {
    /// Create a new all-free map.
    pub fn new(cell_size_m: f64, num_cells: Vector2<usize>, origin_m: Vector2<f64>) -> Self {
        Self {
            cell_size_m,
            num_cells,
            origin_m,
            cells: vec![CellCost::Cost(0.0); num_cells[0] * num_cells[1]],
        }
    }

    /// Set the cost of a single cell. Out of range indices are ignored.
    pub fn set_cell(&mut self, x: usize, y: usize, cost: CellCost) {
        if x < self.num_cells[0] && y < self.num_cells[1] {
            self.cells[y * self.num_cells[0] + x] = cost;
        }
    }

    /// Set every cell whose centre lies inside the given rectangle.
    pub fn set_region(&mut self, min_m: Vector2<f64>, max_m: Vector2<f64>, cost: CellCost) {
        for y in 0..self.num_cells[1] {
            for x in 0..self.num_cells[0] {
                let centre = self.cell_centre(x, y);

                if centre[0] >= min_m[0]
                    && centre[0] <= max_m[0]
                    && centre[1] >= min_m[1]
                    && centre[1] <= max_m[1]
                {
                    self.cells[y * self.num_cells[0] + x] = cost;
                }
            }
        }
    }

    fn cell_centre(&self, x: usize, y: usize) -> Vector2<f64> {
        self.origin_m
            + Vector2::new(
                (x as f64 + 0.5) * self.cell_size_m,
                (y as f64 + 0.5) * self.cell_size_m,
            )
    }

    fn cell_index(&self, position_m: Vector2<f64>) -> Option<usize> {
        let rel = position_m - self.origin_m;

        if rel[0] < 0.0 || rel[1] < 0.0 {
            return None;
        }

        let x = (rel[0] / self.cell_size_m) as usize;
        let y = (rel[1] / self.cell_size_m) as usize;

        if x >= self.num_cells[0] || y >= self.num_cells[1] {
            return None;
        }

        Some(y * self.num_cells[0] + x)
    }
}

impl ObstacleMap for GridCostMap {
    fn point_cost(&self, position_m: Vector2<f64>) -> CellCost {
        match self.cell_index(position_m) {
            Some(i) => self.cells[i],
            None => CellCost::Unknown,
        }
    }

    fn footprint_cost(&self, position_m: Vector2<f64>, footprint_m: &[Vector2<f64>]) -> CellCost {
        // Degenerate footprint, treat the robot as a point
        if footprint_m.is_empty() {
            return self.point_cost(position_m);
        }

        let mut worst = self.point_cost(position_m);

        // Walk the closed polygon boundary, sampling each edge at half cell
        // resolution so no crossed cell is skipped
        for i in 0..footprint_m.len() {
            let start = footprint_m[i];
            let end = footprint_m[(i + 1) % footprint_m.len()];

            let length_m = (end - start).norm();
            let num_samples = (length_m / (0.5 * self.cell_size_m)).ceil() as usize + 1;

            for s in 0..num_samples {
                let t = s as f64 / (num_samples - 1).max(1) as f64;
                worst = worst.worse(self.point_cost(start + (end - start) * t));
            }
        }

        worst
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
