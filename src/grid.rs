use serde::{Deserialize, Serialize};
use std::f64::consts::SQRT_2;
use std::fmt;

use crate::error::InteractionError;

/// A cell coordinate on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellPos {
    pub row: i32,
    pub col: i32,
}

impl CellPos {
    pub fn new(row: i32, col: i32) -> Self {
        CellPos { row, col }
    }

    /// Euclidean distance between two cells, used as the A* heuristic
    pub fn distance(&self, other: &CellPos) -> f64 {
        let dr = (self.row - other.row) as f64;
        let dc = (self.col - other.col) as f64;
        dr.hypot(dc)
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Which neighbors a search may step to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MovementMode {
    FourConnected,
    #[default]
    EightConnected,
}

/// (row delta, col delta, step cost)
const AXIS_STEPS: [(i32, i32, f64); 4] = [(-1, 0, 1.0), (1, 0, 1.0), (0, -1, 1.0), (0, 1, 1.0)];

const ALL_STEPS: [(i32, i32, f64); 8] = [
    (-1, 0, 1.0),
    (1, 0, 1.0),
    (0, -1, 1.0),
    (0, 1, 1.0),
    (-1, -1, SQRT_2),
    (-1, 1, SQRT_2),
    (1, -1, SQRT_2),
    (1, 1, SQRT_2),
];

impl MovementMode {
    /// Map the neighbor count chosen in the UI (4 or 8) to a mode
    pub fn from_neighbor_count(count: u8) -> Option<Self> {
        match count {
            4 => Some(MovementMode::FourConnected),
            8 => Some(MovementMode::EightConnected),
            _ => None,
        }
    }

    pub fn neighbor_count(&self) -> u8 {
        match self {
            MovementMode::FourConnected => 4,
            MovementMode::EightConnected => 8,
        }
    }

    fn steps(&self) -> &'static [(i32, i32, f64)] {
        match self {
            MovementMode::FourConnected => &AXIS_STEPS,
            MovementMode::EightConnected => &ALL_STEPS,
        }
    }
}

/// Obstacle flag plus the per-run A* bookkeeping for one cell
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub obstacle: bool,
    /// Cost of the best known path from the source
    pub g: f64,
    /// Heuristic estimate of the remaining cost to the target
    pub h: f64,
    pub f: f64,
    pub predecessor: Option<CellPos>,
    /// Present in the open set (set once, never cleared during a run)
    pub opened: bool,
    pub closed: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            obstacle: false,
            g: f64::INFINITY,
            h: 0.0,
            f: f64::INFINITY,
            predecessor: None,
            opened: false,
            closed: false,
        }
    }
}

impl Cell {
    fn reset_search_state(&mut self) {
        self.g = f64::INFINITY;
        self.h = 0.0;
        self.f = f64::INFINITY;
        self.predecessor = None;
        self.opened = false;
        self.closed = false;
    }
}

/// Largest number of rows or columns a grid may have
pub const MAX_SIDE: i32 = 1000;

/// Fixed-size grid of cells, stored row-major
#[derive(Debug, Clone)]
pub struct Grid {
    rows: i32,
    cols: i32,
    cells: Vec<Cell>,
    /// Revision number - incremented whenever an obstacle changes
    revision: u64,
}

impl Grid {
    /// Create a new grid with every cell free; each side is clamped to `1..=MAX_SIDE`
    pub fn new(rows: i32, cols: i32) -> Self {
        let rows = rows.clamp(1, MAX_SIDE);
        let cols = cols.clamp(1, MAX_SIDE);
        Grid {
            rows,
            cols,
            cells: vec![Cell::default(); rows as usize * cols as usize],
            revision: 0,
        }
    }

    /// Create a grid with specific blocked cells; out-of-bounds entries are ignored
    pub fn with_blocked(rows: i32, cols: i32, blocked: &[CellPos]) -> Self {
        let mut grid = Self::new(rows, cols);
        for &pos in blocked {
            if let Some(cell) = grid.cell_mut(pos) {
                cell.obstacle = true;
            }
        }
        grid
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn in_bounds(&self, pos: CellPos) -> bool {
        pos.row >= 0 && pos.row < self.rows && pos.col >= 0 && pos.col < self.cols
    }

    fn index(&self, pos: CellPos) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.row as usize * self.cols as usize + pos.col as usize)
        } else {
            None
        }
    }

    pub fn cell(&self, pos: CellPos) -> Option<&Cell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    pub fn cell_mut(&mut self, pos: CellPos) -> Option<&mut Cell> {
        let index = self.index(pos)?;
        Some(&mut self.cells[index])
    }

    /// Check if a cell is an obstacle. Out of bounds is considered blocked.
    pub fn is_obstacle(&self, pos: CellPos) -> bool {
        self.cell(pos).map_or(true, |cell| cell.obstacle)
    }

    /// All positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = CellPos> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| CellPos::new(row, col)))
    }

    pub fn free_cells(&self) -> Vec<CellPos> {
        self.positions().filter(|&pos| !self.is_obstacle(pos)).collect()
    }

    pub fn obstacle_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.obstacle).count()
    }

    /// Flip the obstacle flag of `pos` unless it is one of the `protected` cells.
    /// Returns the new obstacle state.
    pub fn toggle_obstacle(
        &mut self,
        pos: CellPos,
        protected: &[CellPos],
    ) -> Result<bool, InteractionError> {
        let current = self.checked_cell(pos, protected)?.obstacle;
        self.write_obstacle(pos, !current);
        Ok(!current)
    }

    /// Force the obstacle flag of `pos` to `value` unless it is protected.
    /// Returns true if the cell changed.
    pub fn set_obstacle(
        &mut self,
        pos: CellPos,
        value: bool,
        protected: &[CellPos],
    ) -> Result<bool, InteractionError> {
        let current = self.checked_cell(pos, protected)?.obstacle;
        if current == value {
            return Ok(false);
        }
        self.write_obstacle(pos, value);
        Ok(true)
    }

    fn checked_cell(&self, pos: CellPos, protected: &[CellPos]) -> Result<&Cell, InteractionError> {
        let cell = self.cell(pos).ok_or(InteractionError::OutOfBounds(pos))?;
        if protected.contains(&pos) {
            return Err(InteractionError::ProtectedCell(pos));
        }
        Ok(cell)
    }

    fn write_obstacle(&mut self, pos: CellPos, value: bool) {
        if let Some(cell) = self.cell_mut(pos) {
            cell.obstacle = value;
            self.revision += 1;
        }
    }

    /// In-bounds, non-obstacle neighbors of `pos` with their step cost.
    ///
    /// Axis-aligned steps come first (up, down, left, right), followed by the
    /// diagonals in eight-connected mode.
    pub fn neighbors(
        &self,
        pos: CellPos,
        mode: MovementMode,
    ) -> impl Iterator<Item = (CellPos, f64)> + '_ {
        mode.steps().iter().filter_map(move |&(dr, dc, cost)| {
            let next = CellPos::new(pos.row + dr, pos.col + dc);
            if self.is_obstacle(next) {
                None
            } else {
                Some((next, cost))
            }
        })
    }

    /// Clear the A* bookkeeping of every cell, keeping obstacles
    pub fn reset_search_state(&mut self) {
        for cell in &mut self.cells {
            cell.reset_search_state();
        }
    }

    /// Clear the A* bookkeeping and every obstacle
    pub fn reset_all(&mut self) {
        let had_obstacles = self.cells.iter().any(|cell| cell.obstacle);
        for cell in &mut self.cells {
            cell.reset_search_state();
            cell.obstacle = false;
        }
        if had_obstacles {
            self.revision += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_connected_neighbors_in_corner() {
        let grid = Grid::new(3, 3);
        let neighbors: Vec<_> = grid
            .neighbors(CellPos::new(0, 0), MovementMode::FourConnected)
            .collect();

        assert_eq!(
            neighbors,
            vec![(CellPos::new(1, 0), 1.0), (CellPos::new(0, 1), 1.0)]
        );
    }

    #[test]
    fn test_eight_connected_adds_diagonals() {
        let grid = Grid::new(3, 3);
        let neighbors: Vec<_> = grid
            .neighbors(CellPos::new(1, 1), MovementMode::EightConnected)
            .collect();

        assert_eq!(neighbors.len(), 8);
        let diagonal_costs: Vec<f64> = neighbors
            .iter()
            .filter(|(pos, _)| pos.row != 1 && pos.col != 1)
            .map(|&(_, cost)| cost)
            .collect();
        assert_eq!(diagonal_costs, vec![SQRT_2; 4]);
    }

    #[test]
    fn test_neighbors_skip_obstacles() {
        let grid = Grid::with_blocked(3, 3, &[CellPos::new(0, 1), CellPos::new(1, 1)]);
        let neighbors: Vec<_> = grid
            .neighbors(CellPos::new(0, 0), MovementMode::EightConnected)
            .map(|(pos, _)| pos)
            .collect();

        assert_eq!(neighbors, vec![CellPos::new(1, 0)]);
    }

    #[test]
    fn test_toggle_obstacle_respects_protection() {
        let mut grid = Grid::new(4, 4);
        let token = CellPos::new(2, 2);

        assert_eq!(
            grid.toggle_obstacle(token, &[token]),
            Err(InteractionError::ProtectedCell(token))
        );
        assert!(!grid.is_obstacle(token));

        assert_eq!(grid.toggle_obstacle(CellPos::new(1, 2), &[token]), Ok(true));
        assert_eq!(grid.toggle_obstacle(CellPos::new(1, 2), &[token]), Ok(false));
        assert_eq!(grid.revision(), 2);
    }

    #[test]
    fn test_out_of_bounds_is_blocked() {
        let mut grid = Grid::new(2, 2);
        let outside = CellPos::new(2, 0);

        assert!(grid.is_obstacle(outside));
        assert_eq!(
            grid.toggle_obstacle(outside, &[]),
            Err(InteractionError::OutOfBounds(outside))
        );
    }

    #[test]
    fn test_set_obstacle_reports_change() {
        let mut grid = Grid::new(2, 2);
        let pos = CellPos::new(0, 1);

        assert_eq!(grid.set_obstacle(pos, true, &[]), Ok(true));
        assert_eq!(grid.set_obstacle(pos, true, &[]), Ok(false));
        assert_eq!(grid.revision(), 1);
    }

    #[test]
    fn test_reset_search_state_keeps_obstacles() {
        let mut grid = Grid::with_blocked(2, 2, &[CellPos::new(1, 1)]);
        if let Some(cell) = grid.cell_mut(CellPos::new(0, 0)) {
            cell.g = 3.0;
            cell.closed = true;
            cell.predecessor = Some(CellPos::new(0, 1));
        }

        grid.reset_search_state();

        let cell = grid.cell(CellPos::new(0, 0)).unwrap();
        assert_eq!(*cell, Cell::default());
        assert!(grid.is_obstacle(CellPos::new(1, 1)));

        grid.reset_all();
        assert_eq!(grid.obstacle_count(), 0);
    }

    #[test]
    fn test_movement_mode_from_neighbor_count() {
        assert_eq!(MovementMode::from_neighbor_count(4), Some(MovementMode::FourConnected));
        assert_eq!(MovementMode::from_neighbor_count(8), Some(MovementMode::EightConnected));
        assert_eq!(MovementMode::from_neighbor_count(6), None);
    }

    #[test]
    fn test_oversized_grid_is_clamped() {
        let grid = Grid::new(100_000, 100_000);
        assert_eq!(grid.rows(), MAX_SIDE);
        assert_eq!(grid.cols(), MAX_SIDE);

        let corner = CellPos::new(MAX_SIDE - 1, MAX_SIDE - 1);
        assert!(grid.cell(corner).is_some());
        assert!(grid.cell(CellPos::new(MAX_SIDE, 0)).is_none());
    }
}
