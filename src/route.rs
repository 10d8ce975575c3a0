use crate::grid::{CellPos, Grid};

/// Cells a token visits after leaving the source, ending on the target.
///
/// The source itself is not part of the route, so a route for
/// `source == target` is empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Route {
    cells: Vec<CellPos>,
    cost: f64,
}

impl Route {
    pub fn new(cells: Vec<CellPos>, cost: f64) -> Self {
        Route { cells, cost }
    }

    pub fn cells(&self) -> &[CellPos] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Total path cost from the source to the last cell
    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn last(&self) -> Option<CellPos> {
        self.cells.last().copied()
    }

    /// Route cells strictly between source and target
    pub fn intermediate(&self) -> &[CellPos] {
        match self.cells.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }
}

/// Walk predecessor links back from `terminal` and return them in travel order
pub fn reconstruct(grid: &Grid, terminal: CellPos) -> Route {
    let cost = grid.cell(terminal).map_or(f64::INFINITY, |cell| cell.g);

    let mut cells = Vec::new();
    let mut current = terminal;
    while let Some(prev) = grid.cell(current).and_then(|cell| cell.predecessor) {
        cells.push(current);
        current = prev;
    }
    cells.reverse();

    Route { cells, cost }
}

/// Format route for display
pub fn format_route(source: CellPos, route: &Route) -> String {
    let mut result = source.to_string();
    for pos in route.cells() {
        result.push_str(" -> ");
        result.push_str(&pos.to_string());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(grid: &mut Grid, pos: CellPos, prev: CellPos, g: f64) {
        if let Some(cell) = grid.cell_mut(pos) {
            cell.predecessor = Some(prev);
            cell.g = g;
        }
    }

    #[test]
    fn test_reconstruct_excludes_source() {
        let mut grid = Grid::new(3, 3);
        let source = CellPos::new(0, 0);
        link(&mut grid, CellPos::new(0, 1), source, 1.0);
        link(&mut grid, CellPos::new(1, 2), CellPos::new(0, 1), 1.0 + std::f64::consts::SQRT_2);

        let route = reconstruct(&grid, CellPos::new(1, 2));

        assert_eq!(route.cells(), &[CellPos::new(0, 1), CellPos::new(1, 2)]);
        assert_eq!(route.intermediate(), &[CellPos::new(0, 1)]);
        assert!((route.cost() - 2.414).abs() < 1e-3);
        assert_eq!(format_route(source, &route), "(0,0) -> (0,1) -> (1,2)");
    }

    #[test]
    fn test_reconstruct_from_source_is_empty() {
        let mut grid = Grid::new(2, 2);
        if let Some(cell) = grid.cell_mut(CellPos::new(1, 1)) {
            cell.g = 0.0;
        }

        let route = reconstruct(&grid, CellPos::new(1, 1));

        assert!(route.is_empty());
        assert_eq!(route.last(), None);
        assert!(route.intermediate().is_empty());
    }
}
