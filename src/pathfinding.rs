use crate::error::InteractionError;
use crate::grid::{CellPos, Grid, MovementMode};
use crate::route::{reconstruct, Route};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Visualization-relevant things that happen to a cell during a search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Cell entered the open set for the first time
    Opened(CellPos),
    /// Cell's cost is final
    Closed(CellPos),
    /// Cell lies on the route that was found
    Path(CellPos),
}

/// Result of one iteration of the search loop
#[derive(Debug, Clone, PartialEq)]
pub enum SearchStep {
    /// A cell was finalized and its neighbors relaxed; the caller should pause
    /// for the step delay before the next iteration
    Expanded(CellPos),
    Found(Route),
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(Route),
    NotFound,
}

impl SearchOutcome {
    pub fn route(&self) -> Option<&Route> {
        match self {
            SearchOutcome::Found(route) => Some(route),
            SearchOutcome::NotFound => None,
        }
    }
}

/// An entry in the open set.
///
/// Entries are snapshots: when a cell's cost improves a new entry is pushed
/// and the old one is skipped once the cell is closed.
#[derive(Debug, Clone)]
struct OpenEntry {
    pos: CellPos,
    f: f64,
    h: f64,
    /// Insertion order into the open set
    seq: u64,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default).
        // Tie-breaker: lower h first, then earlier insertion.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Incremental A* over a [`Grid`].
///
/// The search keeps its open set here and its per-cell costs in the grid, so
/// the grid must not be edited between [`AStarSearch::start`] and the terminal
/// step. Each call to [`AStarSearch::step`] finalizes at most one cell, which
/// lets the caller pace the search for display.
#[derive(Debug)]
pub struct AStarSearch {
    source: CellPos,
    target: CellPos,
    mode: MovementMode,
    open: BinaryHeap<OpenEntry>,
    next_seq: u64,
    expanded: usize,
    finished: bool,
}

impl AStarSearch {
    /// Validate the endpoints and seed the open set with `source`.
    ///
    /// When `source == target` the grid is left untouched and the first step
    /// returns an empty route.
    pub fn start(
        grid: &mut Grid,
        source: CellPos,
        target: CellPos,
        mode: MovementMode,
    ) -> Result<Self, InteractionError> {
        for pos in [source, target] {
            if !grid.in_bounds(pos) {
                return Err(InteractionError::OutOfBounds(pos));
            }
            if grid.is_obstacle(pos) {
                return Err(InteractionError::ObstacleCell(pos));
            }
        }

        let mut search = AStarSearch {
            source,
            target,
            mode,
            open: BinaryHeap::new(),
            next_seq: 0,
            expanded: 0,
            finished: false,
        };

        if source == target {
            return Ok(search);
        }

        grid.reset_search_state();
        let h = source.distance(&target);
        if let Some(cell) = grid.cell_mut(source) {
            cell.g = 0.0;
            cell.h = h;
            cell.f = h;
            cell.opened = true;
        }
        search.push(source, h, h);

        log::debug!(
            "[astar] start {} -> {} ({} neighbors)",
            source,
            target,
            mode.neighbor_count()
        );
        Ok(search)
    }

    fn push(&mut self, pos: CellPos, f: f64, h: f64) {
        self.open.push(OpenEntry {
            pos,
            f,
            h,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    /// Run one iteration of the search loop.
    ///
    /// Stale open-set entries are discarded without counting as an iteration.
    /// Once a terminal step (`Found` / `NotFound`) has been returned, further
    /// calls return `NotFound`.
    pub fn step<F>(&mut self, grid: &mut Grid, on_progress: &mut F) -> SearchStep
    where
        F: FnMut(ProgressEvent),
    {
        if self.finished {
            return SearchStep::NotFound;
        }

        if self.source == self.target {
            self.finished = true;
            return SearchStep::Found(Route::default());
        }

        while let Some(entry) = self.open.pop() {
            let pos = entry.pos;
            let g = match grid.cell_mut(pos) {
                Some(cell) if !cell.closed => {
                    cell.closed = true;
                    cell.g
                }
                _ => continue,
            };
            self.expanded += 1;

            if pos != self.source && pos != self.target {
                on_progress(ProgressEvent::Closed(pos));
            }

            if pos == self.target {
                self.finished = true;
                let route = reconstruct(grid, pos);
                for &cell in route.intermediate() {
                    on_progress(ProgressEvent::Path(cell));
                }
                log::debug!(
                    "[astar] found route to {}: {} steps, cost {:.3}, {} expansions",
                    pos,
                    route.len(),
                    route.cost(),
                    self.expanded
                );
                return SearchStep::Found(route);
            }

            let neighbors: Vec<(CellPos, f64)> = grid.neighbors(pos, self.mode).collect();
            for (next, step_cost) in neighbors {
                let g_new = g + step_cost;
                let h = next.distance(&self.target);
                let newly_opened = match grid.cell_mut(next) {
                    Some(cell) if !cell.closed && g_new < cell.g => {
                        cell.g = g_new;
                        cell.h = h;
                        cell.f = g_new + h;
                        cell.predecessor = Some(pos);
                        let first = !cell.opened;
                        cell.opened = true;
                        first
                    }
                    _ => continue,
                };

                self.push(next, g_new + h, h);
                if newly_opened && next != self.target {
                    on_progress(ProgressEvent::Opened(next));
                }
            }

            log::trace!(
                "[astar] expanded {} (g={:.3}), open entries={}",
                pos,
                g,
                self.open.len()
            );
            return SearchStep::Expanded(pos);
        }

        self.finished = true;
        log::debug!(
            "[astar] no route {} -> {} after {} expansions",
            self.source,
            self.target,
            self.expanded
        );
        SearchStep::NotFound
    }

    /// Step until a terminal result, without pausing
    pub fn run_to_end<F>(&mut self, grid: &mut Grid, on_progress: &mut F) -> SearchOutcome
    where
        F: FnMut(ProgressEvent),
    {
        loop {
            match self.step(grid, on_progress) {
                SearchStep::Expanded(_) => continue,
                SearchStep::Found(route) => return SearchOutcome::Found(route),
                SearchStep::NotFound => return SearchOutcome::NotFound,
            }
        }
    }
}

/// Find the cheapest route from `source` to `target` in one call
pub fn search<F>(
    grid: &mut Grid,
    source: CellPos,
    target: CellPos,
    mode: MovementMode,
    mut on_progress: F,
) -> Result<SearchOutcome, InteractionError>
where
    F: FnMut(ProgressEvent),
{
    let mut search = AStarSearch::start(grid, source, target, mode)?;
    Ok(search.run_to_end(grid, &mut on_progress))
}
