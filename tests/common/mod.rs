#![allow(dead_code)]

use pathgrid::{CellPos, CellVisual, Grid, MovementMode, Renderer, Session, SessionEvent, SessionState};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

/// Renderer that remembers everything it was told
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub visuals: HashMap<CellPos, CellVisual>,
    pub visual_history: Vec<(CellPos, CellVisual)>,
    pub token_positions: Vec<CellPos>,
    pub token_visible: bool,
}

impl RecordingRenderer {
    pub fn visual(&self, pos: CellPos) -> CellVisual {
        self.visuals.get(&pos).copied().unwrap_or_default()
    }

    pub fn count(&self, visual: CellVisual) -> usize {
        self.visuals.values().filter(|&&v| v == visual).count()
    }
}

impl Renderer for RecordingRenderer {
    fn set_cell_visual(&mut self, pos: CellPos, visual: CellVisual) {
        self.visuals.insert(pos, visual);
        self.visual_history.push((pos, visual));
    }

    fn set_token_position(&mut self, pos: CellPos) {
        self.token_positions.push(pos);
    }

    fn set_token_visible(&mut self, visible: bool) {
        self.token_visible = visible;
    }
}

#[derive(Debug, Clone, Copy)]
struct DistEntry {
    dist: f64,
    pos: CellPos,
}

impl PartialEq for DistEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DistEntry {}

impl PartialOrd for DistEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DistEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.dist.total_cmp(&self.dist).then_with(|| other.pos.cmp(&self.pos))
    }
}

/// Reference shortest-path cost (plain Dijkstra, no heuristic)
pub fn dijkstra_cost(grid: &Grid, source: CellPos, target: CellPos, mode: MovementMode) -> Option<f64> {
    let mut best: HashMap<CellPos, f64> = HashMap::new();
    let mut queue = BinaryHeap::new();
    best.insert(source, 0.0);
    queue.push(DistEntry { dist: 0.0, pos: source });

    while let Some(DistEntry { dist, pos }) = queue.pop() {
        if pos == target {
            return Some(dist);
        }
        if dist > best.get(&pos).copied().unwrap_or(f64::INFINITY) {
            continue;
        }
        for (next, cost) in grid.neighbors(pos, mode) {
            let candidate = dist + cost;
            if candidate < best.get(&next).copied().unwrap_or(f64::INFINITY) {
                best.insert(next, candidate);
                queue.push(DistEntry { dist: candidate, pos: next });
            }
        }
    }
    None
}

/// Sum of step costs along a route, checking every step is a legal move
pub fn walk_cost(grid: &Grid, source: CellPos, route: &[CellPos], mode: MovementMode) -> f64 {
    let mut total = 0.0;
    let mut current = source;
    for &next in route {
        let (_, cost) = grid
            .neighbors(current, mode)
            .find(|&(pos, _)| pos == next)
            .unwrap_or_else(|| panic!("{} -> {} is not a legal step", current, next));
        total += cost;
        current = next;
    }
    total
}

/// Random grid plus two distinct free cells
pub fn random_scenario(seed: u64, rows: i32, cols: i32, density: f64) -> (Grid, CellPos, CellPos) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut grid = Grid::new(rows, cols);
    for pos in grid.positions() {
        if rng.random_bool(density) {
            grid.set_obstacle(pos, true, &[]).unwrap();
        }
    }

    let source = CellPos::new(0, 0);
    let target = CellPos::new(rows - 1, cols - 1);
    grid.set_obstacle(source, false, &[]).unwrap();
    grid.set_obstacle(target, false, &[]).unwrap();
    (grid, source, target)
}

/// Feed frames into the session until it is idle again
pub fn run_until_idle<R: Renderer>(session: &mut Session<R>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    for _ in 0..100_000 {
        if session.state() != SessionState::Animating {
            return events;
        }
        if let Some(event) = session.update(Duration::from_millis(16)) {
            events.push(event);
        }
    }
    panic!("session never became idle");
}
