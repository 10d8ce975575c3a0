use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::action_log::{Action, ActionLog};
use crate::animation::Animation;
use crate::error::InteractionError;
use crate::grid::{CellPos, Grid, MovementMode};
use crate::pacing::Pacer;
use crate::pathfinding::{AStarSearch, SearchStep};
use crate::render::{CellVisual, Renderer};

/// How clicks map to searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionMode {
    /// One token that moves to whichever cell is clicked
    #[default]
    FreeMove,
    /// Source and target are placed once; runs are started explicitly
    FixedEndpoints,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Obstacles are being painted by a drag
    Drawing,
    /// A search or its animation is in flight; the grid is locked
    Animating,
}

/// Something the user should be told about, produced by [`Session::update`]
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Arrived(CellPos),
    PathNotFound { source: CellPos, target: CellPos },
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub interaction: InteractionMode,
    pub movement: MovementMode,
    pub search_step_delay: Duration,
    pub animation_step_delay: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            interaction: InteractionMode::FreeMove,
            movement: MovementMode::EightConnected,
            search_step_delay: Duration::from_millis(20),
            animation_step_delay: Duration::from_millis(100),
        }
    }
}

enum Phase {
    Searching { search: AStarSearch, pacer: Pacer },
    Moving(Animation),
}

struct ActiveRun {
    source: CellPos,
    target: CellPos,
    phase: Phase,
}

/// Obstacle value applied by the current drag, and the cell it last touched
struct Paint {
    value: bool,
    last: CellPos,
}

/// Owns the grid for one user and decides which actions may touch it.
///
/// All searching and animating is driven by [`Session::update`], which the
/// host calls once per frame with the elapsed time. While a run is in flight
/// the session is `Animating` and refuses every grid edit, run request and
/// clear until the run finishes.
pub struct Session<R: Renderer> {
    grid: Grid,
    renderer: R,
    options: SessionOptions,
    state: SessionState,
    token: Option<CellPos>,
    source: Option<CellPos>,
    target: Option<CellPos>,
    run: Option<ActiveRun>,
    paint: Option<Paint>,
    log: ActionLog,
}

impl<R: Renderer> Session<R> {
    pub fn new(grid: Grid, options: SessionOptions, mut renderer: R) -> Self {
        renderer.set_token_visible(false);
        let mut session = Session {
            grid,
            renderer,
            options,
            state: SessionState::Idle,
            token: None,
            source: None,
            target: None,
            run: None,
            paint: None,
            log: ActionLog::new(),
        };
        session.repaint_all();
        session
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn token(&self) -> Option<CellPos> {
        self.token
    }

    pub fn source(&self) -> Option<CellPos> {
        self.source
    }

    pub fn target(&self) -> Option<CellPos> {
        self.target
    }

    pub fn action_log(&self) -> &ActionLog {
        &self.log
    }

    /// Left click: move the token (free-move) or place endpoints, then edit obstacles (fixed-endpoints)
    pub fn primary_activate(&mut self, pos: CellPos) -> Result<(), InteractionError> {
        let result = self.try_primary_activate(pos);
        self.record(Action::PrimaryActivate { row: pos.row, col: pos.col }, result)
    }

    fn try_primary_activate(&mut self, pos: CellPos) -> Result<(), InteractionError> {
        self.ensure_idle()?;
        self.ensure_in_bounds(pos)?;

        match self.options.interaction {
            InteractionMode::FreeMove => match self.token {
                None => self.place_token(pos),
                Some(token) if token == pos => Ok(()),
                Some(token) => self.begin_run(token, pos),
            },
            InteractionMode::FixedEndpoints => {
                if self.source.is_none() {
                    self.ensure_free(pos)?;
                    self.source = Some(pos);
                    self.paint_cell(pos);
                    Ok(())
                } else if self.target.is_none() {
                    self.ensure_free(pos)?;
                    if self.source == Some(pos) {
                        return Err(InteractionError::ProtectedCell(pos));
                    }
                    self.target = Some(pos);
                    self.paint_cell(pos);
                    Ok(())
                } else {
                    self.toggle(pos)
                }
            }
        }
    }

    /// Right click: flip the obstacle flag of a cell
    pub fn secondary_activate(&mut self, pos: CellPos) -> Result<(), InteractionError> {
        let result = self.ensure_idle().and_then(|_| self.toggle(pos));
        self.record(Action::SecondaryActivate { row: pos.row, col: pos.col }, result)
    }

    /// Begin painting: the first cell is toggled and the resulting value is
    /// applied to every other cell crossed before [`Session::drag_end`]
    pub fn drag_start(&mut self, pos: CellPos) -> Result<(), InteractionError> {
        let result = self.try_drag_start(pos);
        self.record(Action::DragStart { row: pos.row, col: pos.col }, result)
    }

    fn try_drag_start(&mut self, pos: CellPos) -> Result<(), InteractionError> {
        self.ensure_idle()?;
        self.ensure_in_bounds(pos)?;

        let value = !self.grid.is_obstacle(pos);
        self.state = SessionState::Drawing;
        self.paint = Some(Paint { value, last: pos });
        self.paint_obstacle(pos, value);
        Ok(())
    }

    /// Continue painting; ignored unless a drag is in progress
    pub fn drag_over(&mut self, pos: CellPos) {
        if self.state != SessionState::Drawing {
            return;
        }
        let value = match self.paint.as_mut() {
            Some(paint) if paint.last != pos => {
                paint.last = pos;
                paint.value
            }
            _ => return,
        };
        if self.paint_obstacle(pos, value) {
            self.log.log_finish(Action::DragOver { row: pos.row, col: pos.col });
        }
    }

    pub fn drag_end(&mut self) {
        if self.state == SessionState::Drawing {
            self.state = SessionState::Idle;
            self.paint = None;
            self.log.log_finish(Action::DragEnd);
        }
    }

    /// Search from source to target (fixed-endpoints mode)
    pub fn run_requested(&mut self) -> Result<(), InteractionError> {
        let result = self.try_run();
        self.record(Action::RunRequested, result)
    }

    fn try_run(&mut self) -> Result<(), InteractionError> {
        self.ensure_idle()?;
        match (self.options.interaction, self.source, self.target) {
            (InteractionMode::FixedEndpoints, Some(source), Some(target)) => {
                self.begin_run(source, target)
            }
            _ => Err(InteractionError::MissingEndpoints),
        }
    }

    /// Remove every obstacle and endpoint; refused while a run is in flight
    pub fn clear_requested(&mut self) -> Result<(), InteractionError> {
        let result = self.ensure_not_animating().map(|_| self.reset());
        self.record(Action::Clear, result)
    }

    /// Clear, then make each cell an obstacle with the given probability.
    /// In free-move mode the token is first placed on a random cell, which
    /// never becomes an obstacle.
    pub fn randomize_requested<G: Rng>(
        &mut self,
        probability: f64,
        rng: &mut G,
    ) -> Result<(), InteractionError> {
        let result = self.try_randomize(probability, rng);
        self.record(Action::Randomize { probability }, result)
    }

    fn try_randomize<G: Rng>(&mut self, probability: f64, rng: &mut G) -> Result<(), InteractionError> {
        self.ensure_not_animating()?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(InteractionError::InvalidProbability(probability));
        }

        self.reset();
        if self.options.interaction == InteractionMode::FreeMove {
            self.place_token_at_random(rng)?;
        }

        let protected = self.protected();
        for pos in self.grid.positions() {
            if !protected.contains(&pos) && rng.random_bool(probability) {
                self.grid.set_obstacle(pos, true, &protected)?;
            }
        }
        self.repaint_all();

        log::info!(
            "[session] randomized grid: {} obstacles (p={})",
            self.grid.obstacle_count(),
            probability
        );
        Ok(())
    }

    /// Put the token on a random free cell (free-move mode only)
    pub fn place_token_at_random<G: Rng>(
        &mut self,
        rng: &mut G,
    ) -> Result<Option<CellPos>, InteractionError> {
        self.ensure_not_animating()?;
        if self.options.interaction != InteractionMode::FreeMove {
            return Ok(None);
        }

        let free = self.grid.free_cells();
        if free.is_empty() {
            return Ok(None);
        }
        let pos = free[rng.random_range(0..free.len())];
        self.place_token(pos)?;
        Ok(Some(pos))
    }

    /// Set the pause after each finalized search cell; applies to a search in flight
    pub fn speed_changed(&mut self, step_delay_ms: u64) {
        let delay = Duration::from_millis(step_delay_ms);
        self.options.search_step_delay = delay;
        if let Some(ActiveRun {
            phase: Phase::Searching { pacer, .. },
            ..
        }) = self.run.as_mut()
        {
            pacer.set_delay(delay);
        }
        self.log.log_finish(Action::SpeedChanged { step_delay_ms });
    }

    /// Switch between 4 and 8 neighbors; used from the next search on
    pub fn mode_changed(&mut self, neighbors: u8) -> Result<(), InteractionError> {
        let result = MovementMode::from_neighbor_count(neighbors)
            .map(|mode| self.options.movement = mode)
            .ok_or(InteractionError::InvalidMovementMode(neighbors));
        self.record(Action::ModeChanged { neighbors }, result)
    }

    /// Advance the search or animation in flight by `elapsed` (call once per frame)
    pub fn update(&mut self, elapsed: Duration) -> Option<SessionEvent> {
        let mut budget = elapsed;
        loop {
            let run = self.run.as_mut()?;
            let next = match &mut run.phase {
                Phase::Searching { search, pacer } => {
                    if !pacer.poll(&mut budget) {
                        return None;
                    }
                    let renderer = &mut self.renderer;
                    let step = search.step(&mut self.grid, &mut |event| renderer.apply_progress(event));
                    match step {
                        SearchStep::Expanded(_) => {
                            pacer.suspend();
                            continue;
                        }
                        SearchStep::Found(route) => {
                            Phase::Moving(Animation::new(route, self.options.animation_step_delay))
                        }
                        SearchStep::NotFound => return self.finish_run(false),
                    }
                }
                Phase::Moving(animation) => {
                    if animation.update(&mut budget, &mut self.renderer) {
                        return self.finish_run(true);
                    }
                    return None;
                }
            };
            run.phase = next;
        }
    }

    fn begin_run(&mut self, source: CellPos, target: CellPos) -> Result<(), InteractionError> {
        let search = AStarSearch::start(&mut self.grid, source, target, self.options.movement)?;
        // A fixed-endpoints token only rests where the latest run arrived
        if self.options.interaction == InteractionMode::FixedEndpoints {
            self.token = None;
        }
        self.run = Some(ActiveRun {
            source,
            target,
            phase: Phase::Searching {
                search,
                pacer: Pacer::new(self.options.search_step_delay),
            },
        });
        self.state = SessionState::Animating;
        self.repaint_all();
        self.renderer.set_token_position(source);
        self.renderer.set_token_visible(true);
        self.log.log_start(Action::run(source, target));
        log::info!("[session] run {} -> {}", source, target);
        Ok(())
    }

    fn finish_run(&mut self, found: bool) -> Option<SessionEvent> {
        let run = self.run.take()?;
        self.state = SessionState::Idle;

        let event = if found {
            self.token = Some(run.target);
            log::info!("[session] token arrived at {}", run.target);
            SessionEvent::Arrived(run.target)
        } else {
            self.log.log_finish(Action::RouteNotFound {
                to_row: run.target.row,
                to_col: run.target.col,
            });
            log::info!("[session] no route {} -> {}", run.source, run.target);
            SessionEvent::PathNotFound {
                source: run.source,
                target: run.target,
            }
        };
        self.log.log_finish(Action::run(run.source, run.target));

        match self.token {
            Some(token) => self.renderer.set_token_position(token),
            None => self.renderer.set_token_visible(false),
        }
        self.paint_cell(run.source);
        self.paint_cell(run.target);
        Some(event)
    }

    fn reset(&mut self) {
        self.grid.reset_all();
        self.token = None;
        self.source = None;
        self.target = None;
        self.paint = None;
        self.state = SessionState::Idle;
        self.repaint_all();
        self.renderer.set_token_visible(false);
        log::info!("[session] cleared");
    }

    fn place_token(&mut self, pos: CellPos) -> Result<(), InteractionError> {
        self.ensure_free(pos)?;
        let previous = self.token.replace(pos);
        if let Some(previous) = previous {
            self.paint_cell(previous);
        }
        self.paint_cell(pos);
        self.renderer.set_token_position(pos);
        self.renderer.set_token_visible(true);
        Ok(())
    }

    fn toggle(&mut self, pos: CellPos) -> Result<(), InteractionError> {
        let protected = self.protected();
        self.grid.toggle_obstacle(pos, &protected)?;
        self.paint_cell(pos);
        Ok(())
    }

    /// Apply a drag value to one cell; protected cells are skipped silently
    fn paint_obstacle(&mut self, pos: CellPos, value: bool) -> bool {
        let protected = self.protected();
        match self.grid.set_obstacle(pos, value, &protected) {
            Ok(changed) => {
                self.paint_cell(pos);
                changed
            }
            Err(_) => false,
        }
    }

    fn protected(&self) -> Vec<CellPos> {
        [self.token, self.source, self.target]
            .into_iter()
            .flatten()
            .collect()
    }

    fn ensure_idle(&self) -> Result<(), InteractionError> {
        match self.state {
            SessionState::Idle => Ok(()),
            SessionState::Drawing | SessionState::Animating => Err(InteractionError::Busy),
        }
    }

    fn ensure_not_animating(&self) -> Result<(), InteractionError> {
        match self.state {
            SessionState::Animating => Err(InteractionError::Busy),
            SessionState::Idle | SessionState::Drawing => Ok(()),
        }
    }

    fn ensure_in_bounds(&self, pos: CellPos) -> Result<(), InteractionError> {
        if self.grid.in_bounds(pos) {
            Ok(())
        } else {
            Err(InteractionError::OutOfBounds(pos))
        }
    }

    fn ensure_free(&self, pos: CellPos) -> Result<(), InteractionError> {
        self.ensure_in_bounds(pos)?;
        if self.grid.is_obstacle(pos) {
            return Err(InteractionError::ObstacleCell(pos));
        }
        Ok(())
    }

    fn record<T>(&mut self, action: Action, result: Result<T, InteractionError>) -> Result<T, InteractionError> {
        match &result {
            Ok(_) => self.log.log_finish(action),
            Err(e) => {
                log::debug!("[session] rejected {:?}: {}", action, e);
                self.log.log_rejected(action);
            }
        }
        result
    }

    fn base_visual(&self, pos: CellPos) -> CellVisual {
        let run_target = self.run.as_ref().map(|run| run.target);
        if self.source == Some(pos) || (self.source.is_none() && self.token == Some(pos)) {
            CellVisual::Start
        } else if self.target == Some(pos) || run_target == Some(pos) {
            CellVisual::Target
        } else if self.grid.is_obstacle(pos) {
            CellVisual::Obstacle
        } else {
            CellVisual::Default
        }
    }

    fn paint_cell(&mut self, pos: CellPos) {
        let visual = self.base_visual(pos);
        self.renderer.set_cell_visual(pos, visual);
    }

    fn repaint_all(&mut self) {
        for pos in self.grid.positions() {
            self.paint_cell(pos);
        }
    }
}
