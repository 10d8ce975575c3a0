use std::time::Duration;

use crate::pacing::Pacer;
use crate::render::Renderer;
use crate::route::Route;

/// Moves the token along a route one cell per step delay
#[derive(Debug, Clone)]
pub struct Animation {
    route: Route,
    /// Index of the next route cell to show
    next: usize,
    pacer: Pacer,
}

impl Animation {
    pub fn new(route: Route, step_delay: Duration) -> Self {
        Animation {
            route,
            next: 0,
            pacer: Pacer::new(step_delay),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.next > self.route.len()
    }

    /// Advance by as many steps as `budget` allows (call once per frame).
    /// Returns true once the last cell has been shown and its delay has elapsed.
    pub fn update<R: Renderer + ?Sized>(&mut self, budget: &mut Duration, renderer: &mut R) -> bool {
        while !self.is_finished() && self.pacer.poll(budget) {
            if let Some(&pos) = self.route.cells().get(self.next) {
                renderer.set_token_position(pos);
                self.pacer.suspend();
            }
            self.next += 1;
        }
        self.is_finished()
    }
}
