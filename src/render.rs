use crate::grid::CellPos;
use crate::pathfinding::ProgressEvent;

/// How a cell should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellVisual {
    #[default]
    Default,
    Obstacle,
    Open,
    Closed,
    Path,
    Start,
    Target,
}

/// Presentation side of a session.
///
/// Cells are addressed by their grid position; turning a position into
/// screen geometry is up to the implementation.
pub trait Renderer {
    fn set_cell_visual(&mut self, pos: CellPos, visual: CellVisual);

    fn set_token_position(&mut self, pos: CellPos);

    fn set_token_visible(&mut self, visible: bool);

    fn apply_progress(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::Opened(pos) => self.set_cell_visual(pos, CellVisual::Open),
            ProgressEvent::Closed(pos) => self.set_cell_visual(pos, CellVisual::Closed),
            ProgressEvent::Path(pos) => self.set_cell_visual(pos, CellVisual::Path),
        }
    }
}
