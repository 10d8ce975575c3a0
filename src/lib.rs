pub mod action_log;
pub mod animation;
pub mod config;
pub mod error;
pub mod grid;
pub mod layout;
pub mod pacing;
pub mod pathfinding;
pub mod render;
pub mod route;
pub mod session;

pub use error::{ConfigError, InteractionError, LayoutError};
pub use grid::{Cell, CellPos, Grid, MovementMode};
pub use pathfinding::{search, AStarSearch, ProgressEvent, SearchOutcome, SearchStep};
pub use render::{CellVisual, Renderer};
pub use route::Route;
pub use session::{InteractionMode, Session, SessionEvent, SessionOptions, SessionState};
