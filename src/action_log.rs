use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::grid::CellPos;

/// Whether an action began, took effect, or was refused
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ActionPhase {
    Start,
    Finish,
    Rejected,
}

/// User actions and run milestones recorded by a session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Left click on a cell (row, col)
    PrimaryActivate { row: i32, col: i32 },
    /// Toggle click on a cell (row, col)
    SecondaryActivate { row: i32, col: i32 },
    DragStart { row: i32, col: i32 },
    DragOver { row: i32, col: i32 },
    DragEnd,
    /// Search and animation between two cells
    Run { from_row: i32, from_col: i32, to_row: i32, to_col: i32 },
    /// A run ended without a route
    RouteNotFound { to_row: i32, to_col: i32 },
    RunRequested,
    Clear,
    Randomize { probability: f64 },
    SpeedChanged { step_delay_ms: u64 },
    ModeChanged { neighbors: u8 },
}

impl Action {
    pub fn run(from: CellPos, to: CellPos) -> Self {
        Action::Run {
            from_row: from.row,
            from_col: from.col,
            to_row: to.row,
            to_col: to.col,
        }
    }
}

/// Logged action with timestamp and phase
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggedAction {
    /// Milliseconds since the log was created
    pub timestamp_ms: u64,
    pub action: Action,
    pub phase: ActionPhase,
}

/// Action logger
pub struct ActionLog {
    start_time: Instant,
    actions: Vec<LoggedAction>,
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionLog {
    pub fn new() -> Self {
        ActionLog {
            start_time: Instant::now(),
            actions: Vec::new(),
        }
    }

    /// Log an action with current timestamp and phase
    pub fn log(&mut self, action: Action, phase: ActionPhase) {
        let timestamp_ms = self.start_time.elapsed().as_millis() as u64;
        self.actions.push(LoggedAction {
            timestamp_ms,
            action,
            phase,
        });
    }

    pub fn log_start(&mut self, action: Action) {
        self.log(action, ActionPhase::Start);
    }

    pub fn log_finish(&mut self, action: Action) {
        self.log(action, ActionPhase::Finish);
    }

    pub fn log_rejected(&mut self, action: Action) {
        self.log(action, ActionPhase::Rejected);
    }

    pub fn actions(&self) -> &[LoggedAction] {
        &self.actions
    }

    /// Save log to JSON file
    pub fn save_to_file(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(&self.actions)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Get summary statistics
    pub fn summary(&self) -> String {
        let mut edits = 0;
        let mut runs_started = 0;
        let mut runs_finished = 0;
        let mut not_found = 0;
        let mut clears = 0;
        let mut rejected = 0;

        for logged in &self.actions {
            match (&logged.phase, &logged.action) {
                (ActionPhase::Rejected, _) => rejected += 1,
                (ActionPhase::Start, Action::Run { .. }) => runs_started += 1,
                (ActionPhase::Finish, Action::Run { .. }) => runs_finished += 1,
                (ActionPhase::Finish, Action::RouteNotFound { .. }) => not_found += 1,
                (ActionPhase::Finish, Action::Clear | Action::Randomize { .. }) => clears += 1,
                (
                    ActionPhase::Finish,
                    Action::SecondaryActivate { .. } | Action::DragStart { .. } | Action::DragOver { .. },
                ) => edits += 1,
                _ => {}
            }
        }

        let duration = self.actions.last().map_or(0, |last| last.timestamp_ms);

        format!(
            "Session Duration: {}ms\n\
             Total Events: {} ({} rejected)\n\
             Runs: {} started, {} finished, {} without route\n\
             Grid Edits: {} cell edits, {} clears",
            duration,
            self.actions.len(),
            rejected,
            runs_started,
            runs_finished,
            not_found,
            edits,
            clears
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_phases() {
        let mut log = ActionLog::new();
        let run = Action::run(CellPos::new(0, 0), CellPos::new(2, 2));
        log.log_start(run.clone());
        log.log_rejected(Action::SecondaryActivate { row: 1, col: 1 });
        log.log_finish(run);
        log.log_finish(Action::DragStart { row: 0, col: 1 });
        log.log_finish(Action::Clear);

        let summary = log.summary();
        assert!(summary.contains("Total Events: 5 (1 rejected)"), "{}", summary);
        assert!(summary.contains("Runs: 1 started, 1 finished, 0 without route"), "{}", summary);
        assert!(summary.contains("Grid Edits: 1 cell edits, 1 clears"), "{}", summary);
    }

    #[test]
    fn test_actions_serialize_to_json() {
        let mut log = ActionLog::new();
        log.log_finish(Action::ModeChanged { neighbors: 4 });

        let json = serde_json::to_string(log.actions()).unwrap();
        assert!(json.contains("\"ModeChanged\""));
        assert!(json.contains("\"Finish\""));

        let back: Vec<LoggedAction> = serde_json::from_str(&json).unwrap();
        assert_eq!(back[0].action, Action::ModeChanged { neighbors: 4 });
    }
}
