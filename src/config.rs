use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::grid::{MovementMode, MAX_SIDE};
use crate::session::{InteractionMode, SessionOptions};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub randomize: RandomizeConfig,
    #[serde(default)]
    pub visual: VisualConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_rows")]
    pub rows: i32,
    #[serde(default = "default_cols")]
    pub cols: i32,
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
}

#[derive(Debug, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub movement: MovementMode,
    /// Pause after each finalized cell
    #[serde(default = "default_search_step_delay_ms")]
    pub step_delay_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct AnimationConfig {
    /// Pause after each token move
    #[serde(default = "default_animation_step_delay_ms")]
    pub step_delay_ms: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct InteractionConfig {
    #[serde(default)]
    pub mode: InteractionMode,
}

#[derive(Debug, Deserialize)]
pub struct RandomizeConfig {
    #[serde(default = "default_obstacle_probability")]
    pub obstacle_probability: f64,
}

#[derive(Debug, Deserialize)]
pub struct VisualConfig {
    #[serde(default = "default_window_title")]
    pub window_title: String,
    #[serde(default = "default_bg_r")]
    pub background_r: u8,
    #[serde(default = "default_bg_g")]
    pub background_g: u8,
    #[serde(default = "default_bg_b")]
    pub background_b: u8,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Default log filter, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub enable_action_log: bool,
    #[serde(default = "default_action_log_path")]
    pub action_log_path: String,
}

const CONFIG_PATH: &str = "config.toml";

// Default values
fn default_rows() -> i32 { 20 }
fn default_cols() -> i32 { 20 }
fn default_cell_size() -> f32 { 28.0 }
fn default_search_step_delay_ms() -> u64 { 20 }
fn default_animation_step_delay_ms() -> u64 { 100 }
fn default_obstacle_probability() -> f64 { 0.25 }
fn default_window_title() -> String { "PathGrid - A* Visualizer".to_string() }
fn default_bg_r() -> u8 { 30 }
fn default_bg_g() -> u8 { 30 }
fn default_bg_b() -> u8 { 30 }
fn default_log_level() -> String { "info".to_string() }
fn default_action_log_path() -> String { "action_log.json".to_string() }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cols: default_cols(),
            cell_size: default_cell_size(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            movement: MovementMode::default(),
            step_delay_ms: default_search_step_delay_ms(),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: default_animation_step_delay_ms(),
        }
    }
}

impl Default for RandomizeConfig {
    fn default() -> Self {
        Self {
            obstacle_probability: default_obstacle_probability(),
        }
    }
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            window_title: default_window_title(),
            background_r: default_bg_r(),
            background_g: default_bg_g(),
            background_b: default_bg_b(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            enable_action_log: false,
            action_log_path: default_action_log_path(),
        }
    }
}

impl Config {
    /// Load configuration from config.toml, or use defaults if it is missing or invalid.
    ///
    /// The load error is returned alongside; report it with
    /// [`Config::report_load`] once logging is initialised.
    pub fn load() -> (Self, Option<ConfigError>) {
        Self::load_or_default(CONFIG_PATH)
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> (Self, Option<ConfigError>) {
        match Self::load_from(path) {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(e)),
        }
    }

    /// Log the outcome of [`Config::load`]
    pub fn report_load(error: Option<&ConfigError>) {
        match error {
            None => log::info!("Loaded configuration from {}", CONFIG_PATH),
            Some(ConfigError::Io(_)) => {
                log::info!("No {} found, using default configuration", CONFIG_PATH)
            }
            Some(e) => log::warn!("{}; using default configuration", e),
        }
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let sides = 1..=MAX_SIDE;
        if !sides.contains(&self.grid.rows) || !sides.contains(&self.grid.cols) {
            return Err(ConfigError::Invalid(format!(
                "grid must be between 1x1 and {}x{}, got {}x{}",
                MAX_SIDE, MAX_SIDE, self.grid.rows, self.grid.cols
            )));
        }
        if !(0.0..=1.0).contains(&self.randomize.obstacle_probability) {
            return Err(ConfigError::Invalid(format!(
                "randomize.obstacle_probability must be within 0..=1, got {}",
                self.randomize.obstacle_probability
            )));
        }
        Ok(())
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            interaction: self.interaction.mode,
            movement: self.search.movement,
            search_step_delay: Duration::from_millis(self.search.step_delay_ms),
            animation_step_delay: Duration::from_millis(self.animation.step_delay_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();

        assert_eq!(config.grid.rows, 20);
        assert_eq!(config.grid.cols, 20);
        assert_eq!(config.search.movement, MovementMode::EightConnected);
        assert_eq!(config.interaction.mode, InteractionMode::FreeMove);
        assert_eq!(config.animation.step_delay_ms, 100);
        assert!(!config.logging.enable_action_log);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml_str(
            r#"
            [grid]
            rows = 8

            [search]
            movement = "four-connected"
            step_delay_ms = 5

            [interaction]
            mode = "fixed-endpoints"
            "#,
        )
        .unwrap();

        assert_eq!(config.grid.rows, 8);
        assert_eq!(config.grid.cols, 20);

        let options = config.session_options();
        assert_eq!(options.movement, MovementMode::FourConnected);
        assert_eq!(options.interaction, InteractionMode::FixedEndpoints);
        assert_eq!(options.search_step_delay, Duration::from_millis(5));
        assert_eq!(options.animation_step_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = Config::from_toml_str("[grid]\nrows = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = Config::from_toml_str("[grid]\nrows = 100000\ncols = 100000").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let config = Config::from_toml_str(&format!("[grid]\nrows = {}\ncols = {}", MAX_SIDE, MAX_SIDE)).unwrap();
        assert_eq!(config.grid.rows, MAX_SIDE);

        let err = Config::from_toml_str("[randomize]\nobstacle_probability = 1.5").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = Config::from_toml_str("[search]\nmovement = \"hex\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[animation]\nstep_delay_ms = 40").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.animation.step_delay_ms, 40);

        let missing = Config::load_from(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_invalid_file_falls_back_with_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[grid]\nrows = \"many\"").unwrap();

        let (config, error) = Config::load_or_default(file.path());
        assert_eq!(config.grid.rows, 20);
        assert!(matches!(error, Some(ConfigError::Parse(_))));

        let (_, error) = Config::load_or_default(file.path().with_extension("missing"));
        assert!(matches!(error, Some(ConfigError::Io(_))));
    }
}
