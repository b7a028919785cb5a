//! Configuration management with environment variable support.
//!
//! This module provides centralized configuration for the autopilot, supporting:
//! - Environment variables for the run defaults and the target window geometry
//! - Calibrated defaults for the usual two-monitor workstation setup
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SYNCHRO_AUTOPILOT_OUTPUT_DIR` | Default output directory offered by the prompt | `.` |
//! | `SYNCHRO_AUTOPILOT_SPEED` | Default speed mode (`normal`, `fast`, `pdf`) | `normal` |
//! | `SYNCHRO_AUTOPILOT_COUNTDOWN` | Countdown before the run starts (seconds) | `0` |
//! | `SYNCHRO_AUTOPILOT_FAILSAFE` | Corner failsafe enabled | `true` |
//! | `SYNCHRO_AUTOPILOT_SCENARIO_LIST` | Scenario list click position `x,y` | `-300,110` |
//! | `SYNCHRO_AUTOPILOT_APP_FOCUS` | Application focus click position `x,y` | `-1200,700` |
//! | `SYNCHRO_AUTOPILOT_ROW_BASE_Y` | Screen y of the second scenario row | `160` |
//! | `SYNCHRO_AUTOPILOT_ROW_HEIGHT` | Height of one scenario row | `25` |
//!
//! # Example
//!
//! ```bash
//! # Application window moved to the primary monitor
//! export SYNCHRO_AUTOPILOT_APP_FOCUS="800,600"
//! export SYNCHRO_AUTOPILOT_SCENARIO_LIST="1620,110"
//! ```

use std::env;
use std::sync::OnceLock;

// ============================================================================
// Default Values
// ============================================================================

/// Default output directory offered by the interactive prompt
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// Default speed mode name
pub const DEFAULT_SPEED: &str = "normal";

/// Default countdown before the first primitive (seconds)
pub const DEFAULT_COUNTDOWN: u64 = 0;

/// Failsafe is on unless explicitly disabled
pub const DEFAULT_FAILSAFE: bool = true;

/// Default scenario list click position
pub const DEFAULT_SCENARIO_LIST: (i32, i32) = (-300, 110);

/// Default application focus click position
pub const DEFAULT_APP_FOCUS: (i32, i32) = (-1200, 700);

/// Default y coordinate of the second scenario row
pub const DEFAULT_ROW_BASE_Y: i32 = 160;

/// Default height of a scenario row
pub const DEFAULT_ROW_HEIGHT: i32 = 25;

/// Upper bound on scenarios accepted by the interactive prompt
pub const MAX_INTERACTIVE_SCENARIOS: u32 = 16;

// ============================================================================
// Environment Variable Names
// ============================================================================

/// Environment variable for the default output directory
pub const ENV_OUTPUT_DIR: &str = "SYNCHRO_AUTOPILOT_OUTPUT_DIR";

/// Environment variable for the default speed mode
pub const ENV_SPEED: &str = "SYNCHRO_AUTOPILOT_SPEED";

/// Environment variable for the pre-run countdown
pub const ENV_COUNTDOWN: &str = "SYNCHRO_AUTOPILOT_COUNTDOWN";

/// Environment variable toggling the corner failsafe
pub const ENV_FAILSAFE: &str = "SYNCHRO_AUTOPILOT_FAILSAFE";

/// Environment variable for the scenario list position
pub const ENV_SCENARIO_LIST: &str = "SYNCHRO_AUTOPILOT_SCENARIO_LIST";

/// Environment variable for the application focus position
pub const ENV_APP_FOCUS: &str = "SYNCHRO_AUTOPILOT_APP_FOCUS";

/// Environment variable for the second row's y coordinate
pub const ENV_ROW_BASE_Y: &str = "SYNCHRO_AUTOPILOT_ROW_BASE_Y";

/// Environment variable for the scenario row height
pub const ENV_ROW_HEIGHT: &str = "SYNCHRO_AUTOPILOT_ROW_HEIGHT";

// ============================================================================
// Configuration Getters (with caching)
// ============================================================================

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration (initialized from environment on first access)
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Centralized configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Run defaults
    pub run: RunSettings,
    /// Target application geometry
    pub geometry: GeometrySettings,
}

/// Defaults applied to a run when neither flags nor prompts override them
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Output directory offered by the prompt
    pub output_dir: String,
    /// Speed mode name
    pub speed: String,
    /// Countdown before the run (seconds)
    pub countdown: u64,
    /// Whether the corner failsafe is active
    pub failsafe: bool,
}

/// Absolute screen positions of the target application's controls
#[derive(Debug, Clone)]
pub struct GeometrySettings {
    pub scenario_list: (i32, i32),
    pub app_focus: (i32, i32),
    pub row_base_y: i32,
    pub row_height: i32,
}

impl Config {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            run: RunSettings::from_env(),
            geometry: GeometrySettings::from_env(),
        }
    }

    /// Create configuration with all defaults (ignoring environment)
    pub fn defaults() -> Self {
        Self {
            run: RunSettings::defaults(),
            geometry: GeometrySettings::defaults(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

impl RunSettings {
    pub fn from_env() -> Self {
        Self {
            output_dir: env::var(ENV_OUTPUT_DIR).unwrap_or_else(|_| DEFAULT_OUTPUT_DIR.to_string()),
            speed: env::var(ENV_SPEED).unwrap_or_else(|_| DEFAULT_SPEED.to_string()),
            countdown: env::var(ENV_COUNTDOWN)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_COUNTDOWN),
            failsafe: env::var(ENV_FAILSAFE)
                .ok()
                .and_then(|s| parse_flag(&s))
                .unwrap_or(DEFAULT_FAILSAFE),
        }
    }

    pub fn defaults() -> Self {
        Self {
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            speed: DEFAULT_SPEED.to_string(),
            countdown: DEFAULT_COUNTDOWN,
            failsafe: DEFAULT_FAILSAFE,
        }
    }
}

impl GeometrySettings {
    pub fn from_env() -> Self {
        Self {
            scenario_list: env::var(ENV_SCENARIO_LIST)
                .ok()
                .and_then(|s| parse_point(&s))
                .unwrap_or(DEFAULT_SCENARIO_LIST),
            app_focus: env::var(ENV_APP_FOCUS)
                .ok()
                .and_then(|s| parse_point(&s))
                .unwrap_or(DEFAULT_APP_FOCUS),
            row_base_y: env::var(ENV_ROW_BASE_Y)
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_ROW_BASE_Y),
            row_height: env::var(ENV_ROW_HEIGHT)
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_ROW_HEIGHT),
        }
    }

    pub fn defaults() -> Self {
        Self {
            scenario_list: DEFAULT_SCENARIO_LIST,
            app_focus: DEFAULT_APP_FOCUS,
            row_base_y: DEFAULT_ROW_BASE_Y,
            row_height: DEFAULT_ROW_HEIGHT,
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a screen position written as "x,y" (negative values address monitors
/// left of or above the primary display)
fn parse_point(value: &str) -> Option<(i32, i32)> {
    let (x, y) = value.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}

/// Parse a boolean-ish flag value
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Get the default output directory (convenience function)
pub fn default_output_dir() -> String {
    get().run.output_dir.clone()
}

/// Get the default speed mode name (convenience function)
pub fn default_speed() -> String {
    get().run.speed.clone()
}

/// Countdown before the run starts, in seconds (convenience function)
pub fn countdown_secs() -> u64 {
    get().run.countdown
}

/// Whether the corner failsafe is enabled (convenience function)
pub fn failsafe_enabled() -> bool {
    get().run.failsafe
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("-300,110"), Some((-300, 110)));
        assert_eq!(parse_point(" 800 , 600 "), Some((800, 600)));
    }

    #[test]
    fn test_parse_point_invalid() {
        assert_eq!(parse_point("800"), None);
        assert_eq!(parse_point("a,b"), None);
        assert_eq!(parse_point("1,2,3"), None);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::defaults();
        assert_eq!(config.run.output_dir, DEFAULT_OUTPUT_DIR);
        assert_eq!(config.run.speed, DEFAULT_SPEED);
        assert_eq!(config.run.countdown, DEFAULT_COUNTDOWN);
        assert!(config.run.failsafe);
        assert_eq!(config.geometry.scenario_list, (-300, 110));
        assert_eq!(config.geometry.row_base_y, 160);
        assert_eq!(config.geometry.row_height, 25);
    }
}
