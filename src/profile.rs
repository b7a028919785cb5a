//! Speed profiles: the timing and navigation-depth parameters for a run.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Speed mode selected on the command line or from the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedMode {
    #[default]
    Normal,
    HighSpeed,
    PdfExport,
}

impl SpeedMode {
    /// Resolve the mode from the CLI flags. PDF export needs the long render
    /// waits, so it wins over high speed.
    pub fn from_flags(high_speed: bool, pdf: bool) -> Self {
        match (high_speed, pdf) {
            (_, true) => SpeedMode::PdfExport,
            (true, false) => SpeedMode::HighSpeed,
            (false, false) => SpeedMode::Normal,
        }
    }

    /// Parse a mode name; anything unrecognized is the normal mode.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "fast" | "high-speed" | "high_speed" | "speed" => SpeedMode::HighSpeed,
            "pdf" | "pdf-export" | "pdf_export" => SpeedMode::PdfExport,
            _ => SpeedMode::Normal,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SpeedMode::Normal => "normal",
            SpeedMode::HighSpeed => "high speed",
            SpeedMode::PdfExport => "pdf export",
        }
    }
}

/// Timing and navigation parameters consumed by the plan builder.
///
/// Every delay is open-loop: the target application gives no feedback, so
/// these values are the only synchronization with its processing latency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedProfile {
    pub mode: SpeedMode,
    /// Pause after every click and hotkey
    pub base_pause: Duration,
    /// Tab presses from the report menu to the export control
    pub nav_key_count: usize,
    /// Wait for the export dialog to render
    pub dialog_wait: Duration,
    /// Wait after confirming the typed destination path
    pub path_wait: Duration,
    /// Pause after the first export confirm
    pub confirm_pause: Duration,
    /// Wait after moving to the PDF sub-option
    pub option_wait: Duration,
    /// Wait after the final confirm while the report is written
    pub final_wait: Duration,
    /// Additional dialog wait for slow export formats
    pub extra_wait: Duration,
}

impl SpeedProfile {
    pub fn normal() -> Self {
        Self {
            mode: SpeedMode::Normal,
            base_pause: Duration::from_millis(50),
            nav_key_count: 6,
            dialog_wait: Duration::from_millis(800),
            path_wait: Duration::from_millis(400),
            confirm_pause: Duration::from_millis(150),
            option_wait: Duration::from_millis(300),
            final_wait: Duration::from_millis(400),
            extra_wait: Duration::ZERO,
        }
    }

    pub fn high_speed() -> Self {
        Self {
            mode: SpeedMode::HighSpeed,
            base_pause: Duration::from_millis(20),
            nav_key_count: 6,
            dialog_wait: Duration::from_millis(500),
            path_wait: Duration::from_millis(250),
            confirm_pause: Duration::from_millis(100),
            option_wait: Duration::from_millis(200),
            final_wait: Duration::from_millis(250),
            extra_wait: Duration::ZERO,
        }
    }

    /// The PDF export sits four controls further down the report dialog and
    /// takes far longer to render.
    pub fn pdf_export() -> Self {
        Self {
            mode: SpeedMode::PdfExport,
            nav_key_count: 10,
            final_wait: Duration::from_secs(20),
            extra_wait: Duration::from_secs(1),
            ..Self::normal()
        }
    }

    /// Total wait after opening the export dialog
    pub fn export_dialog_wait(&self) -> Duration {
        self.dialog_wait + self.extra_wait
    }
}

impl Default for SpeedProfile {
    fn default() -> Self {
        Self::normal()
    }
}

/// Map a speed mode to its profile
pub fn select_profile(mode: SpeedMode) -> SpeedProfile {
    match mode {
        SpeedMode::Normal => SpeedProfile::normal(),
        SpeedMode::HighSpeed => SpeedProfile::high_speed(),
        SpeedMode::PdfExport => SpeedProfile::pdf_export(),
    }
}
