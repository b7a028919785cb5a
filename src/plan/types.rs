use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::config;

/// Report file format produced by the export dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Text,
    Pdf,
}

impl ExportFormat {
    pub fn from_pdf_flag(pdf: bool) -> Self {
        if pdf { ExportFormat::Pdf } else { ExportFormat::Text }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => ".txt",
            ExportFormat::Pdf => ".pdf",
        }
    }
}

/// Keys the plans press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Tab,
    Enter,
    Up,
    Down,
    Left,
    F6,
    Char(char),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Tab => write!(f, "tab"),
            Key::Enter => write!(f, "enter"),
            Key::Up => write!(f, "up"),
            Key::Down => write!(f, "down"),
            Key::Left => write!(f, "left"),
            Key::F6 => write!(f, "f6"),
            Key::Char(c) => write!(f, "{}", c),
        }
    }
}

/// Modifier held down for a hotkey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Ctrl,
    Alt,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Ctrl => write!(f, "ctrl"),
            Modifier::Alt => write!(f, "alt"),
        }
    }
}

/// One atomic synthetic input event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionStep {
    /// Left click at an absolute screen position
    Click { x: i32, y: i32 },
    Press { key: Key },
    Hotkey { modifier: Modifier, key: Key },
    /// Literal text injection
    Type { text: String },
    /// Blocking pause; never interrupted once started
    Wait { duration: Duration },
}

impl ActionStep {
    pub fn is_wait(&self) -> bool {
        matches!(self, ActionStep::Wait { .. })
    }
}

impl fmt::Display for ActionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionStep::Click { x, y } => write!(f, "click ({}, {})", x, y),
            ActionStep::Press { key } => write!(f, "press {}", key),
            ActionStep::Hotkey { modifier, key } => write!(f, "hotkey {}+{}", modifier, key),
            ActionStep::Type { text } => write!(f, "type {:?}", text),
            ActionStep::Wait { duration } => write!(f, "wait {}ms", duration.as_millis()),
        }
    }
}

/// Logical phase of a scenario a primitive belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    SelectScenarioList,
    SelectScenarioRow,
    FocusApplication,
    OpenReportMenu,
    NavigateToExport,
    OpenExportDialog,
    SetOutputDirectory,
    FocusFileList,
    SelectExistingFile,
    ConfirmExport,
}

impl Stage {
    /// Status line shown while the stage runs
    pub fn describe(&self, index: u32, format: ExportFormat) -> String {
        match self {
            Stage::SelectScenarioList => "Selecting scenario...".to_string(),
            Stage::SelectScenarioRow => format!("Selecting scenario {}...", index),
            Stage::FocusApplication => "Clicking Synchro interface...".to_string(),
            Stage::OpenReportMenu => "Opening create report menu...".to_string(),
            Stage::NavigateToExport => "Navigating report interface...".to_string(),
            Stage::OpenExportDialog => "Opening export dialog...".to_string(),
            Stage::SetOutputDirectory => "Setting output directory...".to_string(),
            Stage::FocusFileList => "Navigating directory...".to_string(),
            Stage::SelectExistingFile => format!("Selecting file {}...", index),
            Stage::ConfirmExport => match format {
                ExportFormat::Pdf => "Processing PDF export...".to_string(),
                ExportFormat::Text => "Processing .txt export...".to_string(),
            },
        }
    }
}

/// A primitive tagged with the stage that produced it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlannedStep {
    pub stage: Stage,
    pub action: ActionStep,
}

/// Fixed absolute geometry of the target application's controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenLayout {
    /// Header of the scenario list; clicking it opens the list
    pub scenario_list: (i32, i32),
    /// Any point inside the main application window
    pub app_focus: (i32, i32),
    /// Screen y of the second scenario row
    pub row_base_y: i32,
    pub row_height: i32,
}

impl ScreenLayout {
    /// Screen y of the row that selects `index` (index ≥ 2). Saturates at the
    /// `i32` range for counts no list could hold.
    pub fn row_y(&self, index: u32) -> i32 {
        let offset = (i64::from(index) - 2).saturating_mul(i64::from(self.row_height));
        let y = i64::from(self.row_base_y).saturating_add(offset);
        y.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }
}

impl Default for ScreenLayout {
    fn default() -> Self {
        let geometry = &config::get().geometry;
        Self {
            scenario_list: geometry.scenario_list,
            app_focus: geometry.app_focus,
            row_base_y: geometry.row_base_y,
            row_height: geometry.row_height,
        }
    }
}

/// Ordered primitives for one scenario
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScenarioPlan {
    pub index: u32,
    pub total: u32,
    pub format: ExportFormat,
    pub steps: Vec<PlannedStep>,
}

impl ScenarioPlan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_first(&self) -> bool {
        self.index <= 1
    }

    /// The bare primitives in execution order
    pub fn actions(&self) -> impl Iterator<Item = &ActionStep> {
        self.steps.iter().map(|s| &s.action)
    }

    /// Primitives belonging to one stage
    pub fn stage_actions(&self, stage: Stage) -> Vec<&ActionStep> {
        self.steps
            .iter()
            .filter(|s| s.stage == stage)
            .map(|s| &s.action)
            .collect()
    }

    pub fn contains_stage(&self, stage: Stage) -> bool {
        self.steps.iter().any(|s| s.stage == stage)
    }

    /// Number of distinct stages, in order of first appearance
    pub fn stage_count(&self) -> usize {
        let mut count = 0;
        let mut last = None;
        for step in &self.steps {
            if last != Some(step.stage) {
                count += 1;
                last = Some(step.stage);
            }
        }
        count
    }
}
