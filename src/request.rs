use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::MAX_INTERACTIVE_SCENARIOS;
use crate::plan::ExportFormat;
use crate::profile::{SpeedMode, SpeedProfile, select_profile};

/// Where the request's values came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestSource {
    /// Command-line flags; no upper bound on the scenario count
    Flags,
    /// Interactive prompts; at most 16 scenarios
    Interactive,
}

impl RequestSource {
    pub fn max_scenarios(&self) -> Option<u32> {
        match self {
            RequestSource::Flags => None,
            RequestSource::Interactive => Some(MAX_INTERACTIVE_SCENARIOS),
        }
    }
}

/// Everything a run needs, fixed before the first primitive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Directory the reports are written to
    pub output_path: PathBuf,
    pub scenario_count: u32,
    pub export_format: ExportFormat,
    pub profile: SpeedProfile,
    /// Reveal the output directory in the file manager after success
    pub open_when_done: bool,
}

impl RunRequest {
    /// Create a text-export request with the normal profile
    pub fn new(output_path: impl Into<PathBuf>, scenario_count: u32) -> Self {
        Self {
            output_path: output_path.into(),
            scenario_count,
            export_format: ExportFormat::Text,
            profile: SpeedProfile::normal(),
            open_when_done: false,
        }
    }

    pub fn export_format(mut self, format: ExportFormat) -> Self {
        self.export_format = format;
        self
    }

    pub fn profile(mut self, profile: SpeedProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Select the profile for a speed mode
    pub fn speed(self, mode: SpeedMode) -> Self {
        self.profile(select_profile(mode))
    }

    pub fn open_when_done(mut self, open: bool) -> Self {
        self.open_when_done = open;
        self
    }

    /// Reject requests that must never start a run
    pub fn validate(&self, source: RequestSource) -> RequestResult<()> {
        validate_scenario_count(self.scenario_count, source)?;
        validate_output_dir(&self.output_path)
    }
}

/// Check a scenario count against the limits of its source
pub fn validate_scenario_count(count: u32, source: RequestSource) -> RequestResult<()> {
    if count == 0 {
        return Err(RequestError::NoScenarios);
    }
    match source.max_scenarios() {
        Some(max) if count > max => Err(RequestError::TooManyScenarios { count, max }),
        _ => Ok(()),
    }
}

/// Check that the output path is an existing directory
pub fn validate_output_dir(path: &Path) -> RequestResult<()> {
    if !path.exists() {
        return Err(RequestError::MissingDirectory(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(RequestError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

/// Result type for request validation
pub type RequestResult<T> = Result<T, RequestError>;

/// Invalid configuration, detected before a run starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Output path does not exist
    MissingDirectory(PathBuf),

    /// Output path exists but is a file
    NotADirectory(PathBuf),

    /// Scenario count of zero
    NoScenarios,

    /// Scenario count above the source's limit
    TooManyScenarios { count: u32, max: u32 },
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestError::MissingDirectory(path) => {
                write!(f, "Path does not exist: {}", path.display())
            }
            RequestError::NotADirectory(path) => {
                write!(f, "Path is not a directory: {}", path.display())
            }
            RequestError::NoScenarios => write!(f, "Number of scenarios must be positive"),
            RequestError::TooManyScenarios { count, max } => {
                write!(f, "Can only handle up to {} scenarios (got {})", max, count)
            }
        }
    }
}

impl std::error::Error for RequestError {}
