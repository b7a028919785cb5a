//! Synchro Autopilot - batch report generation through synthetic input.
//!
//! This crate provides:
//! - Speed profiles with calibrated, open-loop delays
//! - A deterministic per-scenario plan builder (clicks, keys, hotkeys, text, waits)
//! - A runner that executes plans in order, reports progress and unwinds
//!   cleanly on failsafe, operator interrupt or injection faults
//! - Desktop (enigo) and recording input backends
//! - Console presentation and interactive prompts for the binary
//!
//! # Example
//!
//! ```rust,no_run
//! use synchro_autopilot::{
//!     CancelToken, DesktopBackend, Dispatcher, NullSink, RunRequest, Runner, ScreenLayout,
//! };
//!
//! let backend = DesktopBackend::new().unwrap();
//! let dispatcher = Dispatcher::new(backend, CancelToken::new()).enable_failsafe().unwrap();
//! let mut runner = Runner::new(dispatcher, ScreenLayout::default());
//! let result = runner.run(&RunRequest::new("C:\\Reports", 3), &mut NullSink);
//! println!("{} report(s) generated", result.completed_count());
//! ```

pub mod cancel;
pub mod config;
pub mod console;
pub mod input;
pub mod output;
pub mod plan;
pub mod profile;
pub mod prompt;
pub mod request;
pub mod runner;

// Re-export runner types
pub use runner::{
    AbortReason, NullSink, ProgressSink, RunEvent, RunResult, RunState, Runner, ScenarioResult,
};

// Re-export plan types
pub use plan::{
    ActionStep, ExportFormat, Key, Modifier, PlanBuilder, PlannedStep, ScenarioPlan, ScreenLayout,
    Stage,
};

// Re-export input backends
pub use input::{
    DesktopBackend, DispatchError, DispatchResult, Dispatcher, FailsafeGuard, InputBackend,
    RecordingBackend,
};

pub use cancel::{CancelToken, install_interrupt_handler};
pub use profile::{SpeedMode, SpeedProfile, select_profile};
pub use request::{RequestError, RequestResult, RequestSource, RunRequest};
