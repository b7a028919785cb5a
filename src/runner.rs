//! Scenario sequencing: runs every scenario's plan in order and reports
//! progress to a presentation sink.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::MAX_INTERACTIVE_SCENARIOS;
use crate::input::{DispatchError, DispatchResult, Dispatcher, InputBackend};
use crate::plan::{ActionStep, PlanBuilder, ScreenLayout, Stage};
use crate::request::RunRequest;

/// Result of a single completed scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Scenario number (1-based)
    pub index: u32,

    /// Wall-clock time from first to last primitive
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

/// Why a run stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    #[default]
    None,
    Failsafe,
    UserInterrupt,
    AutomationError,
}

impl From<&DispatchError> for AbortReason {
    fn from(err: &DispatchError) -> Self {
        match err {
            DispatchError::Failsafe { .. } => AbortReason::Failsafe,
            DispatchError::Interrupted => AbortReason::UserInterrupt,
            DispatchError::Injection(_) => AbortReason::AutomationError,
        }
    }
}

/// Result of a complete run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Whether every scenario completed
    pub completed: bool,

    /// Completed scenarios, in order (an interrupted scenario is never listed)
    pub results: Vec<ScenarioResult>,

    pub abort_reason: AbortReason,

    /// Error message if aborted
    pub error: Option<String>,

    #[serde(with = "duration_secs")]
    pub total_elapsed: Duration,
}

impl RunResult {
    pub fn completed_count(&self) -> usize {
        self.results.len()
    }

    /// Stopped by the operator rather than by a fault
    pub fn is_operator_abort(&self) -> bool {
        matches!(
            self.abort_reason,
            AbortReason::Failsafe | AbortReason::UserInterrupt
        )
    }
}

/// Lifecycle of a runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running { scenario: u32 },
    Completed,
    Aborted(AbortReason),
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Aborted(_))
    }

    /// Legal transitions: Idle → Running(1), Running(i) → Running(i+1),
    /// Running → Completed | Aborted. Terminal states are final.
    pub fn can_transition_to(&self, next: &RunState) -> bool {
        match (self, next) {
            (RunState::Idle, RunState::Running { scenario }) => *scenario == 1,
            (RunState::Idle, RunState::Aborted(_)) => true,
            (RunState::Running { scenario: current }, RunState::Running { scenario }) => {
                *scenario == current + 1
            }
            (RunState::Running { .. }, RunState::Completed | RunState::Aborted(_)) => true,
            _ => false,
        }
    }
}

/// Progress notifications for the presentation layer
#[derive(Debug, Clone)]
pub enum RunEvent<'a> {
    ScenarioStarted { index: u32, total: u32, steps: usize },
    StageStarted { index: u32, stage: Stage, label: String },
    StepStarted { index: u32, step: usize, total: usize, action: &'a ActionStep },
    StepCompleted { index: u32, done: usize, total: usize },
    ScenarioCompleted { result: &'a ScenarioResult, total: u32 },
    RunFinished(&'a RunResult),
}

impl RunEvent<'_> {
    /// Fraction of the current scenario's primitives delivered
    pub fn progress(&self) -> Option<f64> {
        match self {
            RunEvent::StepCompleted { done, total, .. } if *total > 0 => {
                Some(*done as f64 / *total as f64)
            }
            _ => None,
        }
    }
}

/// Receives progress events during a run
pub trait ProgressSink {
    fn on_event(&mut self, event: &RunEvent<'_>);
}

/// A sink that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_event(&mut self, _event: &RunEvent<'_>) {}
}

/// Executes scenarios 1..=N against a dispatcher
pub struct Runner<B> {
    dispatcher: Dispatcher<B>,
    layout: ScreenLayout,
    state: RunState,
}

impl<B: InputBackend> Runner<B> {
    pub fn new(dispatcher: Dispatcher<B>, layout: ScreenLayout) -> Self {
        Self {
            dispatcher,
            layout,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn dispatcher(&self) -> &Dispatcher<B> {
        &self.dispatcher
    }

    pub fn into_dispatcher(self) -> Dispatcher<B> {
        self.dispatcher
    }

    fn transition(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "illegal run transition {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
    }

    /// Run every scenario of the request. Never fails: aborts are reported
    /// through the returned result.
    pub fn run(&mut self, request: &RunRequest, sink: &mut dyn ProgressSink) -> RunResult {
        if self.state != RunState::Idle {
            warn!(state = ?self.state, "runner already used");
            return RunResult {
                completed: false,
                results: Vec::new(),
                abort_reason: AbortReason::AutomationError,
                error: Some("runner has already finished a run".to_string()),
                total_elapsed: Duration::ZERO,
            };
        }

        let builder = PlanBuilder::new(
            request.profile.clone(),
            self.layout,
            request.output_path.clone(),
        );
        let total = request.scenario_count;
        let started = Instant::now();
        // Flag mode does not bound the count; size for a typical run
        let capacity = (total as usize).min(MAX_INTERACTIVE_SCENARIOS as usize);
        let mut results = Vec::with_capacity(capacity);
        let mut failure = None;

        info!(
            scenarios = total,
            format = ?request.export_format,
            mode = request.profile.mode.label(),
            "starting run"
        );

        let cancel = self.dispatcher.cancel_token().clone();
        cancel.arm();
        for index in 1..=total {
            self.transition(RunState::Running { scenario: index });
            match self.run_scenario(&builder, request, index, sink) {
                Ok(result) => {
                    info!(
                        scenario = index,
                        elapsed_ms = result.elapsed.as_millis() as u64,
                        "scenario completed"
                    );
                    sink.on_event(&RunEvent::ScenarioCompleted { result: &result, total });
                    results.push(result);
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }
        cancel.disarm();

        let total_elapsed = started.elapsed();
        let result = match failure {
            None => {
                self.transition(RunState::Completed);
                RunResult {
                    completed: true,
                    results,
                    abort_reason: AbortReason::None,
                    error: None,
                    total_elapsed,
                }
            }
            Some(err) => {
                let reason = AbortReason::from(&err);
                self.transition(RunState::Aborted(reason));
                warn!(reason = ?reason, completed = results.len(), "run aborted: {}", err);
                RunResult {
                    completed: false,
                    results,
                    abort_reason: reason,
                    error: Some(err.to_string()),
                    total_elapsed,
                }
            }
        };

        sink.on_event(&RunEvent::RunFinished(&result));
        result
    }

    fn run_scenario(
        &mut self,
        builder: &PlanBuilder,
        request: &RunRequest,
        index: u32,
        sink: &mut dyn ProgressSink,
    ) -> DispatchResult<ScenarioResult> {
        let plan = builder.plan(index, request.scenario_count, request.export_format);
        let started = Instant::now();
        let steps = plan.len();

        sink.on_event(&RunEvent::ScenarioStarted {
            index,
            total: request.scenario_count,
            steps,
        });

        let mut stage = None;
        for (i, planned) in plan.steps.iter().enumerate() {
            if stage != Some(planned.stage) {
                stage = Some(planned.stage);
                sink.on_event(&RunEvent::StageStarted {
                    index,
                    stage: planned.stage,
                    label: planned.stage.describe(index, request.export_format),
                });
            }
            sink.on_event(&RunEvent::StepStarted {
                index,
                step: i + 1,
                total: steps,
                action: &planned.action,
            });
            self.dispatcher.dispatch(&planned.action)?;
            sink.on_event(&RunEvent::StepCompleted {
                index,
                done: i + 1,
                total: steps,
            });
        }

        Ok(ScenarioResult {
            index,
            elapsed: started.elapsed(),
        })
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
