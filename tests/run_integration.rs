//! End-to-end runs against the recording backend

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use synchro_autopilot::{
    AbortReason, ActionStep, CancelToken, Dispatcher, ExportFormat, FailsafeGuard, Key,
    PlanBuilder, ProgressSink, RecordingBackend, RequestSource, RunEvent, RunRequest, RunState,
    Runner, ScreenLayout, SpeedMode, SpeedProfile,
};

fn layout() -> ScreenLayout {
    ScreenLayout {
        scenario_list: (-300, 110),
        app_focus: (-1200, 700),
        row_base_y: 160,
        row_height: 25,
    }
}

fn runner(backend: RecordingBackend, cancel: CancelToken) -> Runner<RecordingBackend> {
    Runner::new(Dispatcher::new(backend, cancel), layout())
}

fn expected_actions(request: &RunRequest) -> Vec<ActionStep> {
    PlanBuilder::new(request.profile.clone(), layout(), request.output_path.clone())
        .plan_all(request.scenario_count, request.export_format)
        .into_iter()
        .flat_map(|plan| plan.steps.into_iter().map(|step| step.action))
        .collect()
}

/// Recorded primitives cut into one slice per scenario, by plan length
fn per_scenario(recorded: &[ActionStep], request: &RunRequest) -> Vec<Vec<ActionStep>> {
    let builder = PlanBuilder::new(request.profile.clone(), layout(), request.output_path.clone());
    let mut rest = recorded;
    let mut scenarios = Vec::new();
    for plan in builder.plan_all(request.scenario_count, request.export_format) {
        let (head, tail) = rest.split_at(plan.len());
        scenarios.push(head.to_vec());
        rest = tail;
    }
    assert!(rest.is_empty(), "{} unplanned primitives", rest.len());
    scenarios
}

/// Records a compact trace of the events a run emits
#[derive(Default)]
struct TraceSink {
    events: Vec<String>,
    progress: Vec<f64>,
}

impl ProgressSink for TraceSink {
    fn on_event(&mut self, event: &RunEvent<'_>) {
        if let Some(progress) = event.progress() {
            self.progress.push(progress);
        }
        match event {
            RunEvent::ScenarioStarted { index, .. } => self.events.push(format!("start {}", index)),
            RunEvent::ScenarioCompleted { result, .. } => {
                self.events.push(format!("done {}", result.index))
            }
            RunEvent::RunFinished(result) => {
                self.events.push(format!("finished {:?}", result.abort_reason))
            }
            _ => {}
        }
    }
}

/// Cancels the token once the given scenario has completed
struct CancelAfter {
    token: CancelToken,
    scenario: u32,
}

impl ProgressSink for CancelAfter {
    fn on_event(&mut self, event: &RunEvent<'_>) {
        if let RunEvent::ScenarioCompleted { result, .. } = event {
            if result.index == self.scenario {
                self.token.cancel();
            }
        }
    }
}

#[test]
fn test_full_run_dispatches_every_plan_in_order() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let request = RunRequest::new(dir.path(), 3);
    request
        .validate(RequestSource::Flags)
        .expect("request should be valid");

    let mut runner = runner(RecordingBackend::new(), CancelToken::new());
    let mut sink = TraceSink::default();
    let result = runner.run(&request, &mut sink);

    assert!(result.completed);
    assert_eq!(result.abort_reason, AbortReason::None);
    assert_eq!(result.error, None);
    assert_eq!(
        result.results.iter().map(|r| r.index).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(runner.state(), RunState::Completed);

    let recorded = runner.into_dispatcher().into_backend().into_recorded();
    assert_eq!(recorded, expected_actions(&request));

    assert_eq!(
        sink.events,
        vec!["start 1", "done 1", "start 2", "done 2", "start 3", "done 3", "finished None"]
    );
}

#[test]
fn test_first_scenario_types_the_output_path_once() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let request = RunRequest::new(dir.path(), 4);

    let mut runner = runner(RecordingBackend::new(), CancelToken::new());
    runner.run(&request, &mut synchro_autopilot::NullSink);
    let recorded = runner.into_dispatcher().into_backend().into_recorded();

    let typed: Vec<&ActionStep> = recorded
        .iter()
        .filter(|step| matches!(step, ActionStep::Type { .. }))
        .collect();
    assert_eq!(
        typed,
        vec![&ActionStep::Type {
            text: dir.path().display().to_string()
        }]
    );
}

#[test]
fn test_later_scenarios_click_their_row() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let request = RunRequest::new(dir.path(), 3);

    let mut runner = runner(RecordingBackend::new(), CancelToken::new());
    runner.run(&request, &mut synchro_autopilot::NullSink);
    let recorded = runner.into_dispatcher().into_backend().into_recorded();

    let row_clicks: Vec<(i32, i32)> = recorded
        .iter()
        .filter_map(|step| match step {
            ActionStep::Click { x, y } if *x == -300 && *y != 110 => Some((*x, *y)),
            _ => None,
        })
        .collect();
    assert_eq!(row_clicks, vec![(-300, 160), (-300, 185)]);
}

#[test]
fn test_pdf_run_adds_option_step_per_scenario() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let text = RunRequest::new(dir.path(), 2);
    let pdf = RunRequest::new(dir.path(), 2)
        .export_format(ExportFormat::Pdf)
        .speed(SpeedMode::PdfExport);

    let mut text_runner = runner(RecordingBackend::new(), CancelToken::new());
    text_runner.run(&text, &mut synchro_autopilot::NullSink);
    let text_log = text_runner.into_dispatcher().into_backend().into_recorded();

    let mut pdf_runner = runner(RecordingBackend::new(), CancelToken::new());
    let result = pdf_runner.run(&pdf, &mut synchro_autopilot::NullSink);
    let pdf_log = pdf_runner.into_dispatcher().into_backend().into_recorded();

    assert!(result.completed);
    let lefts = pdf_log
        .iter()
        .filter(|step| **step == ActionStep::Press { key: Key::Left })
        .count();
    assert_eq!(lefts, 2);
    assert!(!text_log.contains(&ActionStep::Press { key: Key::Left }));

    let tabs = |log: &[ActionStep]| {
        log.iter()
            .filter(|step| **step == ActionStep::Press { key: Key::Tab })
            .count()
    };
    assert_eq!(tabs(&text_log), 2 * 6);
    assert_eq!(tabs(&pdf_log), 2 * 10);
}

#[test]
fn test_single_text_scenario_matches_first_template() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let request = RunRequest::new(dir.path(), 1);

    let mut runner = runner(RecordingBackend::new(), CancelToken::new());
    let result = runner.run(&request, &mut synchro_autopilot::NullSink);
    let recorded = runner.into_dispatcher().into_backend().into_recorded();

    assert!(result.completed);
    assert_eq!(result.results.len(), 1);

    let first = PlanBuilder::new(SpeedProfile::normal(), layout(), dir.path())
        .plan(1, 1, ExportFormat::Text);
    assert_eq!(recorded.len(), first.len());
    assert_eq!(recorded, first.actions().cloned().collect::<Vec<_>>());
}

#[test]
fn test_three_pdf_scenarios_select_rows_and_pick_pdf_option() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let request = RunRequest::new(dir.path(), 3)
        .export_format(ExportFormat::Pdf)
        .speed(SpeedMode::PdfExport);
    let profile = SpeedProfile::pdf_export();

    let mut runner = runner(RecordingBackend::new(), CancelToken::new());
    let result = runner.run(&request, &mut synchro_autopilot::NullSink);
    let recorded = runner.into_dispatcher().into_backend().into_recorded();

    assert!(result.completed);
    assert_eq!(result.results.len(), 3);

    let scenarios = per_scenario(&recorded, &request);
    assert_eq!(scenarios.len(), 3);

    // The first scenario is already selected
    assert_eq!(scenarios[0][0], ActionStep::Click { x: -1200, y: 700 });
    assert!(
        !scenarios[0]
            .iter()
            .any(|step| matches!(step, ActionStep::Click { x: -300, .. }))
    );

    for (index, steps) in scenarios.iter().enumerate().skip(1) {
        let row_y = layout().row_y(index as u32 + 1);
        assert_eq!(
            steps[..4].to_vec(),
            vec![
                ActionStep::Click { x: -300, y: 110 },
                ActionStep::Wait { duration: profile.base_pause },
                ActionStep::Click { x: -300, y: row_y },
                ActionStep::Wait { duration: profile.base_pause },
            ]
        );
    }

    for steps in &scenarios {
        assert_eq!(
            steps[steps.len() - 4..].to_vec(),
            vec![
                ActionStep::Press { key: Key::Left },
                ActionStep::Wait { duration: profile.option_wait },
                ActionStep::Press { key: Key::Enter },
                ActionStep::Wait { duration: profile.final_wait },
            ]
        );
    }
}

#[test]
fn test_failsafe_stops_before_next_primitive() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let request = RunRequest::new(dir.path(), 3);

    let backend = RecordingBackend::with_screen(1920, 1080).pointer_after(12, (0, 0));
    let dispatcher = Dispatcher::new(backend, CancelToken::new())
        .with_failsafe(FailsafeGuard::new(1920, 1080));
    let mut runner = Runner::new(dispatcher, layout());
    let mut sink = TraceSink::default();
    let result = runner.run(&request, &mut sink);

    assert!(!result.completed);
    assert_eq!(result.abort_reason, AbortReason::Failsafe);
    assert!(result.is_operator_abort());
    assert!(result.results.is_empty());
    assert_eq!(runner.state(), RunState::Aborted(AbortReason::Failsafe));

    let recorded = runner.into_dispatcher().into_backend().into_recorded();
    assert_eq!(recorded.len(), 12);
    assert_eq!(
        sink.events.last().map(String::as_str),
        Some("finished Failsafe")
    );
}

#[test]
fn test_interrupt_keeps_completed_scenarios() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let request = RunRequest::new(dir.path(), 3);
    let token = CancelToken::new();

    let mut runner = runner(RecordingBackend::new(), token.clone());
    let mut sink = CancelAfter {
        token: token.clone(),
        scenario: 1,
    };
    let result = runner.run(&request, &mut sink);

    assert_eq!(result.abort_reason, AbortReason::UserInterrupt);
    assert_eq!(result.completed_count(), 1);
    assert!(!token.is_armed());

    let first_only = expected_actions(&RunRequest::new(dir.path(), 1));
    let recorded = runner.into_dispatcher().into_backend().into_recorded();
    assert_eq!(recorded, first_only);
}

#[test]
fn test_injection_failure_is_reported_not_raised() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let request = RunRequest::new(dir.path(), 2);

    let backend = RecordingBackend::new().fail_after(3, "display connection lost");
    let mut runner = runner(backend, CancelToken::new());
    let result = runner.run(&request, &mut synchro_autopilot::NullSink);

    assert!(!result.completed);
    assert_eq!(result.abort_reason, AbortReason::AutomationError);
    assert!(!result.is_operator_abort());
    let error = result.error.expect("error message should be kept");
    assert!(error.contains("display connection lost"), "{}", error);
}

#[test]
fn test_progress_is_monotonic_per_scenario() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let request = RunRequest::new(dir.path(), 1).speed(SpeedMode::HighSpeed);

    let mut runner = runner(RecordingBackend::new(), CancelToken::new());
    let mut sink = TraceSink::default();
    runner.run(&request, &mut sink);

    assert!(!sink.progress.is_empty());
    assert!(sink.progress.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(sink.progress.last().copied(), Some(1.0));
}

#[test]
fn test_runner_refuses_second_run() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let request = RunRequest::new(dir.path(), 1);

    let mut runner = runner(RecordingBackend::new(), CancelToken::new());
    assert!(runner.run(&request, &mut synchro_autopilot::NullSink).completed);

    let second = runner.run(&request, &mut synchro_autopilot::NullSink);
    assert!(!second.completed);
    assert_eq!(second.abort_reason, AbortReason::AutomationError);
    assert!(second.results.is_empty());
}

#[test]
fn test_run_result_serializes_for_json_output() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let request = RunRequest::new(dir.path(), 2);

    let mut runner = runner(RecordingBackend::new(), CancelToken::new());
    let result = runner.run(&request, &mut synchro_autopilot::NullSink);

    let json = serde_json::to_value(&result).expect("Failed to serialize result");
    assert_eq!(json["completed"], true);
    assert_eq!(json["abort_reason"], "none");
    assert_eq!(json["results"].as_array().map(Vec::len), Some(2));
}
