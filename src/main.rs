use clap::Parser;
use crossterm::style::Stylize;
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use synchro_autopilot::console::{
    self, ConsoleReporter, Level, banner, countdown, print_failure_box, print_notice, print_summary,
};
use synchro_autopilot::input::{
    DesktopBackend, DispatchResult, Dispatcher, InputBackend, RecordingBackend,
};
use synchro_autopilot::{
    AbortReason, CancelToken, ExportFormat, NullSink, ProgressSink, RequestSource, RunEvent,
    RunRequest, RunResult, Runner, ScreenLayout, SpeedMode, Stage, config,
    install_interrupt_handler, output, prompt,
};

/// Run finished, aborted (reported) or cancelled by the operator
const EXIT_OK: i32 = 0;
/// Unusable configuration; the run never started
const EXIT_INVALID_INPUT: i32 = 1;

/// Synchro Autopilot - Automated Synchro report generator
#[derive(Parser, Debug)]
#[command(
    name = "synchro-autopilot",
    about = "Batch-generate Synchro reports by driving the application with synthetic input",
    after_help = "EXAMPLES:\n\
        synchro-autopilot                                  Interactive mode\n\
        synchro-autopilot --path ./reports --count 5       Direct execution\n\
        synchro-autopilot -p ./reports -c 5 --open         Open folder when done\n\
        synchro-autopilot -p ./reports -c 5 --pdf          Export as .pdf\n\n\
        SAFETY:\n\
        Move the mouse into any corner of the main display to stop immediately.\n\
        Press Ctrl+C to stop after the current action.\n\n\
        ENVIRONMENT VARIABLES:\n\
        SYNCHRO_AUTOPILOT_OUTPUT_DIR      Default output directory for the prompt\n\
        SYNCHRO_AUTOPILOT_SPEED           Default speed mode (normal, fast, pdf)\n\
        SYNCHRO_AUTOPILOT_COUNTDOWN       Countdown before the run (seconds)\n\
        SYNCHRO_AUTOPILOT_FAILSAFE        Corner failsafe (default: true)\n\
        SYNCHRO_AUTOPILOT_SCENARIO_LIST   Scenario list position x,y\n\
        SYNCHRO_AUTOPILOT_APP_FOCUS       Application focus position x,y\n\
        SYNCHRO_AUTOPILOT_ROW_BASE_Y      Screen y of the second scenario row\n\
        SYNCHRO_AUTOPILOT_ROW_HEIGHT      Scenario row height"
)]
struct Args {
    /// Folder the reports are saved to
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Number of scenarios to process
    #[arg(short, long)]
    count: Option<u32>,

    /// Open the output folder when complete
    #[arg(short, long)]
    open: bool,

    /// Enable high-speed mode
    #[arg(short, long)]
    speed: bool,

    /// Export as .pdf instead of .txt (much longer processing time)
    #[arg(long)]
    pdf: bool,

    /// Skip banner display
    #[arg(long)]
    no_banner: bool,

    /// Output the run result as JSON
    #[arg(long)]
    json: bool,

    /// Print the planned actions and simulate the run without touching the desktop
    #[arg(long)]
    dry_run: bool,

    /// Start without waiting for ENTER
    #[arg(short, long)]
    yes: bool,

    /// Seconds to count down before the first action [env: SYNCHRO_AUTOPILOT_COUNTDOWN]
    #[arg(long)]
    countdown: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    let args = Args::parse();

    let cancel = CancelToken::new();
    install_interrupt_handler(cancel.clone(), || {
        let _ = crossterm::execute!(std::io::stdout(), crossterm::cursor::Show);
        print_failure_box("✗ AUTOMATION CANCELLED", "User aborted process");
        std::process::exit(EXIT_OK);
    })?;

    let base_mode = SpeedMode::parse(&config::default_speed());
    let high_speed = args.speed || base_mode == SpeedMode::HighSpeed;
    let pdf = args.pdf || base_mode == SpeedMode::PdfExport;

    if !args.no_banner && !args.json {
        println!("{}", banner());
    }
    if high_speed && !args.json {
        print_notice("HIGH SPEED MODE ENABLED", Level::Warning);
    }

    let request = match (&args.path, args.count) {
        (Some(path), Some(count)) => {
            let request = RunRequest::new(path, count)
                .export_format(ExportFormat::from_pdf_flag(pdf))
                .speed(SpeedMode::from_flags(high_speed, pdf))
                .open_when_done(args.open);
            if let Err(err) = request.validate(RequestSource::Flags) {
                print_failure_box("✗ INVALID CONFIGURATION", &err.to_string());
                std::process::exit(EXIT_INVALID_INPUT);
            }
            if !args.json {
                print_accepted(&request);
            }
            request
        }
        _ => match prompt::ask_run_request(high_speed) {
            Ok(Some(request)) => request,
            Ok(None) => {
                print_failure_box("✗ OPERATION CANCELLED", "Invalid path specified");
                std::process::exit(EXIT_INVALID_INPUT);
            }
            Err(err) => {
                tracing::debug!("prompt aborted: {}", err);
                print_failure_box("✗ AUTOMATION CANCELLED", "User aborted process");
                std::process::exit(EXIT_OK);
            }
        },
    };

    if args.dry_run {
        let result = dry_run(&request, cancel, args.json);
        return finish(&request, &result, args.json);
    }

    if !args.yes {
        println!("\n{}", "Ready to start automation.".bold());
        print_notice(
            "Ensure the Synchro application is visible and accessible.",
            Level::Warning,
        );
        if let Err(err) = prompt::confirm_start() {
            tracing::debug!("start prompt aborted: {}", err);
            print_failure_box("✗ AUTOMATION CANCELLED", "User aborted process");
            std::process::exit(EXIT_OK);
        }
    }
    let seconds = args.countdown.unwrap_or_else(config::countdown_secs);
    if seconds > 0 {
        countdown(seconds, "Starting");
    }

    let result = match desktop_dispatcher(cancel) {
        Ok(dispatcher) => {
            if !args.json {
                if dispatcher.failsafe().is_some() {
                    print_notice(
                        "Failsafe enabled - move mouse to a corner to emergency stop",
                        Level::Warning,
                    );
                }
                print_notice("Starting automation process...", Level::Success);
            }
            execute(dispatcher, &request, args.json)
        }
        Err(err) => RunResult {
            completed: false,
            results: Vec::new(),
            abort_reason: AbortReason::from(&err),
            error: Some(err.to_string()),
            total_elapsed: std::time::Duration::ZERO,
        },
    };

    finish(&request, &result, args.json)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn desktop_dispatcher(cancel: CancelToken) -> DispatchResult<Dispatcher<DesktopBackend>> {
    let dispatcher = Dispatcher::new(DesktopBackend::new()?, cancel);
    if config::failsafe_enabled() {
        dispatcher.enable_failsafe()
    } else {
        Ok(dispatcher)
    }
}

fn execute<B: InputBackend>(
    dispatcher: Dispatcher<B>,
    request: &RunRequest,
    json: bool,
) -> RunResult {
    let mut runner = Runner::new(dispatcher, ScreenLayout::default());
    if json {
        runner.run(request, &mut NullSink)
    } else {
        runner.run(request, &mut ConsoleReporter::stdout())
    }
}

/// Replay the run against a recorder that keeps no log, printing each
/// primitive as it is dispatched
fn dry_run(request: &RunRequest, cancel: CancelToken, json: bool) -> RunResult {
    let dispatcher = Dispatcher::new(RecordingBackend::new().discard_log(), cancel);
    let mut runner = Runner::new(dispatcher, ScreenLayout::default());
    runner.run(request, &mut PlanPrinter { json, stage: None })
}

/// Prints plans scenario by scenario: grouped text on stdout, or one JSON
/// object per primitive on stderr
struct PlanPrinter {
    json: bool,
    stage: Option<Stage>,
}

impl ProgressSink for PlanPrinter {
    fn on_event(&mut self, event: &RunEvent<'_>) {
        match event {
            RunEvent::ScenarioStarted { index, total, steps } if !self.json => {
                self.stage = None;
                let header = format!("Scenario {}/{} ({} actions)", index, total, steps);
                println!("\n{}", header.bold());
            }
            RunEvent::StageStarted { stage, label, .. } => {
                self.stage = Some(*stage);
                if !self.json {
                    println!("  {}", label.as_str().cyan());
                }
            }
            RunEvent::StepStarted { index, action, .. } => {
                if self.json {
                    let line = serde_json::json!({
                        "scenario": index,
                        "stage": self.stage,
                        "step": action,
                    });
                    eprintln!("{}", line);
                } else {
                    println!("    {}", action);
                }
            }
            _ => {}
        }
    }
}

fn print_accepted(request: &RunRequest) {
    print_notice("Command-line configuration accepted", Level::Success);
    println!("  Path: {}", request.output_path.display().to_string().cyan());
    println!("  Scenarios: {}", request.scenario_count.to_string().cyan());
    println!("  Format: {}", request.export_format.extension().cyan());
    let open = if request.open_when_done { "Yes" } else { "No" };
    println!("  Open folder: {}", open.cyan());
    println!("  Mode: {}", request.profile.mode.label().cyan());
}

fn finish(request: &RunRequest, result: &RunResult, json: bool) -> Result<(), Box<dyn Error>> {
    let output_dir = request.output_path.display().to_string();
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print_summary(result, &output_dir);
    }

    if result.completed && request.open_when_done {
        if !json {
            print_notice("Opening output folder...", Level::Info);
        }
        match output::reveal(&request.output_path) {
            Ok(()) if !json => print_notice("Folder opened successfully", Level::Success),
            Ok(()) => {}
            Err(err) => {
                let detail = console::truncate(&err.to_string(), 80);
                eprintln!("{}", format!("⚠ Failed to open folder: {}", detail).yellow());
            }
        }
    }

    Ok(())
}
