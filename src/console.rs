//! Console presentation: banner, status lines, progress bar and result boxes.
//!
//! Formatting is done by free functions that hold no state; `ConsoleReporter`
//! is the progress sink that writes their output as a run advances.

use chrono::Local;
use crossterm::style::Stylize;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use crate::runner::{AbortReason, ProgressSink, RunEvent, RunResult};

/// Width of the progress bar in cells
pub const PROGRESS_WIDTH: usize = 50;

/// Characters of an error message shown inside an abort box
pub const ERROR_PREVIEW_CHARS: usize = 45;

/// Inner width of result boxes
const BOX_WIDTH: usize = 58;

/// Severity of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    fn icon(&self) -> &'static str {
        match self {
            Level::Info => "▶",
            Level::Success => "✓",
            Level::Warning => "⚠",
            Level::Error => "✗",
        }
    }
}

/// First `max` characters of `text`
pub fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Unstyled progress bar: `[███░░░] 50%`
pub fn progress_bar(done: usize, total: usize, width: usize) -> String {
    let total = total.max(1);
    let done = done.min(total);
    let filled = done * width / total;
    let percent = done * 100 / total;
    format!(
        "[{}{}] {}%",
        "█".repeat(filled),
        "░".repeat(width - filled),
        percent
    )
}

/// Timestamped status line for one stage of a scenario
pub fn status_line(stage: usize, message: &str, level: Level) -> String {
    let timestamp = Local::now().format("%H:%M:%S%.3f").to_string();
    let head = format!("{} Step {}:", level.icon(), stage);
    let head = match level {
        Level::Info => head.blue(),
        Level::Success => head.green(),
        Level::Warning => head.yellow(),
        Level::Error => head.red(),
    };
    format!("{} {} {}", format!("[{}]", timestamp).bold(), head, message)
}

/// Lines of a framed message box
pub fn boxed(title: &str, lines: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len() + 3);
    out.push(format!("╔{}╗", "═".repeat(BOX_WIDTH)));
    let title = truncate(title, BOX_WIDTH - 2);
    out.push(format!("║  {:<width$}║", title, width = BOX_WIDTH - 2));
    for line in lines {
        let line = truncate(line, BOX_WIDTH - 4);
        out.push(format!("║    {:<width$}║", line, width = BOX_WIDTH - 4));
    }
    out.push(format!("╚{}╝", "═".repeat(BOX_WIDTH)));
    out
}

pub fn banner() -> String {
    let rule = "═".repeat(BOX_WIDTH);
    let lines = [
        format!("╔{}╗", rule),
        format!("║{:^width$}║", "S Y N C H R O   A U T O P I L O T", width = BOX_WIDTH),
        format!("║{:^width$}║", "Automated Report Printer", width = BOX_WIDTH),
        format!("╚{}╝", rule),
    ];
    lines.join("\n").cyan().bold().to_string()
}

/// Box summarizing a finished run
pub fn summary_box(result: &RunResult, output: &str) -> Vec<String> {
    match result.abort_reason {
        AbortReason::None => boxed(
            "AUTOMATION COMPLETED SUCCESSFULLY",
            &[
                format!(
                    "Generated {} report(s) in {:.1} seconds",
                    result.completed_count(),
                    result.total_elapsed.as_secs_f64()
                ),
                format!("Output: {}", truncate(output, 35)),
            ],
        ),
        AbortReason::Failsafe => boxed(
            "⚠ AUTOMATION STOPPED BY FAILSAFE",
            &[format!("{} scenario(s) completed before the stop", result.completed_count())],
        ),
        AbortReason::UserInterrupt => boxed(
            "⚠ AUTOMATION CANCELLED BY USER",
            &[
                "User stopped process (Ctrl+C)".to_string(),
                format!("{} scenario(s) completed before the stop", result.completed_count()),
            ],
        ),
        AbortReason::AutomationError => boxed(
            "✗ AUTOMATION ERROR",
            &[format!(
                "Error: {}",
                truncate(result.error.as_deref().unwrap_or("unknown"), ERROR_PREVIEW_CHARS)
            )],
        ),
    }
}

/// Print a run summary box in the color matching its outcome
pub fn print_summary(result: &RunResult, output: &str) {
    let text = summary_box(result, output).join("\n");
    let styled = match result.abort_reason {
        AbortReason::None => text.green(),
        AbortReason::Failsafe | AbortReason::UserInterrupt => text.yellow(),
        AbortReason::AutomationError => text.red(),
    };
    println!("\n{}", styled);
}

/// Print a red box for a cancelled or rejected run
pub fn print_failure_box(title: &str, detail: &str) {
    let text = boxed(title, &[detail.to_string()]).join("\n");
    println!("\n{}", text.red());
}

pub fn print_notice(message: &str, level: Level) {
    let text = format!("{} {}", level.icon(), message);
    let styled = match level {
        Level::Info => text.blue(),
        Level::Success => text.green(),
        Level::Warning => text.yellow(),
        Level::Error => text.red(),
    };
    println!("{}", styled);
}

/// Count down on one line, one second per tick
pub fn countdown(seconds: u64, message: &str) {
    let mut out = io::stdout();
    for remaining in (1..=seconds).rev() {
        let _ = write!(out, "\r{}", format!("{} in {} seconds...", message, remaining).yellow());
        let _ = out.flush();
        thread::sleep(Duration::from_secs(1));
    }
    if seconds > 0 {
        let _ = writeln!(out, "\r{}{}", format!("{} now!", message).green(), " ".repeat(30));
    }
}

/// Progress sink writing scenario headers, stage lines and a live bar
pub struct ConsoleReporter<W: Write> {
    out: W,
    stage: usize,
    bar_open: bool,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            stage: 0,
            bar_open: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn close_bar(&mut self) -> io::Result<()> {
        if self.bar_open {
            writeln!(self.out)?;
            self.bar_open = false;
        }
        Ok(())
    }

    fn write_event(&mut self, event: &RunEvent<'_>) -> io::Result<()> {
        match event {
            RunEvent::ScenarioStarted { index, total, .. } => {
                self.close_bar()?;
                self.stage = 0;
                let header = format!("┌─ Processing Scenario {}/{} ─┐", index, total);
                writeln!(self.out, "\n{}", header.magenta().bold())?;
            }
            RunEvent::StageStarted { label, .. } => {
                self.close_bar()?;
                self.stage += 1;
                writeln!(self.out, "{}", status_line(self.stage, label, Level::Info))?;
            }
            RunEvent::StepCompleted { done, total, .. } => {
                let bar = format!("Progress: {}", progress_bar(*done, *total, PROGRESS_WIDTH));
                write!(self.out, "\r{}", bar.cyan())?;
                self.out.flush()?;
                self.bar_open = true;
            }
            RunEvent::ScenarioCompleted { result, .. } => {
                self.close_bar()?;
                let footer = format!(
                    "└─ Scenario {} completed in {:.2}s ─┘",
                    result.index,
                    result.elapsed.as_secs_f64()
                );
                writeln!(self.out, "{}", footer.green())?;
            }
            RunEvent::RunFinished(_) => self.close_bar()?,
            RunEvent::StepStarted { .. } => {}
        }
        Ok(())
    }
}

impl<W: Write> ProgressSink for ConsoleReporter<W> {
    fn on_event(&mut self, event: &RunEvent<'_>) {
        // A broken terminal must not stop the run
        let _ = self.write_event(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ScenarioResult;

    fn aborted(reason: AbortReason, error: Option<&str>) -> RunResult {
        RunResult {
            completed: reason == AbortReason::None,
            results: vec![ScenarioResult {
                index: 1,
                elapsed: Duration::from_millis(2500),
            }],
            abort_reason: reason,
            error: error.map(str::to_string),
            total_elapsed: Duration::from_millis(4200),
        }
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0, 4, 4), "[░░░░] 0%");
        assert_eq!(progress_bar(2, 4, 4), "[██░░] 50%");
        assert_eq!(progress_bar(4, 4, 4), "[████] 100%");
        assert_eq!(progress_bar(9, 4, 4), "[████] 100%");
        assert_eq!(progress_bar(0, 0, 2), "[░░] 0%");
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("äöü", 2), "äö");
        assert_eq!(truncate("ab", 10), "ab");
    }

    #[test]
    fn boxes_have_uniform_width() {
        let lines = boxed("TITLE", &["short".to_string(), "x".repeat(200)]);
        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == BOX_WIDTH + 2), "{:?}", widths);
    }

    #[test]
    fn error_box_truncates_message() {
        let long = "e".repeat(120);
        let lines = summary_box(&aborted(AbortReason::AutomationError, Some(&long)), "C:\\out");
        let error_line = lines.iter().find(|l| l.contains("Error:")).unwrap();
        assert!(error_line.contains(&"e".repeat(ERROR_PREVIEW_CHARS)));
        assert!(!error_line.contains(&"e".repeat(ERROR_PREVIEW_CHARS + 1)));
    }

    #[test]
    fn success_box_reports_count_and_time() {
        let lines = summary_box(&aborted(AbortReason::None, None), "C:\\out");
        assert!(lines.iter().any(|l| l.contains("Generated 1 report(s) in 4.2 seconds")));
        assert!(lines.iter().any(|l| l.contains("Output: C:\\out")));
    }

    #[test]
    fn reporter_writes_headers_stages_and_footers() {
        let mut reporter = ConsoleReporter::new(Vec::new());
        let result = ScenarioResult {
            index: 2,
            elapsed: Duration::from_millis(1234),
        };
        reporter.on_event(&RunEvent::ScenarioStarted { index: 2, total: 3, steps: 4 });
        reporter.on_event(&RunEvent::StageStarted {
            index: 2,
            stage: crate::plan::Stage::SelectScenarioList,
            label: "Selecting scenario...".to_string(),
        });
        reporter.on_event(&RunEvent::StepCompleted { index: 2, done: 4, total: 4 });
        reporter.on_event(&RunEvent::ScenarioCompleted { result: &result, total: 3 });

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(text.contains("Processing Scenario 2/3"));
        assert!(text.contains("Step 1:"));
        assert!(text.contains("Selecting scenario..."));
        assert!(text.contains("100%"));
        assert!(text.contains("Scenario 2 completed in 1.23s"));
    }
}
