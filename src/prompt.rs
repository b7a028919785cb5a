//! Interactive prompts used when the run is not fully specified by flags.

use crossterm::style::Stylize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};
use std::path::PathBuf;

use crate::config;
use crate::console::{Level, print_notice};
use crate::plan::ExportFormat;
use crate::profile::SpeedMode;
use crate::request::{RequestSource, RunRequest, validate_output_dir, validate_scenario_count};

pub type PromptResult<T> = Result<T, dialoguer::Error>;

/// Ask for every run parameter. Returns `None` when the operator gives up on
/// choosing a usable output directory.
pub fn ask_run_request(high_speed: bool) -> PromptResult<Option<RunRequest>> {
    let theme = ColorfulTheme::default();

    println!("\n{}", "CONFIGURATION".cyan().bold());

    let Some(output_path) = ask_output_dir(&theme)? else {
        return Ok(None);
    };

    let scenario_count: u32 = Input::with_theme(&theme)
        .with_prompt("Number of scenarios to process")
        .validate_with(|count: &u32| -> Result<(), String> {
            validate_scenario_count(*count, RequestSource::Interactive).map_err(|e| e.to_string())
        })
        .interact_text()?;
    print_notice(&format!("Will process {} scenario(s)", scenario_count), Level::Success);

    let as_text = Confirm::with_theme(&theme)
        .with_prompt("Export as .txt?")
        .default(true)
        .interact()?;
    let export_format = ExportFormat::from_pdf_flag(!as_text);
    match export_format {
        ExportFormat::Pdf => print_notice("PDF export enabled", Level::Success),
        ExportFormat::Text => print_notice(".txt export", Level::Success),
    }

    let open_when_done = Confirm::with_theme(&theme)
        .with_prompt("Open output folder when complete?")
        .default(true)
        .interact()?;

    let mode = SpeedMode::from_flags(high_speed, export_format == ExportFormat::Pdf);
    Ok(Some(
        RunRequest::new(output_path, scenario_count)
            .export_format(export_format)
            .speed(mode)
            .open_when_done(open_when_done),
    ))
}

/// Keep asking until the path is an existing directory or the operator declines
fn ask_output_dir(theme: &ColorfulTheme) -> PromptResult<Option<PathBuf>> {
    let mut default = config::default_output_dir();
    loop {
        let entered: String = Input::with_theme(theme)
            .with_prompt("Output directory")
            .default(default.clone())
            .interact_text()?;
        let path = PathBuf::from(entered.trim());

        match validate_output_dir(&path) {
            Ok(()) => {
                print_notice("Valid path confirmed", Level::Success);
                return Ok(Some(path));
            }
            Err(err) => {
                print_notice(&err.to_string(), Level::Warning);
                let retry = Confirm::with_theme(theme)
                    .with_prompt("Enter a different path?")
                    .default(true)
                    .interact()?;
                if !retry {
                    return Ok(None);
                }
                default = entered;
            }
        }
    }
}

/// Block until the operator presses ENTER
pub fn confirm_start() -> PromptResult<()> {
    let _: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Press ENTER to begin or Ctrl+C to cancel")
        .allow_empty(true)
        .interact_text()?;
    Ok(())
}
