use std::path::{Path, PathBuf};

use super::types::{
    ActionStep, ExportFormat, Key, Modifier, PlannedStep, ScenarioPlan, ScreenLayout, Stage,
};
use crate::profile::SpeedProfile;

/// F6 presses needed to cycle the save dialog's focus onto the file list
const FILE_LIST_FOCUS_PRESSES: usize = 3;

/// Builds the primitive sequence for each scenario of a run.
///
/// The profile, layout and destination are fixed for the whole run, so a
/// plan is a pure function of `(index, total, format)`.
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    profile: SpeedProfile,
    layout: ScreenLayout,
    output_path: PathBuf,
}

impl PlanBuilder {
    pub fn new(
        profile: SpeedProfile,
        layout: ScreenLayout,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            profile,
            layout,
            output_path: output_path.into(),
        }
    }

    pub fn profile(&self) -> &SpeedProfile {
        &self.profile
    }

    pub fn layout(&self) -> &ScreenLayout {
        &self.layout
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Produce the plan for scenario `index` of `total`
    pub fn plan(&self, index: u32, total: u32, format: ExportFormat) -> ScenarioPlan {
        let p = &self.profile;
        let mut steps = StepList::default();

        if index > 1 {
            let (list_x, list_y) = self.layout.scenario_list;
            steps.click(Stage::SelectScenarioList, list_x, list_y, p);
            steps.click(Stage::SelectScenarioRow, list_x, self.layout.row_y(index), p);
        }

        let (focus_x, focus_y) = self.layout.app_focus;
        steps.click(Stage::FocusApplication, focus_x, focus_y, p);
        steps.hotkey(Stage::OpenReportMenu, Modifier::Ctrl, Key::Char('r'), p);
        steps.burst(Stage::NavigateToExport, Key::Tab, p.nav_key_count);
        steps.press(Stage::OpenExportDialog, Key::Enter);
        steps.wait(Stage::OpenExportDialog, p.export_dialog_wait());

        if index <= 1 {
            // The first report sets the dialog's working directory; later
            // dialogs reopen there.
            steps.hotkey(Stage::SetOutputDirectory, Modifier::Ctrl, Key::Char('l'), p);
            steps.push(
                Stage::SetOutputDirectory,
                ActionStep::Type {
                    text: self.output_path.to_string_lossy().into_owned(),
                },
            );
            steps.press(Stage::SetOutputDirectory, Key::Enter);
            steps.wait(Stage::SetOutputDirectory, p.path_wait);
            steps.burst(Stage::FocusFileList, Key::F6, FILE_LIST_FOCUS_PRESSES);
            steps.press(Stage::FocusFileList, Key::Down);
            steps.press(Stage::FocusFileList, Key::Up);
        } else {
            steps.hotkey(Stage::SelectExistingFile, Modifier::Alt, Key::Char('d'), p);
            steps.burst(Stage::SelectExistingFile, Key::F6, FILE_LIST_FOCUS_PRESSES);
            steps.burst(Stage::SelectExistingFile, Key::Down, (index - 1) as usize);
        }

        steps.press(Stage::ConfirmExport, Key::Enter);
        steps.wait(Stage::ConfirmExport, p.confirm_pause);
        if format == ExportFormat::Pdf {
            // PDF sits one option left of the default in the format chooser
            steps.press(Stage::ConfirmExport, Key::Left);
            steps.wait(Stage::ConfirmExport, p.option_wait);
        }
        steps.press(Stage::ConfirmExport, Key::Enter);
        steps.wait(Stage::ConfirmExport, p.final_wait);

        ScenarioPlan {
            index,
            total,
            format,
            steps: steps.0,
        }
    }

    /// Plans for every scenario of a run, in execution order
    pub fn plan_all(&self, total: u32, format: ExportFormat) -> Vec<ScenarioPlan> {
        (1..=total).map(|index| self.plan(index, total, format)).collect()
    }
}

#[derive(Default)]
struct StepList(Vec<PlannedStep>);

impl StepList {
    fn push(&mut self, stage: Stage, action: ActionStep) {
        self.0.push(PlannedStep { stage, action });
    }

    fn click(&mut self, stage: Stage, x: i32, y: i32, profile: &SpeedProfile) {
        self.push(stage, ActionStep::Click { x, y });
        self.wait(stage, profile.base_pause);
    }

    fn hotkey(&mut self, stage: Stage, modifier: Modifier, key: Key, profile: &SpeedProfile) {
        self.push(stage, ActionStep::Hotkey { modifier, key });
        self.wait(stage, profile.base_pause);
    }

    fn press(&mut self, stage: Stage, key: Key) {
        self.push(stage, ActionStep::Press { key });
    }

    fn burst(&mut self, stage: Stage, key: Key, count: usize) {
        for _ in 0..count {
            self.press(stage, key);
        }
    }

    fn wait(&mut self, stage: Stage, duration: std::time::Duration) {
        self.push(stage, ActionStep::Wait { duration });
    }
}
