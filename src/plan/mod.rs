pub mod builder;
pub mod types;

pub use builder::PlanBuilder;
pub use types::{
    ActionStep, ExportFormat, Key, Modifier, PlannedStep, ScenarioPlan, ScreenLayout, Stage,
};
