pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::adapters::{build_source, FileActivitySource, LocalStorage, RestActivitySource};
pub use crate::config::{toml_config::TomlConfig, PlannerConfig};
pub use crate::core::calculator::required_quantity;
pub use crate::core::engine::{PlanOutcome, PlannerEngine};
pub use crate::core::pipeline::PlannerPipeline;
pub use crate::core::planner::{plan_activity, select_activity};
pub use crate::core::render::render_catalogue;
pub use crate::domain::model::{
    Activity, ActivityId, Discipline, EquipmentItem, EquipmentLine, EquipmentPlan,
    EquipmentRequirement, PlannedLine, SessionParameters, UnitType,
};
pub use crate::utils::error::{PlannerError, Result};
