pub mod calculator;
pub mod engine;
pub mod pipeline;
pub mod planner;
pub mod render;

pub use crate::domain::model::{EquipmentPlan, PlanResult};
pub use crate::domain::ports::{ActivitySource, ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
