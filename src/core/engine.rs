use crate::domain::model::{Activity, EquipmentPlan};
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub plan: EquipmentPlan,
    pub output_path: String,
}

pub struct PlannerEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> PlannerEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// 只取出活動清單，不計算器材
    pub async fn catalogue(&self) -> Result<Vec<Activity>> {
        tracing::info!("📥 Fetching activities...");
        let activities = self.pipeline.extract().await?;
        tracing::info!("Found {} activities", activities.len());
        Ok(activities)
    }

    pub async fn run(&self) -> Result<PlanOutcome> {
        let started = Instant::now();
        tracing::info!("🚀 Starting equipment planning");

        // Extract
        let activities = self.catalogue().await?;

        // Transform
        tracing::info!("🧮 Calculating equipment quantities...");
        let result = self.pipeline.transform(activities).await?;
        let unknown = result.plan.unrecognized_lines().count();
        tracing::info!(
            "Planned {} equipment lines for '{}' ({} with unknown unit type)",
            result.plan.lines.len(),
            result.plan.title,
            unknown
        );
        let plan = result.plan.clone();

        // Load
        tracing::info!("💾 Writing {} output file(s)...", result.outputs.len());
        let output_path = self.pipeline.load(result).await?;
        tracing::info!(
            "Output saved to: {} in {:.2?}",
            output_path,
            started.elapsed()
        );

        Ok(PlanOutcome { plan, output_path })
    }
}
