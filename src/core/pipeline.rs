use crate::core::planner::{ensure_units_recognized, plan_activity, select_activity};
use crate::domain::model::{Activity, EquipmentPlan, PlanResult, RenderedOutput};
use crate::domain::ports::{ActivitySource, ConfigProvider, Pipeline, Storage};
use crate::utils::error::{PlannerError, Result};

pub struct PlannerPipeline<A: ActivitySource, S: Storage, C: ConfigProvider> {
    source: A,
    storage: S,
    config: C,
}

impl<A: ActivitySource, S: Storage, C: ConfigProvider> PlannerPipeline<A, S, C> {
    pub fn new(source: A, storage: S, config: C) -> Self {
        Self {
            source,
            storage,
            config,
        }
    }

    fn render_outputs(&self, plan: &EquipmentPlan) -> Result<Vec<RenderedOutput>> {
        let stem = format!("equipment_{}", file_safe(&plan.activity_id.to_string()));

        self.config
            .output_formats()
            .iter()
            .map(|format| {
                let contents = match format.as_str() {
                    "csv" => plan.to_csv()?,
                    "json" => plan.to_json()?,
                    other => {
                        return Err(PlannerError::InvalidConfigValueError {
                            field: "output.formats".to_string(),
                            value: other.to_string(),
                            reason: "Unsupported format".to_string(),
                        })
                    }
                };
                Ok(RenderedOutput {
                    file_name: format!("{}.{}", stem, format),
                    contents,
                })
            })
            .collect()
    }
}

fn file_safe(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait::async_trait]
impl<A: ActivitySource, S: Storage, C: ConfigProvider> Pipeline for PlannerPipeline<A, S, C> {
    async fn extract(&self) -> Result<Vec<Activity>> {
        let discipline = self.config.discipline();
        let activities = self.source.fetch_activities(&discipline).await?;
        tracing::debug!(
            "Fetched {} activities for discipline {}",
            activities.len(),
            discipline
        );
        Ok(activities)
    }

    async fn transform(&self, activities: Vec<Activity>) -> Result<PlanResult> {
        let id = self
            .config
            .activity()
            .ok_or_else(|| PlannerError::MissingConfigError {
                field: "session.activity".to_string(),
            })?;
        let activity = select_activity(&activities, id)?;

        if self.config.strict_unit_types() {
            ensure_units_recognized(activity)?;
        }

        let session = self.config.session()?;
        let plan = plan_activity(activity, &session);
        let outputs = self.render_outputs(&plan)?;

        Ok(PlanResult { plan, outputs })
    }

    async fn load(&self, result: PlanResult) -> Result<String> {
        for output in &result.outputs {
            tracing::debug!("Writing {}", output.file_name);
            self.storage
                .write_file(&output.file_name, output.contents.as_bytes())
                .await?;
        }

        Ok(self.config.output_path().to_string())
    }
}
