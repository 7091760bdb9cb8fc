use crate::domain::model::{Activity, Discipline};
use crate::domain::ports::ActivitySource;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// 從本機 JSON 檔讀取活動（格式與 API 回應相同），篩選在記憶體中進行
#[derive(Debug, Clone)]
pub struct FileActivitySource {
    path: PathBuf,
}

impl FileActivitySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ActivitySource for FileActivitySource {
    async fn fetch_activities(&self, discipline: &Discipline) -> Result<Vec<Activity>> {
        tracing::debug!("Reading activities from: {}", self.path.display());
        let content = tokio::fs::read_to_string(&self.path).await?;
        let activities: Vec<Activity> = serde_json::from_str(&content)?;

        Ok(activities
            .into_iter()
            .filter(|activity| discipline.matches(activity.discipline.as_deref()))
            .collect())
    }
}
