// Adapters layer: concrete implementations for external systems (http, files, storage)

pub mod file;
pub mod rest;
pub mod storage;

pub use file::FileActivitySource;
pub use rest::RestActivitySource;
pub use storage::LocalStorage;

use crate::domain::model::{Activity, Discipline};
use crate::domain::ports::{ActivitySource, ConfigProvider};
use crate::utils::error::{PlannerError, Result};
use async_trait::async_trait;

#[async_trait]
impl<T: ActivitySource + ?Sized> ActivitySource for Box<T> {
    async fn fetch_activities(&self, discipline: &Discipline) -> Result<Vec<Activity>> {
        (**self).fetch_activities(discipline).await
    }
}

/// 依設定選擇資料來源，API 優先
pub fn build_source<C: ConfigProvider>(config: &C) -> Result<Box<dyn ActivitySource>> {
    if let Some(url) = config.api_url() {
        tracing::debug!("Using REST activity source: {}", url);
        return Ok(Box::new(RestActivitySource::new(
            url,
            config.api_key(),
            config.timeout_seconds(),
        )?));
    }

    if let Some(path) = config.data_file() {
        tracing::debug!("Using file activity source: {}", path);
        return Ok(Box::new(FileActivitySource::new(path)));
    }

    Err(PlannerError::MissingConfigError {
        field: "source.url or source.data_file".to_string(),
    })
}
