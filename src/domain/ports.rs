use crate::domain::model::{Activity, Discipline, PlanResult, SessionParameters};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 活動資料來源（資料庫 API 或本機 JSON）
#[async_trait]
pub trait ActivitySource: Send + Sync {
    async fn fetch_activities(&self, discipline: &Discipline) -> Result<Vec<Activity>>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_url(&self) -> Option<&str>;
    fn api_key(&self) -> Option<&str>;
    fn data_file(&self) -> Option<&str>;
    fn discipline(&self) -> Discipline;
    fn activity(&self) -> Option<&str>;
    fn session(&self) -> Result<SessionParameters>;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn timeout_seconds(&self) -> u64;
    fn strict_unit_types(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Activity>>;
    async fn transform(&self, activities: Vec<Activity>) -> Result<PlanResult>;
    async fn load(&self, result: PlanResult) -> Result<String>;
}
