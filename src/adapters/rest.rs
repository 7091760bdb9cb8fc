use crate::domain::model::{Activity, Discipline};
use crate::domain::ports::ActivitySource;
use crate::utils::error::{PlannerError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use std::time::Duration;

pub const ACTIVITIES_PATH: &str = "rest/v1/activities";

/// 巢狀查詢：活動 -> 活動器材 -> 器材主檔
pub const ACTIVITY_SELECT: &str = concat!(
    "activity_id,activity_title,discipline,age_min,age_max,drive_files_url,",
    "\"activities equipment\"(unit_type,ratio,min_quantity,notes,",
    "\"equipment master list\"(item_title,type,unit_price))"
);

/// PostgREST 風格的託管資料庫
pub struct RestActivitySource {
    client: Client,
    endpoint: String,
}

impl RestActivitySource {
    pub fn new(base_url: &str, api_key: Option<&str>, timeout_seconds: u64) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(key) = api_key.filter(|key| !key.is_empty()) {
            headers.insert("apikey", header_value("source.api_key", key)?);
            headers.insert(
                AUTHORIZATION,
                header_value("source.api_key", &format!("Bearer {}", key))?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/{}", base_url.trim_end_matches('/'), ACTIVITIES_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn header_value(field: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| PlannerError::InvalidConfigValueError {
        field: field.to_string(),
        value: "<redacted>".to_string(),
        reason: format!("Not a valid HTTP header value: {}", e),
    })
}

#[async_trait]
impl ActivitySource for RestActivitySource {
    async fn fetch_activities(&self, discipline: &Discipline) -> Result<Vec<Activity>> {
        let mut query = vec![("select".to_string(), ACTIVITY_SELECT.to_string())];
        if let Some(name) = discipline.as_filter() {
            query.push(("discipline".to_string(), format!("eq.{}", name)));
        }

        tracing::debug!(
            "Making API request to: {} (discipline: {})",
            self.endpoint,
            discipline
        );
        let response = self.client.get(&self.endpoint).query(&query).send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlannerError::ApiStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let activities: Vec<Activity> = serde_json::from_str(&body)?;
        tracing::debug!("Decoded {} activities", activities.len());

        Ok(activities)
    }
}
