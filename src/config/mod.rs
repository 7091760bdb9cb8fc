#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::model::{Discipline, SessionParameters};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};

pub const DEFAULT_PUPILS: u32 = 30;
pub const DEFAULT_GROUP_SIZE: u32 = 4;
pub const DEFAULT_OUTPUT_PATH: &str = "./output";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// 合併 CLI 與 TOML 後的最終設定
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// 設定檔中的計畫名稱，只用於日誌
    pub name: Option<String>,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub data_file: Option<String>,
    pub discipline: Discipline,
    pub activity: Option<String>,
    pub pupils: u32,
    pub group_size: u32,
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub timeout_seconds: u64,
    pub strict_unit_types: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            name: None,
            api_url: None,
            api_key: None,
            data_file: None,
            discipline: Discipline::All,
            activity: None,
            pupils: DEFAULT_PUPILS,
            group_size: DEFAULT_GROUP_SIZE,
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            output_formats: vec!["csv".to_string()],
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            strict_unit_types: false,
        }
    }
}

impl ConfigProvider for PlannerConfig {
    fn api_url(&self) -> Option<&str> {
        self.api_url.as_deref()
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn data_file(&self) -> Option<&str> {
        self.data_file.as_deref()
    }

    fn discipline(&self) -> Discipline {
        self.discipline.clone()
    }

    fn activity(&self) -> Option<&str> {
        self.activity.as_deref()
    }

    fn session(&self) -> Result<SessionParameters> {
        SessionParameters::new(self.pupils, self.group_size)
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn strict_unit_types(&self) -> bool {
        self.strict_unit_types
    }
}

impl Validate for PlannerConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_data_source(self.api_url.as_deref(), self.data_file.as_deref())?;
        validation::validate_positive_number("session.pupils", self.pupils, 1)?;
        validation::validate_positive_number("session.group_size", self.group_size, 1)?;
        validation::validate_path("output.path", &self.output_path)?;
        validation::validate_output_formats("output.formats", &self.output_formats)?;
        validation::validate_range("source.timeout_seconds", self.timeout_seconds, 1, 300)?;
        Ok(())
    }
}
