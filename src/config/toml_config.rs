use crate::config::PlannerConfig;
use crate::domain::model::Discipline;
use crate::utils::error::{PlannerError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub planner: PlannerSection,
    #[serde(default)]
    pub source: SourceSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerSection {
    pub name: Option<String>,
    pub strict_unit_types: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSection {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub data_file: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSection {
    pub pupils: Option<u32>,
    pub group_size: Option<u32>,
    pub discipline: Option<String>,
    pub activity: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSection {
    pub path: Option<String>,
    pub formats: Option<Vec<String>>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PlannerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${STEM_PLANNER_API_KEY})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PlannerError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 套用到預設設定上，未指定的欄位沿用預設值
    pub fn to_planner_config(&self) -> PlannerConfig {
        let defaults = PlannerConfig::default();

        PlannerConfig {
            name: self.planner.name.clone().filter(|name| !name.trim().is_empty()),
            api_url: self.source.url.clone(),
            api_key: self.source.api_key.clone().filter(|key| !is_unresolved(key)),
            data_file: self.source.data_file.clone(),
            discipline: self
                .session
                .discipline
                .as_deref()
                .map(Discipline::parse)
                .unwrap_or_default(),
            activity: self.session.activity.clone(),
            pupils: self.session.pupils.unwrap_or(defaults.pupils),
            group_size: self.session.group_size.unwrap_or(defaults.group_size),
            output_path: self.output.path.clone().unwrap_or(defaults.output_path),
            output_formats: self
                .output
                .formats
                .clone()
                .unwrap_or(defaults.output_formats),
            timeout_seconds: self.source.timeout_seconds.unwrap_or(defaults.timeout_seconds),
            strict_unit_types: self.planner.strict_unit_types.unwrap_or(false),
        }
    }
}

// 環境變數不存在時留下的 ${VAR} 不應當成金鑰送出
fn is_unresolved(value: &str) -> bool {
    value.starts_with("${") && value.ends_with('}')
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.to_planner_config().validate()
    }
}
