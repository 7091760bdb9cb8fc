use crate::config::toml_config::TomlConfig;
use crate::config::PlannerConfig;
use crate::domain::model::Discipline;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "stem-planner")]
#[command(about = "Work out the equipment needed for a STEM activity session")]
pub struct CliConfig {
    /// Base URL of the activity database (PostgREST / Supabase)
    #[arg(long, env = "STEM_PLANNER_API_URL")]
    pub api_url: Option<String>,

    /// API key sent as `apikey` and bearer token
    #[arg(long, env = "STEM_PLANNER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Read activities from a local JSON file instead of the API
    #[arg(long)]
    pub data_file: Option<String>,

    /// Discipline filter (All, Biology, Chemistry, Physics, Engineering)
    #[arg(long)]
    pub discipline: Option<String>,

    /// Number of pupils in the session
    #[arg(long)]
    pub pupils: Option<u32>,

    /// Pupils per group
    #[arg(long)]
    pub group_size: Option<u32>,

    /// Activity id to plan; lists the activities when omitted
    #[arg(long)]
    pub activity: Option<String>,

    #[arg(long)]
    pub output_path: Option<String>,

    /// Output formats: csv, json
    #[arg(long = "format", value_delimiter = ',')]
    pub formats: Vec<String>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Fail on unknown unit types instead of using the minimum quantity
    #[arg(long)]
    pub strict: bool,

    /// TOML config file; command line flags take precedence
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl CliConfig {
    /// 讀取 TOML（若有指定），再以命令列參數覆蓋
    pub fn resolve(&self) -> Result<PlannerConfig> {
        let base = match &self.config {
            Some(path) => {
                tracing::debug!("Loading configuration from: {}", path);
                TomlConfig::from_file(path)?.to_planner_config()
            }
            None => PlannerConfig::default(),
        };

        Ok(self.apply_overrides(base))
    }

    pub fn apply_overrides(&self, mut config: PlannerConfig) -> PlannerConfig {
        if let Some(url) = &self.api_url {
            config.api_url = Some(url.clone());
            config.data_file = None;
        }
        if let Some(key) = &self.api_key {
            config.api_key = Some(key.clone());
        }
        if let Some(path) = &self.data_file {
            config.data_file = Some(path.clone());
            config.api_url = None;
        }
        if let Some(discipline) = &self.discipline {
            config.discipline = Discipline::parse(discipline);
        }
        if let Some(pupils) = self.pupils {
            config.pupils = pupils;
        }
        if let Some(group_size) = self.group_size {
            config.group_size = group_size;
        }
        if let Some(activity) = &self.activity {
            config.activity = Some(activity.clone());
        }
        if let Some(path) = &self.output_path {
            config.output_path = path.clone();
        }
        if !self.formats.is_empty() {
            config.output_formats = self
                .formats
                .iter()
                .map(|f| f.trim().to_lowercase())
                .collect();
        }
        if let Some(timeout) = self.timeout_seconds {
            config.timeout_seconds = timeout;
        }
        if self.strict {
            config.strict_unit_types = true;
        }
        config
    }
}
