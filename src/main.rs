use clap::Parser;
use stem_planner::core::ConfigProvider;
use stem_planner::utils::error::ErrorSeverity;
use stem_planner::utils::{logger, validation::Validate};
use stem_planner::{
    build_source, render_catalogue, CliConfig, LocalStorage, PlannerEngine, PlannerError,
    PlannerPipeline,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting stem-planner");

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    if let Some(name) = &config.name {
        tracing::info!("📦 Planner: {}", name);
    }
    tracing::debug!("Resolved config: {:?}", redacted(&config));

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    let source = match build_source(&config) {
        Ok(source) => source,
        Err(e) => fail(&e),
    };
    let storage = LocalStorage::new(config.output_path());
    let listing_only = config.activity().is_none();
    let session_label = format!(
        "{} pupils, groups of {}",
        config.pupils, config.group_size
    );

    let engine = PlannerEngine::new(PlannerPipeline::new(source, storage, config));

    if listing_only {
        match engine.catalogue().await {
            Ok(activities) => {
                print!("{}", render_catalogue(&activities));
                println!("\n💡 Pick one with --activity <ID> ({})", session_label);
            }
            Err(e) => fail(&e),
        }
        return Ok(());
    }

    match engine.run().await {
        Ok(outcome) => {
            print!("{}", outcome.plan.render_table());
            tracing::info!("✅ Equipment plan completed");
            println!("\n📁 Output saved to: {}", outcome.output_path);
        }
        Err(e) => fail(&e),
    }

    Ok(())
}

fn redacted(config: &stem_planner::PlannerConfig) -> stem_planner::PlannerConfig {
    let mut shown = config.clone();
    if shown.api_key.is_some() {
        shown.api_key = Some("***".to_string());
    }
    shown
}

fn fail(e: &PlannerError) -> ! {
    tracing::error!(
        "❌ Planning failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
