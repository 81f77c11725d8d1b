use aws_config::{BehaviorVersion, Region};
use chrono::Local;
use clap::Parser;
use cost_monitor::app::console;
use cost_monitor::utils::error::ErrorSeverity;
use cost_monitor::utils::{logger, validation::Validate};
use cost_monitor::{
    CliConfig, CostAggregator, CostExplorerBilling, CostMonitor, CostMonitorApp, LocalStorage,
    Settings, SnsAlertSink,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting cost-monitor");
    tracing::debug!("CLI config: {:?}", config);

    // 驗證命令列參數
    if let Err(e) = config.validate() {
        tracing::error!("❌ Invalid arguments: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    // 載入設定，失敗時回退到預設值
    let mut settings = Settings::load_or_default(&config.config);
    if let Some(dir) = &config.output_dir {
        settings.output_dir = dir.clone();
    }
    if let Err(e) = settings.validate() {
        tracing::warn!("⚠️  Effective settings look invalid: {}", e);
        tracing::warn!("💡 {}", e.recovery_suggestion());
    }
    tracing::debug!("Effective settings: {:?}", settings);

    // 建立 AWS 客戶端
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &settings.aws_region {
        loader = loader.region(Region::new(region.clone()));
    }
    let sdk_config = loader.load().await;

    let billing = CostExplorerBilling::from_sdk_config(&sdk_config, settings.endpoint_url.as_deref());
    let alerts = SnsAlertSink::from_sdk_config(&sdk_config, settings.sns_topic_arn.clone());
    let storage = LocalStorage::new(settings.output_dir.clone());

    let aggregator = CostAggregator::new(billing, settings.currency.clone())
        .with_query_timeout(settings.query_timeout());
    let app = CostMonitorApp::new(CostMonitor::new(aggregator), settings, storage, alerts);

    let mode = config.mode();
    println!("{}", console::mode_banner(mode));

    match app.run(mode, Local::now()).await {
        Ok(outcome) => {
            print!("{}", console::render(&outcome, app.settings()));
        }
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );

            eprintln!("❌ Error during execution: {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
