use clap::Parser;
use mailsieve::core::extractor::{decode_input, extract_addresses};
use mailsieve::core::progress::LogProgress;
use mailsieve::core::ConfigProvider;
use mailsieve::domain::settings::StrategyKind;
use mailsieve::utils::error::ValidatorError;
use mailsieve::utils::{logger, validation::Validate};
use mailsieve::{FilePipeline, LocalStorage, TomlConfig, ValidationEngine};

#[derive(Parser)]
#[command(name = "toml-validate")]
#[command(about = "Validate an email list using a TOML run configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "mailsieve.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the strategy from config
    #[arg(long)]
    strategy: Option<StrategyKind>,

    /// Dry run - count the addresses without validating them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 先載入配置才知道日誌格式
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    match config.log_format() {
        Some("json") => logger::init_json_logger(args.verbose),
        _ => logger::init_cli_logger(args.verbose),
    }

    tracing::info!("🚀 Starting TOML-based email validation");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(kind) = args.strategy {
        config.strategy.kind = kind;
        tracing::info!("🔧 Strategy overridden to: {}", kind);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No addresses will be validated");
        if let Err(e) = perform_dry_run(&config).await {
            exit_with(e);
        }
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let sink = LocalStorage::new(config.output.path.clone());
    let pipeline = match FilePipeline::new(LocalStorage::current_dir(), sink, config) {
        Ok(pipeline) => pipeline.with_progress(LogProgress),
        Err(e) => exit_with(e),
    };

    let cancel = pipeline.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("🛑 Cancellation requested, stopping after the current batch");
            cancel.cancel();
        }
    });

    let engine = ValidationEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!("✅ Validation completed successfully!");
            println!("✅ Validation completed successfully!");
            println!("📊 Valid: {}  Invalid: {}", summary.valid, summary.invalid);
            println!("📁 Output saved to: {}", summary.output_path);
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Run: {}", config.run.name);
    if let Some(description) = &config.run.description {
        println!("  Description: {}", description);
    }
    println!("  Input: {}", config.input_file());
    println!("  Output: {}", config.output_path());
    println!("  Strategy: {}", config.strategy.kind);
    println!("  Batch Size: {}", config.batch_size());
    println!("  Concurrent Requests: {}", config.concurrent_requests());

    let throttle = ConfigProvider::throttle(config);
    if throttle != Default::default() {
        println!(
            "  Throttle: {} ms per address, {} ms per batch",
            throttle.per_address.as_millis(),
            throttle.per_batch.as_millis()
        );
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(config: &TomlConfig) -> Result<(), ValidatorError> {
    use mailsieve::core::Storage;

    let bytes = LocalStorage::current_dir()
        .read_file(config.input_file())
        .await?;
    let addresses = extract_addresses(decode_input(&bytes))?;
    let batches = addresses.len().div_ceil(config.batch_size());

    println!("🔍 Dry Run Analysis:");
    println!("  📥 Addresses: {}", addresses.len());
    println!("  📦 Batches: {}", batches);
    if config.strategy.kind == StrategyKind::Remote {
        println!("  📡 Remote lookups: {}", addresses.len());
    }
    println!();
    println!("✅ Dry run completed - no results were written");
    Ok(())
}

fn exit_with(e: ValidatorError) -> ! {
    tracing::error!(
        "❌ Validation failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼，取消為 130
    std::process::exit(e.exit_code());
}
