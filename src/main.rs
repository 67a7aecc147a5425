use clap::Parser;
use mailsieve::core::progress::LogProgress;
use mailsieve::utils::error::ValidatorError;
use mailsieve::utils::{logger, validation::Validate};
use mailsieve::{CliConfig, FilePipeline, LocalStorage, RunSummary, ValidationEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting mailsieve ({} strategy)", config.strategy);
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }
    let json_summary = config.json;

    // 輸入檔以工作目錄為根，報告寫到 output_path
    let source = LocalStorage::current_dir();
    let sink = LocalStorage::new(config.output_path.clone());
    let pipeline = match FilePipeline::new(source, sink, config) {
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
        Ok(summary) => print_summary(&summary, json_summary)?,
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn print_summary(summary: &RunSummary, json: bool) -> anyhow::Result<()> {
    tracing::info!(
        "✅ Validation completed: {} valid, {} invalid ({} ms)",
        summary.valid,
        summary.invalid,
        summary.elapsed.as_millis()
    );

    if json {
        println!("{}", summary.to_json()?);
        return Ok(());
    }

    println!("✅ Validation completed!");
    println!("📊 Valid: {}  Invalid: {}", summary.valid, summary.invalid);
    if summary.transport_failures > 0 {
        println!(
            "⚠️ {} remote lookups failed and were counted as invalid",
            summary.transport_failures
        );
    }
    println!("📁 Results saved to: {}", summary.output_path);
    Ok(())
}

fn exit_with(e: ValidatorError) -> ! {
    // 記錄詳細錯誤信息
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
