use clap::Parser;
use tweet_codec::utils::{logger, validation::Validate};
use tweet_codec::{CliConfig, DumpPipeline, ExchangeEngine, LocalStorage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting tweet-codec CLI");

    // 載入並驗證配置
    if let Err(e) = config.load_codec_config().and_then(|_| config.validate()) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code());
    }
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let storage = LocalStorage::new(".".to_string());
    let pipeline = DumpPipeline::new(storage, config);
    let engine = ExchangeEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Exchange completed successfully!");
            println!("✅ Normalized dump written to: {}", output_path);
        }
        Err(e) => {
            tracing::error!("❌ Exchange failed: {} (Severity: {:?})", e, e.severity());
            eprintln!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}
