use clap::Parser;
use ration_check::core::ConfigProvider;
use ration_check::utils::{logger, validation::Validate};
use ration_check::{CheckEngine, CliConfig, FileConfig, LocalStorage, PortalPipeline};

async fn run_job<C>(config: C, monitor_enabled: bool) -> ration_check::Result<String>
where
    C: ConfigProvider + 'static,
{
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = PortalPipeline::new(storage, config)?;
    let engine = CheckEngine::new_with_monitoring(pipeline, monitor_enabled);
    engine.run().await
}

async fn run(config: CliConfig) -> ration_check::Result<String> {
    let monitor_enabled = config.monitor;

    match config.config.clone() {
        Some(path) => {
            let file_config = FileConfig::load(&path)?;
            tracing::info!("Running job '{}' from {}", file_config.job_name(), path);
            file_config.validate()?;
            run_job(file_config, monitor_enabled).await
        }
        None => {
            config.validate()?;
            run_job(config, monitor_enabled).await
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting ration-check");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }
    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    match run(config).await {
        Ok(output_path) => {
            tracing::info!("✅ Commodity check completed successfully!");
            tracing::info!("📁 Results saved to: {}", output_path);
            println!("✅ Processing complete. Results saved in '{}'.", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Commodity check failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ration_check::utils::error::ErrorSeverity::Low => 0,
                ration_check::utils::error::ErrorSeverity::Medium => 2,
                ration_check::utils::error::ErrorSeverity::High => 1,
                ration_check::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
