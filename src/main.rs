#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use product_export_crawler::cli::Cli;
use product_export_crawler::infrastructure::logging::{init_logging_with_config, log_system_info};
use product_export_crawler::{ConfigManager, CrawlUseCase};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };

    let mut config = manager.load_config()?;
    cli.apply_to(&mut config);

    init_logging_with_config(&config.logging).context("Failed to initialize logging")?;
    log_system_info();
    info!("{}", manager.config_source());

    config.validate().context("Invalid configuration")?;

    if cli.write_config {
        manager.save_config(&config).await?;
        info!("Configuration written to {:?}", manager.config_path());
        return Ok(());
    }

    let use_case = CrawlUseCase::from_config(&config)?;
    match use_case.run().await {
        Ok(report) => {
            info!(
                "Exported {} of {} products to {:?}",
                report.exported, report.unique, report.output_path
            );
            Ok(())
        }
        Err(e) => {
            error!("Crawl run failed: {:#}", e);
            Err(e)
        }
    }
}
