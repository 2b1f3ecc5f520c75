//! shelfscan: storefront catalog extractor.
//!
//! Loads the configuration, launches Chrome and runs one extraction over
//! every department of the configured storefront.

mod cli;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use shelfscan_browser::CdpDriver;
use shelfscan_config::{ConfigLoader, ConfigValidator};
use shelfscan_core::{ExtractionSession, RunOutcome};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            // Tracing may not be installed yet.
            eprintln!("shelfscan: {}", e);
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load_or_default(&cli.config)?;
    cli.apply_overrides(&mut config);

    let log_file = logging::init_tracing(&config.logging)?;
    info!("Detail log: {}", log_file.display());

    let warnings = ConfigValidator::validate(&config)?.into_result()?;
    for warning in warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }

    info!("Launching browser (headless: {})", config.browser.headless);
    let driver = CdpDriver::launch(&config.browser, &config.timing).await?;
    let session = ExtractionSession::new(driver, &config)?;

    let cancel = session.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing the current page");
            cancel.cancel();
        }
    });

    let summary = session.run().await;

    if let Some(path) = &cli.output {
        output::write_summary(path, &summary)?;
        info!("Wrote {} records to {}", summary.all_records.len(), path.display());
    }

    Ok(match summary.outcome {
        RunOutcome::Completed | RunOutcome::Cancelled => ExitCode::SUCCESS,
        RunOutcome::Aborted(_) | RunOutcome::Failed(_) => ExitCode::FAILURE,
    })
}
