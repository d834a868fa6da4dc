//! QA Ledger Main Entry Point
//!
//! Reads JSON-lines commands from stdin, applies them to the voting ledger
//! and writes one JSON response per command to stdout. Logs go to stderr.

use dotenv::dotenv;
use qa_ledger::config::LogFormat;
use qa_ledger::orchestrator::write_responses;
use qa_ledger::{AppError, Dependencies, Settings};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("qa_ledger=info,qa_ledger_core=info"));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .pretty()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }

    info!(
        service_name = "qa-ledger",
        service_version = env!("CARGO_PKG_VERSION"),
        log_format = ?format,
        "Tracing initialized"
    );
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load environment variables from .env file
    dotenv().ok();

    let settings = Settings::from_env()?;
    init_tracing(settings.log_format);

    info!(
        store = ?settings.store,
        worker_concurrency = settings.worker_concurrency,
        "Starting QA ledger"
    );

    let Dependencies {
        mut orchestrator,
        responses,
    } = match Dependencies::new(&settings).await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let writer = tokio::spawn(write_responses(responses, tokio::io::stdout()));

    let run_result = orchestrator.run().await;
    // The orchestrator holds the last response sender; dropping it lets the
    // writer drain and finish.
    drop(orchestrator);

    match writer.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "Response writer failed"),
        Err(e) => error!(error = %e, "Response writer panicked"),
    }

    match run_result {
        Ok(()) => {
            info!("QA ledger completed successfully");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "QA ledger failed");
            Err(e.into())
        }
    }
}
