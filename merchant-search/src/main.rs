//! Merchant Search Main Entry Point
//!
//! Serves the search API, or runs a batch reconciliation against the active
//! index provider.

use std::env;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use merchant_search::api::{create_app, run_server};
use merchant_search::batch::{BatchCommand, BatchMethod, BatchTarget, LogReporter, DEFAULT_PER_PAGE};
use merchant_search::{AppConfig, AppError, Dependencies};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "merchant-search", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the search API.
    Serve,
    /// Push every record of one or all entities through the provider's batch operations.
    Batch {
        /// `update` or `delete`.
        #[arg(default_value = "update")]
        method: BatchMethod,
        /// Entity slug, or `all`.
        #[arg(default_value = "all")]
        entity: String,
        /// Run against this provider instead of the active one.
        #[arg(long)]
        provider: Option<String>,
        /// Records per page.
        #[arg(long = "per-page", default_value_t = DEFAULT_PER_PAGE as u64, value_parser = clap::value_parser!(u64).range(1..))]
        per_page: u64,
    },
}

/// Initialize tracing/logging.
fn init_tracing() -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("merchant_search=info,merchant_search_repository=info")
    });

    let json_logs = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init()
            .map_err(|e| AppError::config(e.to_string()))?;

        info!(
            service_name = "merchant-search",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init()
            .map_err(|e| AppError::config(e.to_string()))?;

        info!(
            service_name = "merchant-search",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    init_tracing()?;

    let config = AppConfig::from_env();
    let deps = match Dependencies::new(&config) {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    for notice in deps.notices.all() {
        warn!(level = ?notice.level, "{}", notice.message);
    }

    match cli.command {
        Command::Serve => {
            let addr = config.socket_addr()?;
            run_server(create_app(Arc::new(deps)), addr).await
        }
        Command::Batch {
            method,
            entity,
            provider,
            per_page,
        } => {
            let mut command = BatchCommand::new(method, BatchTarget::from(entity.as_str()))
                .with_per_page(per_page as usize);
            if let Some(provider) = provider {
                command = command.with_provider(provider);
            }

            match deps.batch_reconciler().run(&command, &LogReporter).await {
                Ok(summary) => {
                    info!(
                        pages = summary.pages_processed,
                        failed_pages = summary.pages_failed,
                        items = summary.items,
                        "Batch run finished"
                    );
                    Ok(())
                }
                Err(e) => {
                    error!(error = %e, "Batch run aborted");
                    Err(e.into())
                }
            }
        }
    }
}
