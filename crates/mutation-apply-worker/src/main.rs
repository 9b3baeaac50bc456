//! Apply worker binary entry point.
//!
//! Usage: mutation-apply-worker [--redis-url <url>] [--database <path>]

use clap::Parser;
use mutation_apply_worker::{ApplyWorker, WorkerConfig, WorkerResult};
use std::path::PathBuf;
use tracing::{error, info};

/// Applies published expense mutations to the store.
#[derive(Parser, Debug)]
#[command(name = "mutation-apply-worker")]
#[command(about = "Subscribes to expense mutation channels and applies them to the store")]
struct Args {
    /// Redis connection URL.
    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    redis_url: String,

    /// Path to the SQLite database file.
    #[arg(long, env = "OUTGO_DB_PATH")]
    database: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> WorkerResult<()> {
    let args = Args::parse();

    observability::init_with_config(observability::LogConfig {
        service_name: "mutation-apply-worker".into(),
        default_level: args.log_level.clone(),
        also_stderr: true,
        ..Default::default()
    });

    info!("Apply worker starting...");

    let mut config = WorkerConfig::new()?;
    config.redis_url = args.redis_url;
    if let Some(database) = args.database {
        config.database_path = database;
    }

    info!(
        redis_url = %config.redis_url,
        database = %config.database_path.display(),
        max_attempts = config.retry.max_attempts,
        dead_letter_channel = %config.dead_letter_channel,
        "Configuration loaded"
    );

    let mut worker = ApplyWorker::new(config).await?;

    let ctrl_c = tokio::signal::ctrl_c();

    tokio::select! {
        result = worker.run() => {
            if let Err(e) = result {
                error!(error = %e, "Worker exited with error");
                return Err(e);
            }
        }
        _ = ctrl_c => {
            info!("Received shutdown signal, exiting...");
        }
    }

    Ok(())
}
