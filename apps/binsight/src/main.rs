use binsight::cli::{CliError, cmd_history, cmd_serve, cmd_status};
use binsight::config::UpstreamConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Binsight: waste-bin classification and fill-level endpoint
#[derive(Parser)]
#[command(name = "binsight", version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Path to the document store
    #[arg(long, env = "BINSIGHT_DB", default_value = "binsight.redb", global = true)]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Listen address
        #[arg(short, long, env = "BINSIGHT_BIND", default_value = "0.0.0.0:8080")]
        bind: String,

        #[command(flatten)]
        upstream: UpstreamConfig,
    },
    /// Print live bin status (one slot, or all)
    Status {
        /// Slot name: BIN_CHECK or a category such as PLASTIC
        slot: Option<String>,
    },
    /// Print recent fullness readings
    History {
        /// Number of readings to print
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    match cli.command {
        Commands::Serve { bind, upstream } => {
            tracing::info!("Binsight v{}", env!("CARGO_PKG_VERSION"));
            cmd_serve(&bind, &cli.db, &upstream).await
        }
        Commands::Status { slot } => cmd_status(&cli.db, slot.as_deref()).map(|_| ()),
        Commands::History { limit } => cmd_history(&cli.db, limit).map(|_| ()),
    }
}
