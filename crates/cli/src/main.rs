mod auth_commands;
mod sync_commands;

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "gas", about = "gas — sync Google Apps Script projects with your local disk")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Authentication against Google APIs.
    Auth {
        #[command(subcommand)]
        action: auth_commands::AuthAction,
    },
    /// Push script content to Google Drive.
    Push {
        /// Push the last pulled remote state instead of local content.
        #[arg(long)]
        from_remote: bool,
    },
    /// Pull script content from Google Drive into `.gas/remote.json`.
    Pull,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "gas starting");

    match cli.command {
        Commands::Auth { action } => auth_commands::handle_auth(action).await,
        Commands::Push { from_remote } => sync_commands::push(from_remote).await,
        Commands::Pull => sync_commands::pull().await,
    }
}
