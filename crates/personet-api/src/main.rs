//! Personet REST API entry point.
//!
//! Binary name: `personet`
//!
//! Parses CLI arguments, initializes the database and chat service, then
//! starts the REST API server.

use clap::{Parser, Subcommand};

use state::AppState;

mod http;
mod state;

#[derive(Parser)]
#[command(name = "personet", version, about = "Persona chat session server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable OpenTelemetry trace export (stdout exporter).
    #[arg(long, global = true)]
    otel: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server.
    Serve {
        /// Bind address; overrides `bind_addr` from config.toml.
        #[arg(long, env = "PERSONET_BIND_ADDR")]
        addr: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    personet_observe::tracing_setup::init_tracing(cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let state = AppState::init().await?;

    match cli.command {
        Commands::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| state.config.bind_addr.clone());
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Personet API listening on http://{addr}");

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            tracing::info!("Server stopped");
        }
    }

    personet_observe::tracing_setup::shutdown_tracing();
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
