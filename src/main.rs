use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use stream_studio::{create_router, AppState, Config, SimulatedBackend, SimulatedOutcome, Studio};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "stream-studio", about = "Local streaming studio session server")]
struct Args {
    /// Config file (extension optional)
    #[arg(long, default_value = "config/stream-studio")]
    config: String,

    /// Override the HTTP bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the HTTP port
    #[arg(long)]
    port: Option<u16>,

    /// How the simulated devices answer access requests
    #[arg(long, value_parser = parse_outcome)]
    simulate: Option<SimulatedOutcome>,
}

fn parse_outcome(s: &str) -> Result<SimulatedOutcome, String> {
    s.parse().map_err(|e| format!("{}", e))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("stream_studio=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config)?;

    if let Some(bind) = args.bind {
        cfg.service.http.bind = bind;
    }
    if let Some(port) = args.port {
        cfg.service.http.port = port;
    }
    if let Some(outcome) = args.simulate {
        cfg.simulator.outcome = outcome;
    }

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Using simulated media devices ({:?})", cfg.simulator.outcome);

    let backend = Arc::new(SimulatedBackend::new(cfg.simulated_config()));
    let studio = Studio::new(&cfg, backend);
    let app = create_router(AppState::new(studio));

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("HTTP server failed")?;

    Ok(())
}
