use std::{sync::Arc, time::Duration};

use {
    atelia_backend::{HttpBackend, HttpMediaFetcher},
    atelia_chat::{ChatRouter, Services},
    atelia_gateway::config::{self, AteliaConfig},
    atelia_sessions::SessionStore,
    clap::Parser,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "atelia", about = "Atelia — chat front-end for image generation")]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "ATELIA_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, env = "ATELIA_JSON_LOGS", default_value_t = false)]
    json_logs: bool,

    /// Address to bind to (overrides config value).
    #[arg(long, env = "ATELIA_BIND")]
    bind: Option<String>,
    /// Port to listen on (overrides config value).
    #[arg(long, env = "ATELIA_PORT")]
    port: Option<u16>,
    /// Config file path (overrides standard-location discovery).
    #[arg(long, env = "ATELIA_CONFIG")]
    config: Option<std::path::PathBuf>,
    /// Generation backend base URL (overrides config value).
    #[arg(long, env = "ATELIA_BACKEND_URL")]
    backend_url: Option<String>,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<AteliaConfig> {
    let mut cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::discover_and_load(),
    };
    if let Some(bind) = &cli.bind {
        cfg.server.bind = bind.clone();
    }
    if let Some(port) = cli.port {
        cfg.server.port = port;
    }
    if let Some(url) = &cli.backend_url {
        cfg.backend.base_url = url.clone();
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_telemetry(&cli);
    let cfg = load_config(&cli)?;

    let connect_timeout = Duration::from_secs(cfg.backend.connect_timeout_secs);
    let backend = Arc::new(HttpBackend::new(&cfg.backend.base_url, connect_timeout)?);
    let media = Arc::new(HttpMediaFetcher::new(&cfg.backend.base_url, connect_timeout)?);

    let services = Arc::new(Services {
        generator: Arc::clone(&backend) as _,
        intent: Arc::clone(&backend) as _,
        defaults: Arc::clone(&backend) as _,
        directory: Arc::clone(&backend) as _,
        registry: backend as _,
        media: media as _,
        sessions: Arc::new(SessionStore::new()),
    });
    let app = atelia_gateway::build_app(Arc::new(ChatRouter::new(services)));

    let addr = format!("{}:{}", cfg.server.bind, cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, backend = %cfg.backend.base_url, "atelia gateway listening");
    axum::serve(listener, app).await?;
    Ok(())
}
