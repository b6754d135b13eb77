mod api;
mod config;
mod error;
mod models;
mod services;
mod sources;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{Config, DEFAULT_CONFIG_PATH};
use models::FetchOutcome;
use services::{render, SupplyPoller, TerminalView, ViewState};
use sources::HttpSupplySource;

#[derive(Parser)]
#[command(name = "althea-info-dash")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Althea L1 token supply dashboard")]
struct Cli {
    /// Config file (defaults to ./config.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Info server host, overrides [backend].host
    #[arg(long)]
    host: Option<String>,

    /// Info server port, overrides [backend].port
    #[arg(long)]
    port: Option<u16>,

    /// Also serve the dashboard over HTTP
    #[arg(short, long)]
    serve: bool,

    /// Fetch once, print the card and exit
    #[arg(long)]
    once: bool,
}

impl Cli {
    fn load_config(&self) -> Result<Config, error::ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::load_or_default(&PathBuf::from(DEFAULT_CONFIG_PATH))?,
        };
        if let Some(host) = &self.host {
            config.backend.host = host.clone();
        }
        if let Some(port) = self.port {
            config.backend.port = port;
        }
        if self.serve {
            config.server.enabled = true;
        }
        Ok(config)
    }
}

#[tokio::main(worker_threads = 2)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr, the card goes to stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,althea_info_dash=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.load_config()?;
    let source = Arc::new(HttpSupplySource::new(&config.backend)?);
    tracing::info!("✓ Configuration loaded, backend {}", source.url());

    let poller = SupplyPoller::new(source).with_policy(config.poller.commit_policy);

    if cli.once {
        return match poller.poll_once().await {
            FetchOutcome::Failed(e) => Err(e.into()),
            outcome => {
                let view = ViewState::after(outcome).unwrap_or_default();
                print!("{}", render::screen(&view).to_text());
                Ok(())
            }
        };
    }

    let handle = Arc::new(poller.start());

    let server = if config.server.enabled {
        let app = api::create_router(Arc::new(api::AppState {
            poller: handle.clone(),
        }));
        let addr = format!("{}:{}", config.server.host, config.server.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("✓ Dashboard served on http://{}", addr);
        Some(tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Server error: {}", e);
            }
        }))
    } else {
        None
    };

    let mut terminal = TerminalView::new();
    let mut revisions = handle.subscribe();
    terminal.show(&handle.view());

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            changed = revisions.changed() => {
                if changed.is_err() {
                    break;
                }
                terminal.show(&handle.view());
            }
            _ = &mut ctrl_c => {
                break;
            }
        }
    }

    terminal.finish();
    handle.shutdown();
    if let Some(server) = server {
        server.abort();
    }
    tracing::info!("Shutting down...");

    Ok(())
}
