pub mod config;
pub mod gateway;
pub mod intake;

use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use clap::{Parser, Subcommand};
use log::{info, warn};
use tokio::net::TcpListener;

use config::{ConfigError, GatewayArgs, GatewayConfig, IntakeArgs, IntakeConfig};

/// Receives magnet links from the browser extension and hands them to a
/// downloader.
#[derive(Parser, Clone)]
#[command(name = "magnet-relay", version)]
pub struct Args {
    #[command(subcommand)]
    pub service: Service,
}

#[derive(Subcommand, Clone)]
pub enum Service {
    /// Create the media folder and start aria2c for every magnet
    Intake(IntakeArgs),
    /// Authenticated API that forwards magnets to qBittorrent
    Gateway(GatewayArgs),
}

pub async fn run(args: Args) -> Result<(), StartupError> {
    match args.service {
        Service::Intake(args) => {
            let bind = args.bind;
            let config = IntakeConfig::from(args);

            info!(
                "Movies go to {}, series to {}, queue file is {}",
                config.movies_dir.display(),
                config.series_dir.display(),
                config.queue_file.display()
            );

            serve("intake service", bind, intake::router(Arc::new(config))).await
        }
        Service::Gateway(args) => {
            let bind = args.bind;
            let config = GatewayConfig::try_from(args)?;

            for (category, root) in config.category_roots.configured() {
                info!("{category} root is {root}");
            }
            if config.credentials.is_none() {
                warn!("QB_USER/QB_PASS are not set, every magnet will be refused");
            }

            serve("magnet gateway", bind, gateway::router(Arc::new(config))).await
        }
    }
}

async fn serve(name: &str, bind: SocketAddr, app: Router) -> Result<(), StartupError> {
    let listener = TcpListener::bind(bind)
        .await
        .map_err(|err| StartupError::CantBind(format!("{bind}: {err}").into()))?;

    info!("Starting the {name} on {bind}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| StartupError::ServerError(err.to_string().into()))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}

#[derive(Debug)]
pub enum StartupError {
    Config(ConfigError),
    CantBind(Box<str>),
    ServerError(Box<str>),
}

impl From<ConfigError> for StartupError {
    fn from(value: ConfigError) -> Self {
        StartupError::Config(value)
    }
}

impl std::fmt::Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartupError::Config(err) => f.write_fmt(format_args!("{err}")),
            StartupError::CantBind(reason) => {
                f.write_fmt(format_args!("Server can't be started on {reason}"))
            }
            StartupError::ServerError(reason) => {
                f.write_fmt(format_args!("Server stopped unexpectedly. Reason: {reason}"))
            }
        }
    }
}

impl std::error::Error for StartupError {}
