mod cli;
mod config;
mod discovery;
mod docs;
mod handlers;
mod models;
mod routes;
mod sync;
mod websocket;

use std::net::SocketAddr;
use std::panic;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use clap::Parser;
use tokio::sync::Mutex;
use tracing::{info, error, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Command};
use config::Config;
use discovery::ProbeOutcome;
use routes::create_router;
use sync::SyncHub;

/// How long `scan` waits for the server to report our address
const IP_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Process-wide state handed to every HTTP and WebSocket handler
pub struct AppState {
    pub hub: Mutex<SyncHub>,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            hub: Mutex::new(SyncHub::new(config.edit_protocol, config.broadcast_capacity)),
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {

    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Default to info level, but allow debug for our app
            "collabo=debug,tower_http=debug,axum::rejection=trace,info".into()
        }))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
        Config::default()
    });

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            serve(config).await;
            ExitCode::SUCCESS
        }
        command @ Command::Scan { .. } => match scan(&command, &config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("Scan failed: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}

async fn serve(config: Config) {
    info!("Starting server...");
    if config.is_development() {
        info!("Running in development mode with {:?} edit protocol", config.edit_protocol);
    }

    let state = AppState::new(config.clone());
    let app_routes = create_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.server_address())
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", config.server_address()));

    info!("🚀 Server running on http://{}", config.server_address());
    info!("📡 WebSocket available at ws://{}/ws", config.server_address());
    info!("📚 Swagger UI available at http://{}/swagger", config.server_address());

    axum::serve(listener, app_routes.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .expect("Server failed to start");
}

async fn scan(command: &Command, config: &Config) -> Result<(), discovery::DiscoveryError> {
    let Command::Scan { server, .. } = command else {
        return Ok(());
    };
    let options = command.scan_options(config);

    let ip = discovery::request_ip(server, IP_REQUEST_TIMEOUT).await?;
    info!("A client is connected from {}", ip);

    let outcomes = discovery::scan_network(&ip, &options).await?;
    for outcome in &outcomes {
        if let ProbeOutcome::Discovered(addr) = outcome {
            info!("Live host: {}", addr);
        }
    }
    Ok(())
}
