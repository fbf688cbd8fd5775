use clap::Parser;
use colored::*;
use tracing::{info, warn};

use error_common::{HospitalError, Result};
use hospital_server::{config::DEFAULT_CONFIG_FILE, create_app, HospitalServer, ServerConfig};

/// Hospital Engine HTTP Server
#[derive(Parser, Debug)]
#[command(name = "hospital-server")]
#[command(about = "Role-gated hospital records and appointments HTTP API server")]
struct Args {
    /// Server bind address (overrides the config file)
    #[arg(long, env = "HOSPITAL_HOST")]
    host: Option<String>,

    /// Server port (overrides the config file)
    #[arg(short, long, env = "HOSPITAL_PORT")]
    port: Option<u16>,

    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = ServerConfig::load(&args.config)
        .map_err(|e| HospitalError::ConfigError(format!("{}: {}", args.config, e)))?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if config.is_production() {
        config.logging.json = true;
    }

    logger_redacted::init_tracing(&config.logging, args.verbose)
        .map_err(|e| HospitalError::ConfigError(e.to_string()))?;

    let address = config.bind_address();
    info!("🏥 {}", "Starting Hospital Engine HTTP Server".bright_cyan());
    info!("📋 Version: {}", env!("CARGO_PKG_VERSION").bright_white());
    info!("🌐 Bind address: {}", address.bright_yellow());

    let server = HospitalServer::new(config).await?;
    server.bootstrap_doctor().await?;

    let app = create_app(server);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| HospitalError::NetworkError(format!("Failed to bind to {}: {}", address, e)))?;

    info!("🚀 {}", format!("Hospital Engine server running on http://{}", address).bright_green());
    info!("📋 {}", format!("Health check available at: http://{}/health", address).bright_blue());
    info!("📋 {}", format!("API v1 available at: http://{}/api/v1", address).bright_blue());
    info!("📖 {}", format!("API docs available at: http://{}/swagger-ui", address).bright_blue());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| HospitalError::ServerError(format!("HTTP server error: {}", e)))?;

    info!("{}", "Server stopped".bright_white());
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
