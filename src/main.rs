use std::net::SocketAddr;
use std::sync::Arc;

use alerting_gateway::clients::{GrpcAlertManager, KubeRestClient, ResourceLister};
use alerting_gateway::server::config::ServerConfig;
use alerting_gateway::utils::idutils;
use alerting_gateway::version::VERSION;
use alerting_gateway::web;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,
}

fn init_logging(log_dir: &str) -> WorkerGuard {
    // Log to a file: JSON format, daily rotation
    let (file_writer, guard) =
        tracing_appender::non_blocking(rolling::daily(log_dir, "alerting-gateway.log"));
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,h2=warn,tower=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    guard
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C.");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!(error = %e, "Failed to listen for SIGTERM."),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received.");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Manually check for --version before full parsing to keep the output simple.
    if std::env::args().any(|arg| arg == "--version") {
        println!("Alerting gateway version: {VERSION}");
        return Ok(());
    }

    let args = Args::parse();

    // Logging needs log_dir, so configuration errors are printed before it is up.
    let server_config = match ServerConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load server configuration: {e}");
            return Err(e.into());
        }
    };

    let _log_guard = init_logging(&server_config.log_dir);
    info!("Starting alerting gateway, version: {}", VERSION);

    // 0 keeps the pid-derived default.
    if server_config.machine_id != 0 && !idutils::init_machine_id(server_config.machine_id) {
        warn!(machine_id = server_config.machine_id, "Machine id was already initialized.");
    }

    let alert_manager = Arc::new(GrpcAlertManager::new(
        &server_config.alert_manager_endpoint,
        server_config.request_timeout(),
    )?);
    info!(endpoint = %server_config.alert_manager_endpoint, "Alert-manager client ready.");

    let resource_lister: Option<Arc<dyn ResourceLister>> = match server_config.kube_client_config() {
        Some(kube_config) => {
            let api_url = kube_config.api_url.clone();
            match KubeRestClient::new(kube_config).await {
                Ok(client) => {
                    info!(%api_url, "Kubernetes client ready.");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    error!(%api_url, error = %e, "Failed to create Kubernetes client. Resource routes are disabled.");
                    None
                }
            }
        }
        None => {
            warn!("No Kubernetes API server configured. Resource routes are disabled.");
            None
        }
    };

    let app = web::create_axum_router(alert_manager, resource_lister);

    let addr: SocketAddr = server_config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "HTTP server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Box::new)?;

    Ok(())
}
