use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::{error, info};

use version_api::{
    config::{Config, EnvFile},
    db::Database,
    middleware::init_tracing,
    router::create_router,
    service::VersionService,
};

#[tokio::main]
async fn main() {
    // Load .env first so RUST_LOG from the file reaches the subscriber
    let env_file = EnvFile::load();

    // Initialize structured logging
    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialize tracing: {}", e);
        std::process::exit(1);
    }
    env_file.log();

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => {
            info!(
                "Configuration loaded (environment: {:?}, database: {})",
                config.environment,
                config.database.describe()
            );
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Open the connection pool; the service is useless without storage
    let database = match Database::new(config.database.clone()).await {
        Ok(db) => {
            info!("Database connected successfully");
            Arc::new(db)
        }
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    let service = Arc::new(VersionService::new(database));

    // Create the table, the unique active index and the initial version
    if let Err(e) = service.initialize_database().await {
        error!("Failed to initialize database: {}", e);
        std::process::exit(1);
    }
    info!("Database migrations completed successfully");

    let app = create_router(service);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting server on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            info!("Server listening on {}", addr);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Start the server with graceful shutdown handling
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Graceful shutdown signal handler
/// Listens for SIGTERM and SIGINT signals
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, initiating graceful shutdown");
        },
    }
}
