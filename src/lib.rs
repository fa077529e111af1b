pub mod api;
pub mod config;
pub mod credentials;
pub mod db;
pub mod error;
pub mod format;
pub mod lifecycle;
pub mod models;
pub mod registry;
pub mod reports;
pub mod statistics;

use tracing_subscriber::EnvFilter;

pub use error::ServiceError;

/// Process entry point: logging, configuration, then the HTTP server.
pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = match config::ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime");

    let result = runtime.block_on(async {
        let (listener, _addr) = api::server::bind(&config).await?;
        api::server::serve(listener, config).await
    });

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
