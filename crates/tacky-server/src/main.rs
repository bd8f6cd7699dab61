//! Standalone Tacky server.
//!
//! ```text
//! tacky-server [config.json]
//! ```
//!
//! Without a config file the server listens on `0.0.0.0:8081`. Log output
//! is controlled with `RUST_LOG` (default `info`).

use tacky::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), TackyError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!(%path, "loading config");
            ServerConfig::from_json_file(&path)?
        }
        None => ServerConfig::default(),
    };

    let server = TackyServerBuilder::new()
        .config(config)
        .build::<NoRules>()
        .await?;

    server.run().await
}
