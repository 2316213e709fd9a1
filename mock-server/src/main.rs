use std::sync::Arc;

use mock_server::{app_with, InMemoryRepository, ServerConfig};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let config = ServerConfig::from_env();
    init_tracing(config.log_json);

    let repo = if config.seed {
        InMemoryRepository::seeded()
    } else {
        InMemoryRepository::new()
    };

    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, seed = config.seed, "listening");
    mock_server::run(listener, app_with(Arc::new(repo))).await
}
