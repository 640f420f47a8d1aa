use anyhow::Context;
use room_dataset_loader::{find_dataset_path, Dataset};
use route_server::{create_app, AppState, ServerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting Route Server");

    let config = ServerConfig::from_env().context("invalid server configuration")?;

    let dataset_path = find_dataset_path()?;
    let dataset = Dataset::from_path(&dataset_path)
        .with_context(|| format!("failed to load rooms from {}", dataset_path.display()))?;
    let state = AppState::new(dataset, &config.router).context("failed to build room graph")?;

    let app = create_app(state, &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
