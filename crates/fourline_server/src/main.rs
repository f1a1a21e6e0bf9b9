//! Four-in-a-row game server binary.

use anyhow::Result;
use fourline_server::{app, shared_session};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let session = shared_session();
    let router = app(session);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!(port, "Game server ready at http://localhost:{}/", port);

    axum::serve(listener, router).await?;

    Ok(())
}
