use tracing_subscriber::EnvFilter;

use custom_domain_api::{routes, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let bind_address = config.bind_address.clone();

    let state = AppState::new(config);
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Custom Domain API listening on {bind_address}");
    axum::serve(listener, app).await?;

    Ok(())
}
