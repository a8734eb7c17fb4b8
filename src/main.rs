use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use hn_search::{
    config::Config,
    api::routes::create_router,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("hn_search=info,tower_http=info")),
        )
        .init();

    let config = Config::load()?;
    let server_addr = config.server_addr;
    tracing::info!(api_base = %config.api_base, hits_per_page = config.hits_per_page, "configuration loaded");

    let app_state = AppState::new(config)?;

    // Initial load, like a page being opened for the first time
    let coordinator = app_state.coordinator.clone();
    let initial_query = app_state.config.initial_query.clone();
    tokio::spawn(async move {
        coordinator.load(&initial_query, 0).await;
    });

    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;
    tracing::info!(%server_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
