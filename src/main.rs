use place_backend::{
    catalog::LandmarkCatalog,
    config::AppConfig,
    db, routes,
    services::{self, SystemClock},
    AppState,
};

use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "place_backend=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    config.validate_production()?;

    // Database connection
    let pool = db::create_pool(&config).await?;

    // Run migrations
    db::run_migrations(&pool).await?;

    let catalog = Arc::new(LandmarkCatalog::builtin()?);
    tracing::info!("Loaded {} landmarks", catalog.len());

    let email_service = services::create_email_service();

    // Create app state
    let app_state = AppState::new(
        pool,
        &config,
        catalog,
        email_service,
        Arc::new(SystemClock),
    );

    app_state.avatar_service.ensure_directory().await?;
    tracing::info!(
        "Serving avatars from {}",
        app_state.avatar_service.directory().display()
    );

    let _sweeper = app_state
        .password_reset_service
        .spawn_sweeper(config.reset_sweep_interval);

    let app = routes::app_router(app_state);

    // Start server
    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));

    tracing::info!("Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
