use tokio::net::TcpListener;
use tracing::{error, info};
use wayfarer::config::AppConfig;
use wayfarer::db::{init_pool, run_migrations};
use wayfarer::error::AppError;
use wayfarer::routes::create_router;
use wayfarer::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;
    let db = init_pool(&config.database_url).await?;

    if let Err(err) = run_migrations(&db).await {
        error!("migration failed: {err:?}");
        return Err(err);
    }

    if config.unsplash_access_key.is_none() {
        info!("UNSPLASH_ACCESS_KEY not set, trips get the default cover image");
    }
    if config.gemini_api_key.is_none() {
        info!("GEMINI_API_KEY not set, activity suggestions are disabled");
    }

    let state = AppState::new(config.clone(), db)?;
    let app = create_router(state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,wayfarer=debug,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
