use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};
use waypoint::config::AppConfig;
use waypoint::db::init_pool;
use waypoint::error::AppError;
use waypoint::routes::create_router;
use waypoint::services::{generator::OpenAiGenerator, supabase::SupabaseAuth};
use waypoint::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;
    let db = init_pool(&config.database_url).await?;

    if let Err(err) = sqlx::migrate!("./migrations").run(&db).await {
        error!("migration failed: {err:?}");
        return Err(err.into());
    }

    let auth = SupabaseAuth::new(
        config.supabase_url.as_deref(),
        config.supabase_anon_key.clone(),
    )?;
    let generator = OpenAiGenerator::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.openai_model.clone(),
    );

    let state = AppState::new(config.clone(), db, Arc::new(auth), Arc::new(generator));
    let app = create_router(state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server shut down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,waypoint=debug".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
