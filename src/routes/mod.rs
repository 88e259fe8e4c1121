pub mod app;
pub mod plan;
pub mod public;
pub mod trips;

use axum::{extract::FromRequest, Router};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::{error::AppError, state::AppState};

/// `Json` whose rejections (bad content type, syntax, wrong field types)
/// come back as a 400 `{error}` body like every other validation failure.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(public::router())
        .merge(trips::router())
        .merge(plan::router())
        .nest("/app", app::router())
        .nest_service("/static", ServeDir::new("static"))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
