use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    error::AppError, routes::ApiJson, services::supabase::Credentials, state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/signup", post(signup))
        .route("/login", post(login))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Waypoint trip planner API" }))
}

async fn signup(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<Json<Value>, AppError> {
    let payload = state.auth.sign_up(&credentials).await?;
    info!(email = %credentials.email, "account created");
    Ok(Json(payload))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<Json<Value>, AppError> {
    let payload = state.auth.sign_in(&credentials).await?;
    info!(email = %credentials.email, "logged in");
    Ok(Json(payload))
}
