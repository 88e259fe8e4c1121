use axum::{extract::State, routing::post, Json, Router};

use crate::{
    error::AppError,
    models::itinerary::{Itinerary, PlanRequest},
    routes::ApiJson,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/generate-plan", post(generate_plan))
}

async fn generate_plan(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PlanRequest>,
) -> Result<Json<Itinerary>, AppError> {
    Ok(Json(state.planner.generate(&request).await?))
}
