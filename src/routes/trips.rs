use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::{
    error::AppError,
    models::{
        stop::{NewStop, Stop},
        trip::{Trip, TripDraft},
    },
    routes::ApiJson,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips", get(list_trips).post(create_trip))
        .route("/trips/:id", get(get_trip))
        .route("/trips/:id/stops", get(list_stops).post(create_stop))
}

/// Answers with a one-element array, the shape clients index with `[0]`.
async fn create_trip(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<TripDraft>,
) -> Result<Json<Vec<Trip>>, AppError> {
    let trip = state.trips.insert_trip(draft.validate()?).await?;
    Ok(Json(vec![trip]))
}

async fn list_trips(State(state): State<AppState>) -> Result<Json<Vec<Trip>>, AppError> {
    Ok(Json(state.trips.list_trips().await?))
}

async fn get_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> Result<Json<Trip>, AppError> {
    let trip = state
        .trips
        .find_trip(&trip_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(trip))
}

async fn list_stops(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> Result<Json<Vec<Stop>>, AppError> {
    Ok(Json(state.trips.list_stops(&trip_id).await?))
}

async fn create_stop(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
    ApiJson(stop): ApiJson<NewStop>,
) -> Result<Json<Stop>, AppError> {
    Ok(Json(state.trips.insert_stop(&trip_id, stop).await?))
}
