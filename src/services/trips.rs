use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        stop::{NewStop, Stop},
        trip::{NewTrip, Trip},
    },
};

/// Trip and stop rows. Every write goes straight to the pool: no
/// transaction and no de-duplication, so a repeated submit inserts twice.
#[derive(Clone)]
pub struct TripStore {
    db: DbPool,
}

impl TripStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn insert_trip(&self, trip: NewTrip) -> Result<Trip, AppError> {
        let row = sqlx::query_as::<_, Trip>(
            r#"INSERT INTO trips (id, title, destination, start_date, end_date, created_by, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
               RETURNING id, title, destination, start_date, end_date, created_by, created_at"#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&trip.title)
        .bind(&trip.destination)
        .bind(&trip.start_date)
        .bind(&trip.end_date)
        .bind(&trip.created_by)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;
        debug!(trip_id = %row.id, "trip inserted");
        Ok(row)
    }

    pub async fn list_trips(&self) -> Result<Vec<Trip>, AppError> {
        let rows = sqlx::query_as::<_, Trip>(
            "SELECT id, title, destination, start_date, end_date, created_by, created_at FROM trips ORDER BY rowid",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    pub async fn find_trip(&self, trip_id: &str) -> Result<Option<Trip>, AppError> {
        let row = sqlx::query_as::<_, Trip>(
            "SELECT id, title, destination, start_date, end_date, created_by, created_at FROM trips WHERE id = ?1",
        )
        .bind(trip_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    pub async fn insert_stop(&self, trip_id: &str, stop: NewStop) -> Result<Stop, AppError> {
        let row = sqlx::query_as::<_, Stop>(
            r#"INSERT INTO stops (id, trip_id, lat, lng, name, notes, link, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
               RETURNING id, trip_id, lat, lng, name, notes, link, created_at"#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(trip_id)
        .bind(stop.lat)
        .bind(stop.lng)
        .bind(&stop.name)
        .bind(&stop.notes)
        .bind(&stop.link)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;
        debug!(trip_id, stop_id = %row.id, "stop inserted");
        Ok(row)
    }

    pub async fn list_stops(&self, trip_id: &str) -> Result<Vec<Stop>, AppError> {
        let rows = sqlx::query_as::<_, Stop>(
            "SELECT id, trip_id, lat, lng, name, notes, link, created_at FROM stops WHERE trip_id = ?1 ORDER BY rowid",
        )
        .bind(trip_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
