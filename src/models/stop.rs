use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Stop {
    pub id: String,
    pub trip_id: String,
    pub lat: f64,
    pub lng: f64,
    pub name: Option<String>,
    pub notes: Option<String>,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStop {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}
