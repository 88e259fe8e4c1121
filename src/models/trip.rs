use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

pub const MISSING_FIELDS: &str = "Missing fields";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Trip {
    pub id: String,
    pub title: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Trip fields as they arrive from a client. Every field is optional so
/// that a missing one surfaces as a validation error rather than a
/// deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripDraft {
    pub title: Option<String>,
    pub destination: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTrip {
    pub title: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub created_by: Option<String>,
}

impl TripDraft {
    pub fn validate(self) -> Result<NewTrip, AppError> {
        let (Some(title), Some(destination), Some(start_date), Some(end_date)) = (
            present(self.title),
            present(self.destination),
            present(self.start_date),
            present(self.end_date),
        ) else {
            return Err(AppError::Validation(MISSING_FIELDS.into()));
        };

        Ok(NewTrip {
            title,
            destination,
            start_date,
            end_date,
            created_by: present(self.user_id),
        })
    }
}

// Values are kept exactly as submitted; only emptiness is checked.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
