use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull, DisplayFromStr, PickFirst};

/// Body of a plan request. Every client variant is accepted: a typed block
/// of stops, a list of stops (map pins), and an optional trip for context.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanRequest {
    #[serde(default, alias = "stopsText")]
    pub stops_text: Option<String>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub stops: Vec<StopInput>,
    #[serde(default)]
    pub trip: Option<TripContext>,
}

impl PlanRequest {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            stops_text: Some(text.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StopInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripContext {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItineraryEntry {
    pub stop: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    /// Models answer with `1` as often as `"1"`.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub order: u32,
    #[serde(default)]
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Itinerary {
    pub itinerary: Vec<ItineraryEntry>,
}
