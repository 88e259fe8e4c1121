use std::{collections::HashSet, fmt::Write as _, sync::Arc};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    error::AppError,
    models::itinerary::{Itinerary, ItineraryEntry, PlanRequest, TripContext},
    services::generator::ItineraryGenerator,
};

pub const NO_STOPS: &str = "No stops provided";

/// A stop as it goes into the prompt: a name, a coordinate, or both.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanStop {
    pub name: Option<String>,
    pub coords: Option<(f64, f64)>,
}

impl PlanStop {
    fn key(&self) -> String {
        match (&self.name, self.coords) {
            (Some(name), _) => name.clone(),
            (None, Some((lat, lng))) => format!("{lat:.6},{lng:.6}"),
            (None, None) => String::new(),
        }
    }

    fn label(&self) -> String {
        match (&self.name, self.coords) {
            (Some(name), Some((lat, lng))) => format!("{name} ({lat:.6}, {lng:.6})"),
            (Some(name), None) => name.clone(),
            (None, Some((lat, lng))) => format!("{lat:.6}, {lng:.6}"),
            (None, None) => String::new(),
        }
    }
}

/// Typed lines first, then listed stops; blanks dropped, first occurrence
/// of each distinct stop kept.
pub fn collect_stops(request: &PlanRequest) -> Vec<PlanStop> {
    let typed = request
        .stops_text
        .as_deref()
        .unwrap_or_default()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| PlanStop {
            name: Some(line.to_string()),
            coords: None,
        });

    let listed = request.stops.iter().filter_map(|stop| {
        let name = stop
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        let coords = stop.lat.zip(stop.lng);
        (name.is_some() || coords.is_some()).then_some(PlanStop { name, coords })
    });

    let mut seen = HashSet::new();
    typed
        .chain(listed)
        .filter(|stop| seen.insert(stop.key()))
        .collect()
}

pub fn build_prompt(trip: Option<&TripContext>, stops: &[PlanStop]) -> String {
    let mut prompt = String::from("Plan a trip itinerary for the stops listed below.\n");

    if let Some(trip) = trip {
        let mut context = Vec::new();
        if let Some(title) = trip.title.as_deref() {
            context.push(format!("titled \"{title}\""));
        }
        if let Some(destination) = trip.destination.as_deref() {
            context.push(format!("to {destination}"));
        }
        if let (Some(start), Some(end)) = (trip.start_date.as_deref(), trip.end_date.as_deref()) {
            context.push(format!("from {start} to {end}"));
        }
        if !context.is_empty() {
            let _ = writeln!(prompt, "The trip is {}.", context.join(" "));
        }
    }

    prompt.push_str("Stops:\n");
    for (index, stop) in stops.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {}", index + 1, stop.label());
    }

    prompt.push_str(
        "Order the stops chronologically and suggest a time of day and a short activity note for each. \
Include every stop exactly once and keep each stop name exactly as written above. \
Respond with JSON only, in the form \
{\"itinerary\":[{\"stop\":\"<stop>\",\"lat\":<number or null>,\"lng\":<number or null>,\"order\":1,\"time\":\"09:00\",\"notes\":\"<activity>\"}]}",
    );
    prompt
}

/// Reads a completion as either `{"itinerary": [...]}` or a bare array,
/// tolerating a Markdown code fence around it. Entries come back sorted
/// by `order`.
pub fn parse_itinerary(raw: &str) -> Result<Itinerary, String> {
    let text = strip_code_fence(raw);
    let value: Value =
        serde_json::from_str(text).map_err(|err| format!("completion is not JSON: {err}"))?;

    let entries = match value {
        array @ Value::Array(_) => array,
        Value::Object(mut map) => map
            .remove("itinerary")
            .filter(Value::is_array)
            .ok_or_else(|| "completion has no itinerary array".to_string())?,
        _ => return Err("completion is neither an object nor an array".into()),
    };

    let mut itinerary: Vec<ItineraryEntry> = serde_json::from_value(entries)
        .map_err(|err| format!("itinerary entries are malformed: {err}"))?;
    itinerary.sort_by_key(|entry| entry.order);
    Ok(Itinerary { itinerary })
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[derive(Clone)]
pub struct Planner {
    generator: Arc<dyn ItineraryGenerator>,
}

impl Planner {
    pub fn new(generator: Arc<dyn ItineraryGenerator>) -> Self {
        Self { generator }
    }

    pub async fn generate(&self, request: &PlanRequest) -> Result<Itinerary, AppError> {
        let stops = collect_stops(request);
        if stops.is_empty() {
            return Err(AppError::Validation(NO_STOPS.into()));
        }

        let prompt = build_prompt(request.trip.as_ref(), &stops);
        let raw = self
            .generator
            .complete(&prompt)
            .await
            .map_err(|err| AppError::Generation(format!("{err:#}")))?;
        debug!(response = %raw, "completion received");

        let itinerary = parse_itinerary(&raw).map_err(AppError::Generation)?;
        if itinerary.itinerary.len() != stops.len() {
            warn!(
                requested = stops.len(),
                returned = itinerary.itinerary.len(),
                "generator returned a different number of stops"
            );
        }
        info!(stops = stops.len(), "itinerary generated");
        Ok(itinerary)
    }
}
