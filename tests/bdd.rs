mod common;

use std::{fmt, sync::Arc};

use cucumber::{given, then, when, World as _};
use waypoint::{
    error::AppError,
    models::{
        itinerary::{Itinerary, PlanRequest},
        stop::NewStop,
        trip::{Trip, TripDraft},
    },
    state::AppState,
};

use common::{EchoGenerator, TestApp};

#[derive(Debug, cucumber::World, Default)]
struct AppWorld {
    app: Option<Holder>,
    trip: Option<Trip>,
    rejection: Option<String>,
    itinerary: Option<Itinerary>,
}

struct Holder(TestApp);

impl fmt::Debug for Holder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestApp").finish()
    }
}

impl AppWorld {
    fn state(&self) -> &AppState {
        &self
            .app
            .as_ref()
            .expect("state must be initialised first")
            .0
            .state
    }

    fn current_trip(&self) -> &Trip {
        self.trip.as_ref().expect("a trip must exist first")
    }
}

fn draft(title: String, destination: String, start: String, end: String) -> TripDraft {
    TripDraft {
        title: Some(title),
        destination: Some(destination),
        start_date: Some(start),
        end_date: Some(end),
        user_id: None,
    }
}

#[given("a fresh application state")]
async fn given_fresh_state(world: &mut AppWorld) {
    world.app = Some(Holder(
        TestApp::with_generator(Arc::new(EchoGenerator)).await,
    ));
    world.trip = None;
    world.rejection = None;
    world.itinerary = None;
}

#[given(regex = r#"^a trip "([^"]*)" to "([^"]*)" from "([^"]*)" to "([^"]*)"$"#)]
async fn given_trip(
    world: &mut AppWorld,
    title: String,
    destination: String,
    start: String,
    end: String,
) {
    create_trip(world, title, destination, start, end).await;
}

#[when(regex = r#"^I create a trip "([^"]*)" to "([^"]*)" from "([^"]*)" to "([^"]*)"$"#)]
async fn when_create_trip(
    world: &mut AppWorld,
    title: String,
    destination: String,
    start: String,
    end: String,
) {
    create_trip(world, title, destination, start, end).await;
}

async fn create_trip(
    world: &mut AppWorld,
    title: String,
    destination: String,
    start: String,
    end: String,
) {
    let result = match draft(title, destination, start, end).validate() {
        Ok(new_trip) => world.state().trips.insert_trip(new_trip).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(trip) => world.trip = Some(trip),
        Err(AppError::Validation(msg)) => world.rejection = Some(msg),
        Err(err) => panic!("unexpected store failure: {err}"),
    }
}

#[then(regex = r"^the trip listing contains (\d+) trips?$")]
async fn then_listing_count(world: &mut AppWorld, expected: usize) {
    let trips = world.state().trips.list_trips().await.expect("list trips");
    assert_eq!(trips.len(), expected);
}

#[then(regex = r#"^the latest trip is "([^"]*)" to "([^"]*)" from "([^"]*)" to "([^"]*)"$"#)]
async fn then_latest_trip(
    world: &mut AppWorld,
    title: String,
    destination: String,
    start: String,
    end: String,
) {
    let trips = world.state().trips.list_trips().await.expect("list trips");
    let latest = trips.last().expect("at least one trip expected");
    assert_eq!(latest.title, title);
    assert_eq!(latest.destination, destination);
    assert_eq!(latest.start_date, start);
    assert_eq!(latest.end_date, end);
    assert_eq!(Some(latest), world.trip.as_ref());
}

#[then(regex = r#"^the trip is rejected with "([^"]*)"$"#)]
async fn then_trip_rejected(world: &mut AppWorld, message: String) {
    assert_eq!(world.rejection.as_deref(), Some(message.as_str()));
}

#[when(regex = r"^I drop a pin at (-?[\d.]+), (-?[\d.]+)$")]
async fn when_drop_pin(world: &mut AppWorld, lat: f64, lng: f64) {
    let trip_id = world.current_trip().id.clone();
    let stop = NewStop {
        lat,
        lng,
        name: None,
        notes: None,
        link: None,
    };
    world
        .state()
        .trips
        .insert_stop(&trip_id, stop)
        .await
        .expect("insert stop");
}

#[then(regex = r"^the trip has (\d+) stops?$")]
async fn then_trip_stops(world: &mut AppWorld, expected: usize) {
    let trip_id = world.current_trip().id.clone();
    let stops = world
        .state()
        .trips
        .list_stops(&trip_id)
        .await
        .expect("list stops");
    assert_eq!(stops.len(), expected);
    assert!(stops.iter().all(|stop| stop.trip_id == trip_id));
}

#[when(regex = r#"^I plan an itinerary for the stops "([^"]*)"$"#)]
async fn when_plan(world: &mut AppWorld, stops: String) {
    let request = PlanRequest::from_text(stops.replace('|', "\n"));
    match world.state().planner.generate(&request).await {
        Ok(itinerary) => world.itinerary = Some(itinerary),
        Err(AppError::Validation(msg)) => world.rejection = Some(msg),
        Err(err) => panic!("unexpected planning failure: {err}"),
    }
}

#[then(regex = r#"^the itinerary visits "([^"]*)" in that order$"#)]
async fn then_itinerary_order(world: &mut AppWorld, expected: String) {
    let itinerary = world.itinerary.as_ref().expect("an itinerary");
    let visited: Vec<&str> = itinerary
        .itinerary
        .iter()
        .map(|entry| entry.stop.as_str())
        .collect();
    assert_eq!(visited, expected.split('|').collect::<Vec<_>>());
}

#[then("every itinerary entry has notes")]
async fn then_entries_have_notes(world: &mut AppWorld) {
    let itinerary = world.itinerary.as_ref().expect("an itinerary");
    assert!(itinerary
        .itinerary
        .iter()
        .all(|entry| entry.notes.as_deref().is_some_and(|n| !n.is_empty())));
}

#[then(regex = r#"^planning is refused with "([^"]*)"$"#)]
async fn then_planning_refused(world: &mut AppWorld, message: String) {
    assert!(world.itinerary.is_none());
    assert_eq!(world.rejection.as_deref(), Some(message.as_str()));
}

#[tokio::main]
async fn main() {
    AppWorld::cucumber()
        .fail_on_skipped()
        .with_default_cli()
        .run("tests/features")
        .await;
}
