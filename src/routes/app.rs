use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{
    auth::{self, CurrentSession},
    error::{AppError, GENERATION_FAILED},
    models::{
        itinerary::{ItineraryEntry, PlanRequest},
        session::Session,
        stop::Stop,
        trip::{Trip, TripDraft},
    },
    services::supabase::{upstream_message, Credentials},
    state::AppState,
};

const LOGIN_PATH: &str = "/app/login";
const DASHBOARD_PATH: &str = "/app/dashboard";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/login", get(login_form).post(login_submit))
        .route("/signup", get(signup_form).post(signup_submit))
        .route("/logout", post(logout))
        .route("/dashboard", get(dashboard))
        .route("/trips", post(trip_submit))
        .route("/trips/:id/map", get(map_page))
        .route("/itinerary", get(itinerary_form).post(itinerary_submit))
}

async fn home(current: CurrentSession) -> Redirect {
    if current.0.is_some() {
        Redirect::to(DASHBOARD_PATH)
    } else {
        Redirect::to(LOGIN_PATH)
    }
}

#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginTemplate {
    show_error: bool,
    error_message: String,
    email: String,
}

#[derive(Template)]
#[template(path = "auth/signup.html")]
struct SignupTemplate {
    show_error: bool,
    error_message: String,
    email: String,
}

#[derive(Clone, Copy)]
enum AuthPage {
    Login,
    Signup,
}

async fn login_form() -> impl IntoResponse {
    AskamaTemplateResponse::into_response(LoginTemplate {
        show_error: false,
        error_message: String::new(),
        email: String::new(),
    })
}

async fn signup_form() -> impl IntoResponse {
    AskamaTemplateResponse::into_response(SignupTemplate {
        show_error: false,
        error_message: String::new(),
        email: String::new(),
    })
}

async fn login_submit(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<Credentials>,
) -> Result<Response, AppError> {
    submit_credentials(&state, jar, form, AuthPage::Login).await
}

async fn signup_submit(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<Credentials>,
) -> Result<Response, AppError> {
    submit_credentials(&state, jar, form, AuthPage::Signup).await
}

async fn submit_credentials(
    state: &AppState,
    jar: PrivateCookieJar,
    form: Credentials,
    page: AuthPage,
) -> Result<Response, AppError> {
    if form.email.trim().is_empty() || form.password.is_empty() {
        return Ok(render_auth_error(
            page,
            form.email,
            "Please enter an email and password".into(),
        ));
    }

    let result = match page {
        AuthPage::Login => state.auth.sign_in(&form).await,
        AuthPage::Signup => state.auth.sign_up(&form).await,
    };

    match result {
        Ok(payload) => {
            let session = Session::from_auth_payload(&payload, &form.email);
            Ok((
                auth::apply_session_cookie(jar, &session)?,
                Redirect::to(DASHBOARD_PATH),
            )
                .into_response())
        }
        Err(AppError::Upstream(body)) => {
            let prefix = match page {
                AuthPage::Login => "Login failed",
                AuthPage::Signup => "Signup failed",
            };
            let message = format!("{prefix}: {}", upstream_message(&body));
            Ok(render_auth_error(page, form.email, message))
        }
        Err(err) => Err(err),
    }
}

fn render_auth_error(page: AuthPage, email: String, message: String) -> Response {
    let body = match page {
        AuthPage::Login => AskamaTemplateResponse::into_response(LoginTemplate {
            show_error: true,
            error_message: message,
            email,
        }),
        AuthPage::Signup => AskamaTemplateResponse::into_response(SignupTemplate {
            show_error: true,
            error_message: message,
            email,
        }),
    };
    (StatusCode::BAD_REQUEST, body).into_response()
}

async fn logout(jar: PrivateCookieJar) -> (PrivateCookieJar, Redirect) {
    (auth::clear_session_cookie(jar), Redirect::to(LOGIN_PATH))
}

#[derive(Template)]
#[template(path = "app/dashboard.html")]
struct DashboardTemplate {
    email: String,
    trips: Vec<Trip>,
    show_error: bool,
    error_message: String,
    draft: DraftFields,
}

#[derive(Clone, Default)]
struct DraftFields {
    title: String,
    destination: String,
    start_date: String,
    end_date: String,
}

impl From<&TripDraft> for DraftFields {
    fn from(draft: &TripDraft) -> Self {
        Self {
            title: draft.title.clone().unwrap_or_default(),
            destination: draft.destination.clone().unwrap_or_default(),
            start_date: draft.start_date.clone().unwrap_or_default(),
            end_date: draft.end_date.clone().unwrap_or_default(),
        }
    }
}

async fn dashboard(
    State(state): State<AppState>,
    current: CurrentSession,
) -> Result<Response, AppError> {
    let Ok(session) = current.require() else {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    };
    let trips = state.trips.list_trips().await?;
    Ok(AskamaTemplateResponse::into_response(DashboardTemplate {
        email: session.email.clone(),
        trips,
        show_error: false,
        error_message: String::new(),
        draft: DraftFields::default(),
    }))
}

async fn trip_submit(
    State(state): State<AppState>,
    current: CurrentSession,
    Form(mut draft): Form<TripDraft>,
) -> Result<Response, AppError> {
    let Ok(session) = current.require() else {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    };
    draft.user_id = session.user_id.clone();
    let fields = DraftFields::from(&draft);

    let failure = match draft.validate() {
        Ok(new_trip) => match state.trips.insert_trip(new_trip).await {
            Ok(trip) => {
                return Ok(Redirect::to(&format!("/app/trips/{}/map", trip.id)).into_response())
            }
            Err(err) => {
                warn!("trip insert from dashboard failed: {err}");
                format!("Error adding trip: {err}")
            }
        },
        Err(_) => "Please fill out all fields".to_string(),
    };

    let trips = state.trips.list_trips().await?;
    Ok((
        StatusCode::BAD_REQUEST,
        AskamaTemplateResponse::into_response(DashboardTemplate {
            email: session.email.clone(),
            trips,
            show_error: true,
            error_message: failure,
            draft: fields,
        }),
    )
        .into_response())
}

#[derive(Template)]
#[template(path = "app/map.html")]
struct MapTemplate {
    trip: Trip,
    stops: Vec<Stop>,
    trip_json: String,
    stops_json: String,
    has_maps_key: bool,
    maps_api_key: String,
}

async fn map_page(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let trip = state
        .trips
        .find_trip(&trip_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let stops = state.trips.list_stops(&trip.id).await?;
    let maps_api_key = state.config.google_maps_api_key.clone().unwrap_or_default();

    Ok(AskamaTemplateResponse::into_response(MapTemplate {
        trip_json: script_json(&trip)?,
        stops_json: script_json(&stops)?,
        trip,
        stops,
        has_maps_key: !maps_api_key.is_empty(),
        maps_api_key,
    }))
}

/// JSON safe to inline in a `<script>` element.
fn script_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    let raw = serde_json::to_string(value).map_err(|err| AppError::Other(err.into()))?;
    Ok(raw.replace('<', "\\u003c"))
}

#[derive(Template)]
#[template(path = "app/itinerary.html")]
struct ItineraryTemplate {
    stops_text: String,
    show_modal: bool,
    entries: Vec<EntryView>,
    show_error: bool,
    error_message: String,
}

struct EntryView {
    order: u32,
    stop: String,
    time: String,
    notes: String,
}

impl From<ItineraryEntry> for EntryView {
    fn from(entry: ItineraryEntry) -> Self {
        Self {
            order: entry.order,
            stop: entry.stop,
            time: entry.time,
            notes: entry
                .notes
                .filter(|notes| !notes.trim().is_empty())
                .unwrap_or_else(|| "No activities suggested.".into()),
        }
    }
}

impl ItineraryTemplate {
    fn blank(stops_text: String) -> Self {
        Self {
            stops_text,
            show_modal: false,
            entries: Vec::new(),
            show_error: false,
            error_message: String::new(),
        }
    }
}

async fn itinerary_form() -> impl IntoResponse {
    AskamaTemplateResponse::into_response(ItineraryTemplate::blank(String::new()))
}

#[derive(Deserialize)]
struct ItineraryForm {
    #[serde(default)]
    stops_text: String,
}

async fn itinerary_submit(
    State(state): State<AppState>,
    Form(form): Form<ItineraryForm>,
) -> Response {
    if form.stops_text.trim().is_empty() {
        return AskamaTemplateResponse::into_response(ItineraryTemplate::blank(form.stops_text));
    }

    let request = PlanRequest::from_text(form.stops_text.clone());
    match state.planner.generate(&request).await {
        Ok(itinerary) => AskamaTemplateResponse::into_response(ItineraryTemplate {
            stops_text: form.stops_text,
            show_modal: true,
            entries: itinerary.itinerary.into_iter().map(EntryView::from).collect(),
            show_error: false,
            error_message: String::new(),
        }),
        Err(err) => {
            let status = err.status();
            let message = match err {
                AppError::Generation(detail) => {
                    error!(%detail, "itinerary generation failed");
                    GENERATION_FAILED.to_string()
                }
                other => other.to_string(),
            };
            let mut page = ItineraryTemplate::blank(form.stops_text);
            page.show_error = true;
            page.error_message = message;
            (status, AskamaTemplateResponse::into_response(page)).into_response()
        }
    }
}
