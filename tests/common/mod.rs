#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;
use waypoint::{
    config::{AppConfig, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL},
    db::init_pool,
    error::AppError,
    services::{
        generator::ItineraryGenerator,
        supabase::{AuthService, Credentials},
    },
    state::AppState,
};

/// Auth double: accepts everyone unless told to reject with a body.
#[derive(Default)]
pub struct FakeAuth {
    pub reject_with: Option<Value>,
}

impl FakeAuth {
    pub fn rejecting(body: Value) -> Self {
        Self {
            reject_with: Some(body),
        }
    }

    fn check(&self) -> Result<(), AppError> {
        match &self.reject_with {
            Some(body) => Err(AppError::Upstream(body.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AuthService for FakeAuth {
    async fn sign_up(&self, credentials: &Credentials) -> Result<Value, AppError> {
        self.check()?;
        Ok(json!({
            "user": {"id": "user-1", "email": credentials.email},
            "session": {
                "access_token": "token-1",
                "user": {"id": "user-1", "email": credentials.email}
            }
        }))
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Value, AppError> {
        self.check()?;
        Ok(json!({
            "access_token": "token-1",
            "token_type": "bearer",
            "user": {"id": "user-1", "email": credentials.email}
        }))
    }
}

/// Answers every prompt with the same canned text and counts the calls.
pub struct ScriptedGenerator {
    reply: Result<String, String>,
    pub calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            reply: Err(reason.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ItineraryGenerator for ScriptedGenerator {
    async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(reason) => Err(anyhow::anyhow!(reason.clone())),
        }
    }
}

/// Plans the numbered stops of the prompt in the order they were listed.
pub struct EchoGenerator;

#[async_trait]
impl ItineraryGenerator for EchoGenerator {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let entries: Vec<Value> = prompt
            .lines()
            .filter_map(|line| {
                let (number, stop) = line.split_once(". ")?;
                let order: u32 = number.parse().ok()?;
                Some(json!({
                    "stop": stop,
                    "order": order,
                    "time": format!("{:02}:00", 8 + order),
                    "notes": format!("Explore {stop}"),
                }))
            })
            .collect();
        Ok(json!({ "itinerary": entries }).to_string())
    }
}

pub struct TestApp {
    pub state: AppState,
    _root: TempDir,
}

impl TestApp {
    pub async fn new(
        auth: Arc<dyn AuthService>,
        generator: Arc<dyn ItineraryGenerator>,
    ) -> anyhow::Result<Self> {
        let root = TempDir::new().context("create temp dir for test app")?;
        let db_path = root.path().join("waypoint.sqlite");
        let database_url = format!("sqlite://{}", db_path.to_string_lossy());

        let config = AppConfig {
            database_url: database_url.clone(),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            supabase_url: None,
            supabase_anon_key: None,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.into(),
            openai_model: DEFAULT_OPENAI_MODEL.into(),
            google_maps_api_key: Some("maps-test-key".into()),
            cookie_secret: "test-cookie-secret".into(),
        };

        let db = init_pool(&config.database_url).await?;
        sqlx::migrate!("./migrations").run(&db).await?;

        let state = AppState::new(config, db, auth, generator);
        Ok(Self { state, _root: root })
    }

    pub async fn with_generator(generator: Arc<dyn ItineraryGenerator>) -> Self {
        Self::new(Arc::new(FakeAuth::default()), generator)
            .await
            .expect("test app")
    }
}
