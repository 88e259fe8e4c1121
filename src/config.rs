use std::{env, net::SocketAddr};

use crate::error::AppError;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub google_maps_api_key: Option<String>,
    pub cookie_secret: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://waypoint.db".to_string());
        let listen_addr: SocketAddr = env::var("APP_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        let openai_base_url =
            optional_var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
        let openai_model =
            optional_var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());

        let cookie_secret = env::var("COOKIE_SECRET")
            .unwrap_or_else(|_| "change-me-waypoint-cookie-secret".to_string());

        Ok(Self {
            database_url,
            listen_addr,
            supabase_url: optional_var("SUPABASE_URL"),
            supabase_anon_key: optional_var("SUPABASE_ANON_KEY"),
            openai_api_key: optional_var("OPENAI_API_KEY"),
            openai_base_url,
            openai_model,
            google_maps_api_key: optional_var("GOOGLE_MAPS_API_KEY"),
            cookie_secret,
        })
    }
}

/// Unset and blank variables are both treated as absent; the services that
/// need them fail when called instead of at startup.
fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
