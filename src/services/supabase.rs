use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use crate::error::AppError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Account creation and password login, both delegated to a hosted
/// service. Implementations return the service payload untouched and
/// report rejections as [`AppError::Upstream`] carrying the service body.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_up(&self, credentials: &Credentials) -> Result<Value, AppError>;

    async fn sign_in(&self, credentials: &Credentials) -> Result<Value, AppError>;
}

/// Supabase GoTrue over its REST API.
#[derive(Clone)]
pub struct SupabaseAuth {
    client: Client,
    base_url: Option<Url>,
    anon_key: Option<String>,
}

impl SupabaseAuth {
    pub fn new(base_url: Option<&str>, anon_key: Option<String>) -> Result<Self, AppError> {
        let base_url = base_url
            .map(|raw| {
                let mut url = Url::parse(raw)
                    .map_err(|err| AppError::Config(format!("invalid SUPABASE_URL: {err}")))?;
                if !url.path().ends_with('/') {
                    let path = format!("{}/", url.path());
                    url.set_path(&path);
                }
                Ok::<_, AppError>(url)
            })
            .transpose()?;

        Ok(Self {
            client: Client::new(),
            base_url,
            anon_key,
        })
    }

    async fn post(&self, path: &str, credentials: &Credentials) -> Result<Value, AppError> {
        let (Some(base_url), Some(anon_key)) = (self.base_url.as_ref(), self.anon_key.as_deref())
        else {
            return Err(AppError::Config(
                "SUPABASE_URL and SUPABASE_ANON_KEY must be set".into(),
            ));
        };
        let endpoint = base_url
            .join(path)
            .map_err(|err| AppError::Config(format!("invalid auth endpoint: {err}")))?;
        debug!(%endpoint, "calling auth service");

        let response = self
            .client
            .post(endpoint)
            .header("apikey", anon_key)
            .bearer_auth(anon_key)
            .json(credentials)
            .send()
            .await
            .map_err(|err| {
                warn!("auth service unreachable: {err}");
                AppError::Upstream(json!({ "message": err.to_string() }))
            })?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|err| AppError::Upstream(json!({ "message": err.to_string() })))?;
        let body =
            serde_json::from_str::<Value>(&raw).unwrap_or_else(|_| json!({ "message": raw }));

        if status.is_success() {
            Ok(body)
        } else {
            warn!(%status, "auth service rejected request");
            Err(AppError::Upstream(body))
        }
    }
}

#[async_trait]
impl AuthService for SupabaseAuth {
    async fn sign_up(&self, credentials: &Credentials) -> Result<Value, AppError> {
        self.post("auth/v1/signup", credentials).await
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Value, AppError> {
        self.post("auth/v1/token?grant_type=password", credentials).await
    }
}

/// Pulls a human-readable message out of an auth-service error body.
pub fn upstream_message(body: &Value) -> String {
    ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| "Unknown error".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let auth = SupabaseAuth::new(Some("https://abc.supabase.co/proxy"), None).unwrap();
        let url = auth.base_url.unwrap().join("auth/v1/signup").unwrap();
        assert_eq!(url.as_str(), "https://abc.supabase.co/proxy/auth/v1/signup");
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        assert!(matches!(
            SupabaseAuth::new(Some("not a url"), None),
            Err(AppError::Config(_))
        ));
    }

    #[tokio::test]
    async fn missing_configuration_fails_at_call_time() {
        let auth = SupabaseAuth::new(None, None).unwrap();
        let err = auth.sign_in(&Credentials::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn picks_first_known_message_key() {
        assert_eq!(
            upstream_message(&json!({"code": 400, "msg": "Invalid login credentials"})),
            "Invalid login credentials"
        );
        assert_eq!(
            upstream_message(&json!({"error": "invalid_grant", "error_description": "bad"})),
            "bad"
        );
        assert_eq!(upstream_message(&json!({})), "Unknown error");
    }
}
