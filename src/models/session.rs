use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The slice of an auth-service session the browser views keep in their
/// cookie. The full payload is only ever relayed, never interpreted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub access_token: Option<String>,
    pub user_id: Option<String>,
    pub email: String,
}

impl Session {
    /// Signup answers with `{user, session}` while password login answers
    /// with the session object itself; both shapes are read here.
    pub fn from_auth_payload(payload: &Value, email: &str) -> Self {
        let session = payload
            .get("session")
            .filter(|value| value.is_object())
            .unwrap_or(payload);
        let user = session
            .get("user")
            .or_else(|| payload.get("user"))
            .filter(|value| value.is_object());

        let user_id = user
            .and_then(|u| u.get("id"))
            .or_else(|| payload.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let email = user
            .and_then(|u| u.get("email"))
            .and_then(Value::as_str)
            .unwrap_or(email)
            .to_string();

        Self {
            access_token: session
                .get("access_token")
                .and_then(Value::as_str)
                .map(str::to_string),
            user_id,
            email,
        }
    }
}
