//! Language-model completion clients used to synthesise itineraries.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const SYSTEM_PROMPT: &str =
    "You are a travel planner. You answer with a single JSON object and nothing else.";

/// A hosted completion endpoint. Implementations return the raw text of
/// the model's answer; interpreting it is the caller's business.
#[async_trait]
pub trait ItineraryGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// OpenAI-compatible `/chat/completions` client. No timeout is set: a hung
/// upstream only blocks the request that issued it.
#[derive(Clone)]
pub struct OpenAiGenerator {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[async_trait]
impl ItineraryGenerator for OpenAiGenerator {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .context("OPENAI_API_KEY is not configured")?;

        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        debug!(model = %self.model, "requesting completion");
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .context("completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("completion endpoint answered {status}: {body}");
        }

        let completion: ChatResponse = response
            .json()
            .await
            .context("completion response was not the expected shape")?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("completion contained no message content")
    }
}
