//! OpenAI adapter (chat completions).
//!
//! Uses the OpenAI `chat/completions` endpoint: a system message plus the
//! user's text, no streaming.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use relaybot_core::{
    errors::Error,
    model::{
        client::CompletionClient,
        types::{Completion, CompletionRequest, TokenUsage},
    },
    Result,
};

#[derive(Clone, Debug)]
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

impl OpenAiClient {
    /// `base_url` is the API root, e.g. `https://api.openai.com/v1`.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("relaybot/0.1")
            .build()
            .map_err(|e| Error::External(format!("openai client build error: {e}")))?;
        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, req: CompletionRequest) -> Result<Completion> {
        let body = ChatRequest {
            model: &req.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &req.system,
                },
                ChatMessage {
                    role: "user",
                    content: &req.user,
                },
            ],
        };

        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::External(format!("openai request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::External(format!(
                "openai completion failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let v: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| Error::External(format!("openai json error: {e}")))?;

        let completion = parse_completion(&v)?;
        debug!(
            model = %req.model,
            total_tokens = ?completion.usage.map(|u| u.total_tokens),
            "completion received"
        );
        Ok(completion)
    }
}

/// Pull the first choice's text and the optional usage block out of a
/// `chat.completion` response.
fn parse_completion(v: &serde_json::Value) -> Result<Completion> {
    let text = v
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
        .ok_or_else(|| Error::External("openai response has no message content".to_string()))?
        .to_string();

    let usage = v
        .get("usage")
        .filter(|u| !u.is_null())
        .map(|u| serde_json::from_value::<TokenUsage>(u.clone()))
        .transpose()?;

    Ok(Completion { text, usage })
}
