use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info};
use url::Url;

use crate::config::Config;
use crate::error::{BotError, Result};

/// A stateful chat endpoint: every `send` sees all turns exchanged before it.
#[async_trait]
pub trait ChatOracle: Send {
    async fn send(&mut self, text: &str) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl Content {
    fn user(text: &str) -> Self {
        Self::new("user", text)
    }

    fn model(text: &str) -> Self {
        Self::new("model", text)
    }

    fn new(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini `generateContent` client holding one chat session.
///
/// The session is primed with the system prompt on the first `send`. A user
/// message only joins the session together with the reply it produced.
pub struct GeminiClient {
    api_key: Option<String>,
    endpoint: String,
    system_prompt: String,
    client: reqwest::Client,
    session: Vec<Content>,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.api_base.trim_end_matches('/'),
            config.model
        );

        Self {
            api_key: config.api_key.clone(),
            endpoint,
            system_prompt: config.system_prompt.clone(),
            client: reqwest::Client::new(),
            session: Vec::new(),
        }
    }

    fn is_primed(&self) -> bool {
        !self.session.is_empty()
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                BotError::Authentication("GEMINI_API_KEY environment variable not set".to_string())
            })
    }

    /// Endpoint URL. The key travels in a header so it never shows up in
    /// error messages that quote the URL.
    fn request_url(&self) -> Result<Url> {
        Url::parse(&self.endpoint)
            .map_err(|e| BotError::OracleUnavailable(format!("Invalid API endpoint {}: {}", self.endpoint, e)))
    }

    fn request_body(&self, pending: &[Content]) -> serde_json::Value {
        let contents: Vec<&Content> = self.session.iter().chain(pending).collect();

        json!({
            "contents": contents,
            "generationConfig": {
                "temperature": 0.7,
                "topP": 0.9,
                "topK": 40,
                "maxOutputTokens": 1024
            }
        })
    }

    async fn generate(&self, pending: &[Content]) -> Result<String> {
        let api_key = self.api_key()?;
        let url = self.request_url()?;
        let body = self.request_body(pending);

        debug!(
            "Sending {} turn(s) to {}",
            self.session.len() + pending.len(),
            self.endpoint
        );

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API request failed with status {}: {}", status, error_text);
            return Err(classify_failure(status, &error_text));
        }

        let response: GenerateContentResponse = response.json().await?;
        debug!("Received response with {} candidate(s)", response.candidates.len());

        reply_text(response)
    }

    async fn prime(&mut self) -> Result<()> {
        let prompt = Content::user(&self.system_prompt);
        let ack = self.generate(std::slice::from_ref(&prompt)).await?;

        info!("Chat session primed with system prompt");
        debug!("System prompt acknowledgement: {}", ack);

        self.session.push(prompt);
        self.session.push(Content::model(&ack));
        Ok(())
    }
}

#[async_trait]
impl ChatOracle for GeminiClient {
    async fn send(&mut self, text: &str) -> Result<String> {
        if !self.is_primed() {
            self.prime().await?;
        }

        let message = Content::user(text);
        let reply = self.generate(std::slice::from_ref(&message)).await?;

        self.session.push(message);
        self.session.push(Content::model(&reply));
        Ok(reply)
    }
}

fn classify_failure(status: StatusCode, body: &str) -> BotError {
    let bad_key = body.contains("API_KEY_INVALID") || body.contains("API key not valid");

    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || (status == StatusCode::BAD_REQUEST && bad_key)
    {
        BotError::Authentication(format!("{}: {}", status, body))
    } else {
        BotError::OracleUnavailable(format!("API request failed ({}): {}", status, body))
    }
}

fn reply_text(response: GenerateContentResponse) -> Result<String> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(BotError::OracleUnavailable(
            "response contained no candidates".to_string(),
        ));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
        return Err(BotError::OracleUnavailable(format!(
            "response contained no text (finish reason: {})",
            reason
        )));
    }

    Ok(text)
}
