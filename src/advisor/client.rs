//! A thin client for an OpenAI compatible chat completions API.

use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Settings for the language model client.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// The API root, e.g. "https://api.openai.com/v1/".
    pub base_url: String,
    /// The bearer token. The advisor is disabled without one.
    pub api_key: Option<String>,
    /// The model name, e.g. "gpt-4o-mini".
    pub model: String,
    /// How long to wait for a reply.
    pub timeout: Duration,
}

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions for the model.
    System,
    /// The question.
    User,
    /// The model's reply.
    Assistant,
}

/// One message in a chat completion request or reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who wrote the message.
    pub role: Role,
    /// The text.
    pub content: String,
}

impl ChatMessage {
    /// A system instruction.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Sends chat completion requests to the configured model.
#[derive(Debug, Clone)]
pub struct LanguageModelClient {
    base_url: Url,
    api_key: String,
    model: String,
    http: reqwest::Client,
}

impl LanguageModelClient {
    /// Create a client from `config`.
    ///
    /// Returns `Ok(None)` when no API key is configured.
    ///
    /// # Errors
    /// Returns [Error::AiUnavailable] if the base URL is invalid or the HTTP
    /// client could not be built.
    pub fn from_config(config: &AiConfig) -> Result<Option<Self>, Error> {
        let Some(api_key) = config.api_key.as_ref().filter(|key| !key.trim().is_empty()) else {
            return Ok(None);
        };

        // Without the trailing slash `join` would replace the last path segment.
        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        let base_url = Url::parse(&base_url)
            .map_err(|error| Error::AiUnavailable(format!("invalid base URL: {error}")))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| Error::AiUnavailable(format!("could not build HTTP client: {error}")))?;

        Ok(Some(Self {
            base_url,
            api_key: api_key.to_owned(),
            model: config.model.clone(),
            http,
        }))
    }

    /// Send `messages` and return the text of the first reply.
    ///
    /// # Errors
    /// Returns [Error::AiUnavailable] if the request fails or the API responds
    /// with an error status, and [Error::AiResponseInvalid] if the reply is
    /// not a chat completion.
    pub async fn chat(&self, messages: &[ChatMessage], temperature: f32) -> Result<String, Error> {
        let endpoint = self
            .base_url
            .join("chat/completions")
            .map_err(|error| Error::AiUnavailable(format!("invalid base URL: {error}")))?;

        let payload = ChatRequest {
            model: &self.model,
            messages,
            temperature,
        };

        let response = self
            .http
            .post(endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| Error::AiUnavailable(error.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_else(|_| "unknown error".to_owned());

            return Err(Error::AiUnavailable(format!("{status}: {message}")));
        }

        let body = response
            .json::<ChatResponse>()
            .await
            .map_err(|error| Error::AiResponseInvalid(error.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::AiResponseInvalid("the reply has no choices".to_owned()))
    }
}
