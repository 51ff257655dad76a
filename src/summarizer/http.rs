use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use super::{prompt, CollaboratorError, Summarizer};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [Message<'a>; 2],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// Blocking client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    client: Client,
    endpoint: Url,
    model: String,
    api_key: String,
    temperature: f32,
    timeout: Duration,
}

impl ChatCompletionsClient {
    pub fn new(
        endpoint: Url,
        model: impl Into<String>,
        api_key: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building summarizer HTTP client")?;
        Ok(Self {
            client,
            endpoint,
            model: model.into(),
            api_key: api_key.into(),
            temperature,
            timeout,
        })
    }

    fn classify(&self, e: reqwest::Error) -> CollaboratorError {
        if e.is_timeout() {
            CollaboratorError::Timeout(self.timeout)
        } else if let Some(status) = e.status() {
            CollaboratorError::Status(status.as_u16())
        } else if e.is_decode() {
            CollaboratorError::Malformed(e.to_string())
        } else {
            CollaboratorError::Transport(e.to_string())
        }
    }
}

impl Summarizer for ChatCompletionsClient {
    #[instrument(level = "debug", skip_all, fields(model = %self.model))]
    fn summarize(&self, context: &str, question: &str) -> Result<String, CollaboratorError> {
        let user = prompt::user_message(context, question);
        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: [
                Message {
                    role: "system",
                    content: prompt::SYSTEM,
                },
                Message {
                    role: "user",
                    content: &user,
                },
            ],
        };
        debug!(context_bytes = context.len(), "calling summarizer");

        let reply: ChatResponse = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json())
            .map_err(|e| {
                let e = self.classify(e);
                warn!(error = %e, "summarizer call failed");
                e
            })?;

        extract_reply(reply)
    }
}

fn extract_reply(reply: ChatResponse) -> Result<String, CollaboratorError> {
    reply
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| CollaboratorError::Malformed("no message content in reply".into()))
}
