use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};
use crate::session::{Message, Role};

const SERVICE: &str = "completion service";

pub const TEMPERATURE: f32 = 0.7;
pub const TOP_P: f32 = 0.7;
pub const TOP_K: u32 = 50;
pub const MAX_TOKENS: u32 = 1500;

pub trait CompletionClient {
    /// Returns the first choice's text for `history` under `system_prompt`.
    /// The caller's history is never modified.
    fn complete(&self, history: &[Message], model: &str, system_prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<WireMessage<'a>>,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WireMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

impl<'a> CompletionRequest<'a> {
    /// Builds the request body with the system prompt prepended.
    pub fn new(history: &'a [Message], model: &'a str, system_prompt: &'a str) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(WireMessage {
            role: Role::System.as_str(),
            content: system_prompt,
        });
        messages.extend(history.iter().map(|message| WireMessage {
            role: message.role.as_str(),
            content: message.content.as_str(),
        }));
        Self {
            model,
            messages,
            temperature: TEMPERATURE,
            top_k: TOP_K,
            top_p: TOP_P,
            max_tokens: MAX_TOKENS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Pulls the first choice's text out of an OpenAI-style response body.
pub fn parse_completion_response(model: &str, body: &str) -> Result<String> {
    let response: CompletionResponse = serde_json::from_str(body)?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| ChatError::EmptyCompletion {
            model: model.to_string(),
        })
}

/// Chat completions against the Together inference API.
pub struct TogetherClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
}

impl TogetherClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl CompletionClient for TogetherClient {
    fn complete(&self, history: &[Message], model: &str, system_prompt: &str) -> Result<String> {
        let request = CompletionRequest::new(history, model, system_prompt);
        tracing::info!(model, messages = request.messages.len(), "requesting completion");
        let http_error = |source| ChatError::Http {
            service: SERVICE,
            source,
        };
        let response = self
            .agent
            .post(&self.completions_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
            .send_json(&request)
            .map_err(http_error)?;
        let body = response.into_body().read_to_string().map_err(http_error)?;
        let text = parse_completion_response(model, &body)?;
        tracing::info!(model, reply_chars = text.len(), "completion received");
        Ok(text)
    }
}


#[cfg(test)]
#[path = "../tests/unit/completion_tests.rs"]
mod tests;
