use serde::Deserialize;

use crate::error::{ChatError, Result};
use crate::session::{PromptLibrary, PromptTemplate, SessionState, TemplateCategory};

const SERVICE: &str = "template store";

/// Templates every session needs, in the order they are fetched and listed.
pub const REQUIRED_TEMPLATES: [(TemplateCategory, &str); 4] = [
    (TemplateCategory::Chat, "side chat"),
    (TemplateCategory::Chat, "main chat"),
    (TemplateCategory::Chat, "side chat relaxed"),
    (TemplateCategory::Insight, "formulate insight from dialogue"),
];

pub trait TemplateStore {
    fn fetch(&self, name: &str) -> Result<PromptTemplate>;
}

/// Fetches every required template. Any single failure aborts the load; there
/// is no partial library.
pub fn load_prompts(store: &dyn TemplateStore) -> Result<PromptLibrary> {
    let mut library = PromptLibrary::default();
    for (category, name) in REQUIRED_TEMPLATES {
        let template = store.fetch(name)?;
        tracing::info!(%category, name, chars = template.content.len(), "loaded prompt template");
        library.insert(category, template);
    }
    Ok(library)
}

/// Loads templates into the session the first time only.
pub fn ensure_loaded(state: &mut SessionState, store: &dyn TemplateStore) -> Result<bool> {
    if state.templates.is_some() {
        return Ok(false);
    }
    state.templates = Some(load_prompts(store)?);
    Ok(true)
}

pub struct PromptLayerStore {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
}

impl PromptLayerStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn template_url(&self, name: &str) -> String {
        format!(
            "{}/prompt-templates/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(name)
        )
    }
}

impl TemplateStore for PromptLayerStore {
    fn fetch(&self, name: &str) -> Result<PromptTemplate> {
        let url = self.template_url(name);
        tracing::debug!(%url, "fetching prompt template");
        let response = self
            .agent
            .post(&url)
            .header("X-API-KEY", self.api_key.as_str())
            .send_json(serde_json::json!({}))
            .map_err(|err| match err {
                ureq::Error::StatusCode(404) => ChatError::TemplateMissing {
                    name: name.to_string(),
                },
                source => ChatError::Http {
                    service: SERVICE,
                    source,
                },
            })?;
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|source| ChatError::Http {
                service: SERVICE,
                source,
            })?;
        parse_template_response(name, &body)
    }
}

#[derive(Debug, Deserialize)]
struct TemplateResponse {
    success: Option<bool>,
    prompt_template: Option<TemplateBody>,
}

#[derive(Debug, Deserialize)]
struct TemplateBody {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

/// Validates the store's response down to `prompt_template.content[0].text`.
pub fn parse_template_response(name: &str, body: &str) -> Result<PromptTemplate> {
    let shape_error = |reason: String| ChatError::TemplateShape {
        name: name.to_string(),
        reason,
    };
    let response: TemplateResponse =
        serde_json::from_str(body).map_err(|err| shape_error(format!("invalid JSON: {err}")))?;
    if response.success == Some(false) {
        return Err(ChatError::TemplateMissing {
            name: name.to_string(),
        });
    }
    let template = response
        .prompt_template
        .ok_or_else(|| shape_error("missing `prompt_template`".to_string()))?;
    let first = template
        .content
        .into_iter()
        .next()
        .ok_or_else(|| shape_error("`prompt_template.content` is empty".to_string()))?;
    let text = first
        .text
        .ok_or_else(|| shape_error("`prompt_template.content[0]` has no `text`".to_string()))?;
    Ok(PromptTemplate {
        name: name.to_string(),
        content: text,
    })
}

#[cfg(test)]
#[path = "../tests/unit/templates_tests.rs"]
mod tests;
