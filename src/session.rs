use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Insight,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Insight => "insight",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateCategory {
    Chat,
    Insight,
}

impl fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateCategory::Chat => f.write_str("chat"),
            TemplateCategory::Insight => f.write_str("insight"),
        }
    }
}

/// Prompt templates for one session, grouped by category.
///
/// Each category keeps its templates in load order so selectors list them
/// the way the store was queried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptLibrary {
    chat: Vec<PromptTemplate>,
    insight: Vec<PromptTemplate>,
}

impl PromptLibrary {
    pub fn insert(&mut self, category: TemplateCategory, template: PromptTemplate) {
        let entries = self.entries_mut(category);
        match entries.iter_mut().find(|t| t.name == template.name) {
            Some(existing) => *existing = template,
            None => entries.push(template),
        }
    }

    pub fn get(&self, category: TemplateCategory, name: &str) -> Option<&PromptTemplate> {
        self.entries(category).iter().find(|t| t.name == name)
    }

    pub fn names(&self, category: TemplateCategory) -> Vec<&str> {
        self.entries(category)
            .iter()
            .map(|t| t.name.as_str())
            .collect()
    }

    pub fn template_text(&self, category: TemplateCategory, name: &str) -> Result<&str> {
        self.get(category, name)
            .map(|t| t.content.as_str())
            .ok_or_else(|| ChatError::UnknownPrompt {
                category,
                name: name.to_string(),
            })
    }

    fn entries(&self, category: TemplateCategory) -> &[PromptTemplate] {
        match category {
            TemplateCategory::Chat => &self.chat,
            TemplateCategory::Insight => &self.insight,
        }
    }

    fn entries_mut(&mut self, category: TemplateCategory) -> &mut Vec<PromptTemplate> {
        match category {
            TemplateCategory::Chat => &mut self.chat,
            TemplateCategory::Insight => &mut self.insight,
        }
    }
}

/// Everything one user session reads and writes. Created empty at session
/// start and dropped when the session ends.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub authenticated: bool,
    pub templates: Option<PromptLibrary>,
    pub messages: Vec<Message>,
    pub chat_started: bool,
    pub first_question_asked: bool,
    pub selected_chat_model: String,
    pub selected_insight_model: String,
    pub selected_chat_prompt: String,
    pub selected_insight_prompt: String,
    pub selected_first_question: String,
    pub last_insight: Option<String>,
}

impl SessionState {
    pub fn templates(&self) -> Result<&PromptLibrary> {
        self.templates.as_ref().ok_or(ChatError::TemplatesNotLoaded)
    }
}

/// Single shared-secret check in front of the rest of the session.
#[derive(Clone)]
pub struct CredentialGate {
    secret: String,
}

impl fmt::Debug for CredentialGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialGate").finish_non_exhaustive()
    }
}

impl CredentialGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Opens the gate for the rest of the session on a match. A mismatch
    /// leaves the state untouched; attempts are not counted.
    pub fn authenticate(&self, state: &mut SessionState, candidate: &str) -> bool {
        if candidate != self.secret {
            tracing::warn!("authentication attempt rejected");
            return false;
        }
        if !state.authenticated {
            tracing::info!("session authenticated");
        }
        state.authenticated = true;
        true
    }
}
