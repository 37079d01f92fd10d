use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::session::TemplateCategory;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("failed to read config file '{path}': {source}")]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("failed to parse config file '{path}': {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("missing secret: set {env_var} or `{key}` under [secrets]")]
    MissingSecret {
        env_var: &'static str,
        key: &'static str,
    },

    #[error("prompt template '{name}' was not found in the template store")]
    TemplateMissing { name: String },

    #[error("prompt template '{name}' has an unexpected shape: {reason}")]
    TemplateShape { name: String, reason: String },

    #[error("{service} request failed: {source}")]
    Http {
        service: &'static str,
        source: ureq::Error,
    },

    #[error("completion response for model '{model}' contained no message content")]
    EmptyCompletion { model: String },

    #[error("no {category} prompt named '{name}' is loaded")]
    UnknownPrompt {
        category: TemplateCategory,
        name: String,
    },

    #[error("prompt templates have not been loaded for this session")]
    TemplatesNotLoaded,

    #[error("failed to write dialogue to '{path}': {source}")]
    Export { path: PathBuf, source: io::Error },

    #[error("failed to serialize dialogue: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to initialize logging: {0}")]
    Logging(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ChatError>;
