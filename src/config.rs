use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ChatError, Result};
use crate::export::DEFAULT_EXPORT_FILE;

pub const DEFAULT_CONFIG_FILE: &str = "ariadna.toml";
pub const PASSWORD_ENV: &str = "ARIADNA_PASSWORD";
pub const PROMPTLAYER_KEY_ENV: &str = "PROMPTLAYER_API_KEY";
pub const TOGETHER_KEY_ENV: &str = "TOGETHER_API_KEY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub template_store: TemplateStoreConfig,
    pub completion: CompletionConfig,
    pub chat: ChatConfig,
    pub logging: LoggingConfig,
    secrets: SecretsFile,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TemplateStoreConfig {
    pub base_url: String,
}

impl Default for TemplateStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.promptlayer.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub base_url: String,
    pub models: Vec<String>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.together.xyz/v1".to_string(),
            models: vec![
                "meta-llama/Llama-3.3-70B-Instruct-Turbo".to_string(),
                "deepseek-ai/DeepSeek-V3".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub first_questions: Vec<String>,
    pub export_file: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            first_questions: vec![
                "Tell me about your best day at work – not the most successful, but the one that felt most natural and energizing.".to_string(),
                "When was the last time you were so absorbed in something you forgot to eat?".to_string(),
            ],
            export_file: DEFAULT_EXPORT_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: PathBuf,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("ariadna-chat.log"),
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct SecretsFile {
    password: Option<String>,
    promptlayer_api_key: Option<String>,
    together_api_key: Option<String>,
}

#[derive(Clone)]
pub struct Secrets {
    pub password: String,
    pub promptlayer_api_key: String,
    pub together_api_key: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secrets { .. }")
    }
}

impl AppConfig {
    /// Reads `explicit` when given (it must exist), otherwise the default
    /// file in the working directory if present, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        match fs::read_to_string(&path) {
            Ok(text) => Self::from_toml_str(&text, &path),
            Err(err) if err.kind() == io::ErrorKind::NotFound && !required => Ok(Self::default()),
            Err(source) => Err(ChatError::ConfigRead { path, source }),
        }
    }

    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| ChatError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn secrets(&self) -> Result<Secrets> {
        self.secrets_with(|name| env::var(name).ok())
    }

    /// Resolves each secret from `lookup` first, then the `[secrets]` table.
    /// Blank values count as missing.
    pub fn secrets_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<Secrets> {
        let present = |value: &String| !value.trim().is_empty();
        let resolve = |env_var: &'static str, key: &'static str, file: &Option<String>| {
            lookup(env_var)
                .filter(present)
                .or_else(|| file.clone().filter(present))
                .ok_or(ChatError::MissingSecret { env_var, key })
        };
        Ok(Secrets {
            password: resolve(PASSWORD_ENV, "password", &self.secrets.password)?,
            promptlayer_api_key: resolve(
                PROMPTLAYER_KEY_ENV,
                "promptlayer_api_key",
                &self.secrets.promptlayer_api_key,
            )?,
            together_api_key: resolve(
                TOGETHER_KEY_ENV,
                "together_api_key",
                &self.secrets.together_api_key,
            )?,
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/config_tests.rs"]
mod tests;
