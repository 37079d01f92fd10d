use super::*;
use std::collections::HashMap;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn defaults_match_product_catalog() {
    let config = AppConfig::default();
    assert_eq!(
        config.completion.models,
        vec![
            "meta-llama/Llama-3.3-70B-Instruct-Turbo".to_string(),
            "deepseek-ai/DeepSeek-V3".to_string(),
        ]
    );
    assert_eq!(config.chat.first_questions.len(), 2);
    assert!(config.chat.first_questions[0].starts_with("Tell me about your best day at work"));
    assert_eq!(config.chat.export_file, "chat_history.json");
    assert_eq!(config.template_store.base_url, "https://api.promptlayer.com");
    assert_eq!(config.completion.base_url, "https://api.together.xyz/v1");
    assert_eq!(config.logging.filter, "info");
}

#[test]
fn partial_file_keeps_defaults_for_missing_sections() {
    let config = AppConfig::from_toml_str(
        r#"
        [completion]
        models = ["deepseek-ai/DeepSeek-V3"]
        "#,
        Path::new("ariadna.toml"),
    )
    .expect("partial config should parse");
    assert_eq!(config.completion.models, vec!["deepseek-ai/DeepSeek-V3".to_string()]);
    assert_eq!(config.completion.base_url, "https://api.together.xyz/v1");
    assert_eq!(config.chat.export_file, "chat_history.json");
}

#[test]
fn invalid_toml_names_the_file() {
    let err = AppConfig::from_toml_str("[chat\n", Path::new("broken.toml"))
        .expect_err("should fail");
    assert!(matches!(err, ChatError::ConfigParse { .. }));
    assert!(err.to_string().contains("broken.toml"));
}

#[test]
fn missing_explicit_file_is_an_error() {
    let err = AppConfig::load(Some(Path::new("/definitely/not/here/ariadna.toml")))
        .expect_err("explicit path must exist");
    assert!(matches!(err, ChatError::ConfigRead { .. }));
}

#[test]
fn explicit_file_is_loaded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[chat]\nexport_file = \"dialogue.json\"\n").expect("write config");
    let config = AppConfig::load(Some(&path)).expect("load");
    assert_eq!(config.chat.export_file, "dialogue.json");
}

#[test]
fn secrets_come_from_environment() {
    let secrets = AppConfig::default()
        .secrets_with(env_of(&[
            (PASSWORD_ENV, "secret123"),
            (PROMPTLAYER_KEY_ENV, "pl-key"),
            (TOGETHER_KEY_ENV, "tg-key"),
        ]))
        .expect("all secrets present");
    assert_eq!(secrets.password, "secret123");
    assert_eq!(secrets.promptlayer_api_key, "pl-key");
    assert_eq!(secrets.together_api_key, "tg-key");
    assert!(!format!("{secrets:?}").contains("secret123"));
}

#[test]
fn environment_overrides_secrets_table() {
    let config = AppConfig::from_toml_str(
        r#"
        [secrets]
        password = "from-file"
        promptlayer_api_key = "pl-file"
        together_api_key = "tg-file"
        "#,
        Path::new("ariadna.toml"),
    )
    .expect("parse");
    let secrets = config
        .secrets_with(env_of(&[(PASSWORD_ENV, "from-env"), (TOGETHER_KEY_ENV, "  ")]))
        .expect("resolved");
    assert_eq!(secrets.password, "from-env");
    assert_eq!(secrets.promptlayer_api_key, "pl-file");
    assert_eq!(secrets.together_api_key, "tg-file");
}

#[test]
fn missing_secret_is_fatal_and_named() {
    let err = AppConfig::default()
        .secrets_with(env_of(&[(PASSWORD_ENV, "secret123"), (TOGETHER_KEY_ENV, "tg")]))
        .expect_err("promptlayer key missing");
    match err {
        ChatError::MissingSecret { env_var, key } => {
            assert_eq!(env_var, PROMPTLAYER_KEY_ENV);
            assert_eq!(key, "promptlayer_api_key");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn blank_secret_counts_as_missing() {
    let err = AppConfig::default()
        .secrets_with(env_of(&[
            (PASSWORD_ENV, "   "),
            (PROMPTLAYER_KEY_ENV, "pl"),
            (TOGETHER_KEY_ENV, "tg"),
        ]))
        .expect_err("blank password");
    assert!(err.to_string().contains(PASSWORD_ENV));
}
