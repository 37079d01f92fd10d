use super::*;
use crate::test_support::MockServer;
use axum::http::StatusCode;
use std::cell::RefCell;
use std::collections::HashMap;

const TEMPLATE_BODY: &str = r#"{
    "id": 12,
    "prompt_name": "side chat",
    "prompt_template": {
        "type": "completion",
        "content": [{"type": "text", "text": "You are Ariadna, a warm interviewer."}]
    }
}"#;

struct MapStore {
    templates: HashMap<&'static str, &'static str>,
    fetched: RefCell<Vec<String>>,
}

impl MapStore {
    fn complete() -> Self {
        let templates = REQUIRED_TEMPLATES
            .iter()
            .map(|(_, name)| (*name, "template text"))
            .collect();
        Self {
            templates,
            fetched: RefCell::new(Vec::new()),
        }
    }
}

impl TemplateStore for MapStore {
    fn fetch(&self, name: &str) -> Result<PromptTemplate> {
        self.fetched.borrow_mut().push(name.to_string());
        self.templates
            .get(name)
            .map(|text| PromptTemplate {
                name: name.to_string(),
                content: format!("{text}: {name}"),
            })
            .ok_or_else(|| ChatError::TemplateMissing {
                name: name.to_string(),
            })
    }
}

#[test]
fn parses_first_content_block_text() {
    let template = parse_template_response("side chat", TEMPLATE_BODY).expect("valid body");
    assert_eq!(template.name, "side chat");
    assert_eq!(template.content, "You are Ariadna, a warm interviewer.");
}

#[test]
fn rejects_missing_prompt_template() {
    let err = parse_template_response("main chat", r#"{"id": 1}"#).expect_err("shape");
    assert!(matches!(err, ChatError::TemplateShape { .. }));
    assert!(err.to_string().contains("main chat"));
    assert!(err.to_string().contains("prompt_template"));
}

#[test]
fn rejects_empty_content_list() {
    let err = parse_template_response("main chat", r#"{"prompt_template": {"content": []}}"#)
        .expect_err("empty content");
    assert!(err.to_string().contains("is empty"));
}

#[test]
fn rejects_content_block_without_text() {
    let err = parse_template_response(
        "main chat",
        r#"{"prompt_template": {"content": [{"type": "image"}]}}"#,
    )
    .expect_err("no text");
    assert!(err.to_string().contains("no `text`"));
}

#[test]
fn rejects_non_json_body() {
    let err = parse_template_response("main chat", "<html>").expect_err("not json");
    assert!(err.to_string().contains("invalid JSON"));
}

#[test]
fn unsuccessful_lookup_maps_to_missing_template() {
    let err = parse_template_response(
        "side chat",
        r#"{"success": false, "message": "Prompt template not found."}"#,
    )
    .expect_err("missing");
    assert!(matches!(err, ChatError::TemplateMissing { ref name } if name == "side chat"));
}

#[test]
fn load_prompts_groups_templates_by_category_in_order() {
    let store = MapStore::complete();
    let library = load_prompts(&store).expect("all templates present");
    assert_eq!(
        library.names(TemplateCategory::Chat),
        vec!["side chat", "main chat", "side chat relaxed"]
    );
    assert_eq!(
        library.names(TemplateCategory::Insight),
        vec!["formulate insight from dialogue"]
    );
    assert_eq!(store.fetched.borrow().len(), 4);
}

#[test]
fn load_prompts_fails_when_any_template_is_missing() {
    let mut store = MapStore::complete();
    store.templates.remove("side chat relaxed");
    let err = load_prompts(&store).expect_err("missing template aborts load");
    assert!(matches!(err, ChatError::TemplateMissing { ref name } if name == "side chat relaxed"));
}

#[test]
fn ensure_loaded_fetches_only_once() {
    let store = MapStore::complete();
    let mut state = SessionState::default();
    assert!(ensure_loaded(&mut state, &store).expect("first load"));
    assert!(!ensure_loaded(&mut state, &store).expect("cached"));
    assert_eq!(store.fetched.borrow().len(), 4);
    assert!(state.templates.is_some());
}

#[test]
fn failed_load_leaves_session_without_templates() {
    let mut store = MapStore::complete();
    store.templates.remove("main chat");
    let mut state = SessionState::default();
    ensure_loaded(&mut state, &store).expect_err("should fail");
    assert!(state.templates.is_none());
}

#[test]
fn prompt_layer_store_posts_encoded_name_with_api_key() {
    let server = MockServer::start(StatusCode::OK, TEMPLATE_BODY);
    let store = PromptLayerStore::new(format!("{}/", server.base_url()), "pl-test-key");

    let template = store.fetch("side chat").expect("fetch");
    let request = server.single_request();

    assert_eq!(template.content, "You are Ariadna, a warm interviewer.");
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/prompt-templates/side%20chat");
    assert_eq!(request.header("x-api-key"), Some("pl-test-key"));
    assert_eq!(request.json(), serde_json::json!({}));
}

#[test]
fn prompt_layer_store_maps_404_to_missing_template() {
    let server = MockServer::start(StatusCode::NOT_FOUND, r#"{"success": false}"#);
    let store = PromptLayerStore::new(server.base_url(), "pl-test-key");

    let err = store.fetch("main chat").expect_err("404");

    assert!(matches!(err, ChatError::TemplateMissing { ref name } if name == "main chat"));
}

#[test]
fn prompt_layer_store_surfaces_server_errors() {
    let server = MockServer::start(StatusCode::INTERNAL_SERVER_ERROR, "{}");
    let store = PromptLayerStore::new(server.base_url(), "pl-test-key");

    let err = store.fetch("main chat").expect_err("500");

    assert!(matches!(
        err,
        ChatError::Http {
            service: "template store",
            ..
        }
    ));
}
