use crate::completion::CompletionClient;
use crate::error::Result;
use crate::session::{SessionState, TemplateCategory};

/// Derives an insight from the whole conversation with the insight prompt and
/// model. The result goes to `last_insight`; `messages` is only read.
///
/// An empty history is sent as-is.
pub fn generate_insight(state: &mut SessionState, client: &dyn CompletionClient) -> Result<String> {
    let system_prompt = state
        .templates()?
        .template_text(TemplateCategory::Insight, &state.selected_insight_prompt)?;
    tracing::info!(
        prompt = %state.selected_insight_prompt,
        model = %state.selected_insight_model,
        messages = state.messages.len(),
        "generating insight"
    );
    let insight = client.complete(&state.messages, &state.selected_insight_model, system_prompt)?;
    state.last_insight = Some(insight.clone());
    Ok(insight)
}
