use crate::completion::CompletionClient;
use crate::error::Result;
use crate::session::{Message, SessionState, TemplateCategory};

/// Chat prompts that open the conversation with the selected first question.
pub const OPENER_PROMPTS: [&str; 2] = ["side chat", "side chat relaxed"];

pub fn is_opener_prompt(name: &str) -> bool {
    OPENER_PROMPTS.contains(&name)
}

/// Enters a fresh chat: history cleared, opener pending again.
pub fn start_chat(state: &mut SessionState) {
    state.chat_started = true;
    state.messages.clear();
    state.first_question_asked = false;
    tracing::info!(prompt = %state.selected_chat_prompt, "chat started");
    ensure_opener(state);
}

/// Inserts the opener question as the first assistant message when the
/// active chat uses an opener prompt and nothing has been said yet.
pub fn ensure_opener(state: &mut SessionState) -> bool {
    if !state.chat_started
        || state.first_question_asked
        || !state.messages.is_empty()
        || !is_opener_prompt(&state.selected_chat_prompt)
    {
        return false;
    }
    state
        .messages
        .push(Message::assistant(state.selected_first_question.clone()));
    state.first_question_asked = true;
    tracing::debug!("opener question inserted");
    true
}

/// Runs one user turn. Returns `Ok(None)` when no chat is active or the input
/// is blank. Non-blank input is stored exactly as typed. On a completion failure the user message stays in history
/// without a reply.
pub fn submit_user_message<'a>(
    state: &'a mut SessionState,
    client: &dyn CompletionClient,
    input: &str,
) -> Result<Option<&'a Message>> {
    if !state.chat_started {
        tracing::debug!("input ignored while no chat is active");
        return Ok(None);
    }
    if input.trim().is_empty() {
        return Ok(None);
    }
    ensure_opener(state);

    let system_prompt = state
        .templates()?
        .template_text(TemplateCategory::Chat, &state.selected_chat_prompt)?
        .to_string();
    state.messages.push(Message::user(input));
    let reply = client.complete(&state.messages, &state.selected_chat_model, &system_prompt)?;
    state.messages.push(Message::assistant(reply));
    Ok(state.messages.last())
}

#[cfg(test)]
#[path = "../tests/unit/chat_tests.rs"]
mod tests;
