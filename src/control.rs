use crate::app::{App, Notice, UserAction};
use crate::chat;
use crate::completion::CompletionClient;
use crate::error::Result;
use crate::export;
use crate::insight;
use crate::session::CredentialGate;
use crate::templates::{self, TemplateStore};

/// External collaborators a session talks to.
pub struct Services {
    pub gate: CredentialGate,
    pub templates: Box<dyn TemplateStore>,
    pub completion: Box<dyn CompletionClient>,
}

/// Executes one user action against the session.
///
/// Only template loading errors escape; every other failure becomes an error
/// notice and leaves the session usable.
pub fn apply(app: &mut App, action: UserAction, services: &Services) -> Result<()> {
    match action {
        UserAction::Authenticate(candidate) => {
            if app.is_authenticated() {
                return Ok(());
            }
            if !services.gate.authenticate(&mut app.session, &candidate) {
                app.set_notice(Notice::Error("Invalid password. Access denied.".to_string()));
                return Ok(());
            }
            templates::ensure_loaded(&mut app.session, services.templates.as_ref())?;
            app.apply_default_selections();
            app.set_notice(Notice::Success("Authenticated.".to_string()));
        }
        UserAction::Select(item, direction) => app.cycle_selection(item, direction),
        UserAction::StartChat => {
            chat::start_chat(&mut app.session);
            app.follow_latest();
            app.set_notice(Notice::Success("Chat started.".to_string()));
        }
        UserAction::SubmitMessage(text) => {
            let outcome =
                chat::submit_user_message(&mut app.session, services.completion.as_ref(), &text)
                    .map(|_| ());
            app.follow_latest();
            if let Err(err) = outcome {
                app.report_error(err);
            }
        }
        UserAction::GenerateInsight => {
            match insight::generate_insight(&mut app.session, services.completion.as_ref()) {
                Ok(_) => app.set_notice(Notice::Success("Insight generated.".to_string())),
                Err(err) => app.report_error(err),
            }
        }
        UserAction::SaveDialogue(path) => {
            match export::save_dialogue(&app.session.messages, &path) {
                Ok(()) => app.set_notice(Notice::Success(format!(
                    "Dialogue saved as {}",
                    path.display()
                ))),
                Err(err) => app.report_error(err),
            }
        }
    }
    chat::ensure_opener(&mut app.session);
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/control_tests.rs"]
mod tests;
