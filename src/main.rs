use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;

mod app;
mod chat;
mod completion;
mod config;
mod control;
mod error;
mod events;
mod export;
mod insight;
mod logging;
mod markdown;
mod session;
mod templates;
#[cfg(test)]
mod test_support;
mod text_layout;
mod theme;
mod ui;

use app::{App, Catalog};
use completion::TogetherClient;
use config::AppConfig;
use control::Services;
use error::Result;
use session::CredentialGate;
use templates::PromptLayerStore;
use theme::Theme;

/// Terminal chat with Ariadna.
#[derive(Debug, Parser)]
#[command(name = "ariadna-chat", version, about)]
struct Cli {
    /// Configuration file; defaults to ./ariadna.toml when present.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Colour theme file.
    #[arg(long, value_name = "PATH", default_value = "theme.toml")]
    theme: PathBuf,

    /// Log file, overriding [logging] file.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "fatal");
            eprintln!("ariadna-chat: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| config.logging.file.clone());
    if let Err(err) = logging::init(&log_file, &config.logging.filter) {
        eprintln!("ariadna-chat: {err}; continuing without a log file");
    }
    tracing::info!(config = ?cli.config, theme = %cli.theme.display(), "starting");

    let secrets = config.secrets()?;
    let services = Services {
        gate: CredentialGate::new(secrets.password),
        templates: Box::new(PromptLayerStore::new(
            config.template_store.base_url.clone(),
            secrets.promptlayer_api_key,
        )),
        completion: Box::new(TogetherClient::new(
            config.completion.base_url.clone(),
            secrets.together_api_key,
        )),
    };
    let theme = Theme::load_or_default(&cli.theme);
    let app = App::new(Catalog::from_config(&config));

    enable_raw_mode()?;
    with_terminal(
        open_terminal,
        |terminal| run_app(terminal, app, &theme, &services),
        restore_terminal,
    )
}

/// Runs `body` on an opened terminal. `restore` runs whether opening, the
/// body, or neither failed; the first error wins.
fn with_terminal<T>(
    open: impl FnOnce() -> Result<T>,
    body: impl FnOnce(&mut T) -> Result<()>,
    restore: impl FnOnce() -> Result<()>,
) -> Result<()> {
    let result = open().and_then(|mut terminal| body(&mut terminal));
    let restored = restore();
    result.and(restored)
}

fn open_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        SetCursorStyle::SteadyBar
    )?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(
        io::stdout(),
        SetCursorStyle::DefaultUserShape,
        DisableMouseCapture,
        LeaveAlternateScreen,
        Show
    )?;
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    theme: &Theme,
    services: &Services,
) -> Result<()> {
    while app.running {
        terminal.draw(|frame| ui::render(frame, &app, theme))?;

        let event = events::next_event()?;
        let Some(action) = app.handle_event(event) else {
            continue;
        };
        if let Some(label) = action.busy_label() {
            // the call below blocks; this frame is all the user sees until it returns
            app.set_busy(Some(label));
            terminal.draw(|frame| ui::render(frame, &app, theme))?;
        }
        let outcome = control::apply(&mut app, action, services);
        app.set_busy(None);
        outcome?;
    }
    tracing::info!(messages = app.session.messages.len(), "session ended");
    Ok(())
}
