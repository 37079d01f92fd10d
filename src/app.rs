use std::path::PathBuf;

use crate::config::AppConfig;
use crate::events::AppEvent;
use crate::export::DEFAULT_EXPORT_FILE;
use crate::session::{SessionState, TemplateCategory};
use crate::text_layout::{InputLayout, layout_input};

pub const PANEL_ITEMS: [PanelItem; 9] = [
    PanelItem::ChatModel,
    PanelItem::InsightModel,
    PanelItem::ChatPrompt,
    PanelItem::InsightPrompt,
    PanelItem::FirstQuestion,
    PanelItem::StartChat,
    PanelItem::GenerateInsight,
    PanelItem::ExportFile,
    PanelItem::SaveDialogue,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelItem {
    ChatModel,
    InsightModel,
    ChatPrompt,
    InsightPrompt,
    FirstQuestion,
    StartChat,
    GenerateInsight,
    ExportFile,
    SaveDialogue,
}

impl PanelItem {
    pub fn label(self) -> &'static str {
        match self {
            PanelItem::ChatModel => "Chat Model",
            PanelItem::InsightModel => "Insight Model",
            PanelItem::ChatPrompt => "Chat Prompt",
            PanelItem::InsightPrompt => "Insight Prompt",
            PanelItem::FirstQuestion => "First Question",
            PanelItem::StartChat => "Start Chat",
            PanelItem::GenerateInsight => "Generate Insight",
            PanelItem::ExportFile => "Export File",
            PanelItem::SaveDialogue => "Save Dialogue",
        }
    }

    pub fn is_selector(self) -> bool {
        matches!(
            self,
            PanelItem::ChatModel
                | PanelItem::InsightModel
                | PanelItem::ChatPrompt
                | PanelItem::InsightPrompt
                | PanelItem::FirstQuestion
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Panel,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// One state transition requested by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Authenticate(String),
    Select(PanelItem, Direction),
    StartChat,
    SubmitMessage(String),
    GenerateInsight,
    SaveDialogue(PathBuf),
}

impl UserAction {
    /// Status text shown while the action blocks on a network call.
    pub fn busy_label(&self) -> Option<&'static str> {
        match self {
            UserAction::Authenticate(_) => Some("Loading prompt templates"),
            UserAction::SubmitMessage(_) => Some("Waiting for reply"),
            UserAction::GenerateInsight => Some("Generating insight"),
            _ => None,
        }
    }
}

/// Options the selectors cycle through that do not come from the template store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub models: Vec<String>,
    pub first_questions: Vec<String>,
    pub export_file: String,
}

impl Catalog {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            models: config.completion.models.clone(),
            first_questions: config.chat.first_questions.clone(),
            export_file: config.chat.export_file.clone(),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert(&mut self, c: char) {
        let at = byte_index(&self.value, self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let start = byte_index(&self.value, self.cursor - 1);
        let end = byte_index(&self.value, self.cursor);
        self.value.drain(start..end);
        self.cursor -= 1;
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.value)
    }

    pub fn layout(&self, width: u16) -> InputLayout {
        layout_input(&self.value, width)
    }
}

fn byte_index(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub focus: Focus,
    pub session: SessionState,
    catalog: Catalog,
    panel_cursor: usize,
    password: TextInput,
    chat_input: TextInput,
    export_file: TextInput,
    scroll_from_bottom: u16,
    notice: Option<Notice>,
    busy: Option<&'static str>,
}

impl Default for App {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}

impl App {
    pub fn new(catalog: Catalog) -> Self {
        let export_file = if catalog.export_file.trim().is_empty() {
            DEFAULT_EXPORT_FILE.to_string()
        } else {
            catalog.export_file.clone()
        };
        Self {
            running: true,
            focus: Focus::Panel,
            session: SessionState::default(),
            catalog,
            panel_cursor: 0,
            password: TextInput::default(),
            chat_input: TextInput::default(),
            export_file: TextInput::with_value(export_file),
            scroll_from_bottom: 0,
            notice: None,
            busy: None,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.authenticated
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn report_error(&mut self, err: impl std::fmt::Display) {
        tracing::error!(%err, "action failed");
        self.notice = Some(Notice::Error(err.to_string()));
    }

    pub fn busy(&self) -> Option<&'static str> {
        self.busy
    }

    pub fn set_busy(&mut self, label: Option<&'static str>) {
        self.busy = label;
    }

    pub fn password(&self) -> &TextInput {
        &self.password
    }

    pub fn chat_input(&self) -> &TextInput {
        &self.chat_input
    }

    pub fn export_file(&self) -> &TextInput {
        &self.export_file
    }

    pub fn panel_item(&self) -> PanelItem {
        PANEL_ITEMS[self.panel_cursor]
    }

    pub fn scroll_from_bottom(&self) -> u16 {
        self.scroll_from_bottom
    }

    pub fn follow_latest(&mut self) {
        self.scroll_from_bottom = 0;
    }

    /// Options for a selector, in display order.
    pub fn options(&self, item: PanelItem) -> Vec<&str> {
        let templates = self.session.templates.as_ref();
        match item {
            PanelItem::ChatModel | PanelItem::InsightModel => {
                self.catalog.models.iter().map(String::as_str).collect()
            }
            PanelItem::ChatPrompt => templates
                .map(|t| t.names(TemplateCategory::Chat))
                .unwrap_or_default(),
            PanelItem::InsightPrompt => templates
                .map(|t| t.names(TemplateCategory::Insight))
                .unwrap_or_default(),
            PanelItem::FirstQuestion => self
                .catalog
                .first_questions
                .iter()
                .map(String::as_str)
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn selected(&self, item: PanelItem) -> &str {
        match item {
            PanelItem::ChatModel => &self.session.selected_chat_model,
            PanelItem::InsightModel => &self.session.selected_insight_model,
            PanelItem::ChatPrompt => &self.session.selected_chat_prompt,
            PanelItem::InsightPrompt => &self.session.selected_insight_prompt,
            PanelItem::FirstQuestion => &self.session.selected_first_question,
            _ => "",
        }
    }

    fn selected_mut(&mut self, item: PanelItem) -> Option<&mut String> {
        match item {
            PanelItem::ChatModel => Some(&mut self.session.selected_chat_model),
            PanelItem::InsightModel => Some(&mut self.session.selected_insight_model),
            PanelItem::ChatPrompt => Some(&mut self.session.selected_chat_prompt),
            PanelItem::InsightPrompt => Some(&mut self.session.selected_insight_prompt),
            PanelItem::FirstQuestion => Some(&mut self.session.selected_first_question),
            _ => None,
        }
    }

    /// Points every selector at its first option unless it already holds a
    /// valid one.
    pub fn apply_default_selections(&mut self) {
        for item in PANEL_ITEMS.into_iter().filter(|item| item.is_selector()) {
            let options = self.options(item);
            if options.contains(&self.selected(item)) {
                continue;
            }
            let first = options.first().map(|s| s.to_string()).unwrap_or_default();
            if let Some(slot) = self.selected_mut(item) {
                *slot = first;
            }
        }
    }

    /// Moves a selector to the neighbouring option, wrapping at both ends.
    pub fn cycle_selection(&mut self, item: PanelItem, direction: Direction) {
        let options: Vec<String> = self.options(item).into_iter().map(str::to_string).collect();
        if options.is_empty() {
            return;
        }
        let current = options
            .iter()
            .position(|option| option == self.selected(item));
        let next = match (current, direction) {
            (None, _) => 0,
            (Some(idx), Direction::Next) => (idx + 1) % options.len(),
            (Some(idx), Direction::Prev) => (idx + options.len() - 1) % options.len(),
        };
        if let Some(slot) = self.selected_mut(item) {
            *slot = options[next].clone();
        }
        tracing::debug!(item = item.label(), value = %options[next], "selection changed");
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Option<UserAction> {
        match event {
            AppEvent::Quit => {
                self.quit();
                return None;
            }
            AppEvent::Tick => return None,
            _ => {}
        }
        if !self.is_authenticated() {
            return self.handle_login_event(event);
        }
        match event {
            AppEvent::NextFocus | AppEvent::PrevFocus => {
                self.focus = match self.focus {
                    Focus::Panel => Focus::Chat,
                    Focus::Chat => Focus::Panel,
                };
                None
            }
            AppEvent::ScrollUp => {
                self.scroll_up();
                None
            }
            AppEvent::ScrollDown => {
                self.scroll_down();
                None
            }
            _ => match self.focus {
                Focus::Panel => self.handle_panel_event(event),
                Focus::Chat => self.handle_chat_event(event),
            },
        }
    }

    fn handle_login_event(&mut self, event: AppEvent) -> Option<UserAction> {
        match event {
            AppEvent::InputChar(c) => self.password.insert(c),
            AppEvent::Backspace => self.password.backspace(),
            AppEvent::Left => self.password.left(),
            AppEvent::Right => self.password.right(),
            AppEvent::Submit if !self.password.value().is_empty() => {
                return Some(UserAction::Authenticate(self.password.take()));
            }
            _ => {}
        }
        None
    }

    fn handle_panel_event(&mut self, event: AppEvent) -> Option<UserAction> {
        let item = self.panel_item();
        match event {
            AppEvent::Up => {
                self.panel_cursor = self.panel_cursor.saturating_sub(1);
                None
            }
            AppEvent::Down => {
                self.panel_cursor = (self.panel_cursor + 1).min(PANEL_ITEMS.len() - 1);
                None
            }
            AppEvent::Left if item.is_selector() => Some(UserAction::Select(item, Direction::Prev)),
            AppEvent::Right if item.is_selector() => {
                Some(UserAction::Select(item, Direction::Next))
            }
            AppEvent::Submit => match item {
                PanelItem::StartChat => Some(UserAction::StartChat),
                PanelItem::GenerateInsight => Some(UserAction::GenerateInsight),
                PanelItem::SaveDialogue | PanelItem::ExportFile => {
                    Some(UserAction::SaveDialogue(self.export_path()))
                }
                selector => Some(UserAction::Select(selector, Direction::Next)),
            },
            AppEvent::InputChar(c) if item == PanelItem::ExportFile => {
                self.export_file.insert(c);
                None
            }
            AppEvent::Backspace if item == PanelItem::ExportFile => {
                self.export_file.backspace();
                None
            }
            AppEvent::Left if item == PanelItem::ExportFile => {
                self.export_file.left();
                None
            }
            AppEvent::Right if item == PanelItem::ExportFile => {
                self.export_file.right();
                None
            }
            _ => None,
        }
    }

    fn handle_chat_event(&mut self, event: AppEvent) -> Option<UserAction> {
        match event {
            AppEvent::InputChar(c) => self.chat_input.insert(c),
            AppEvent::Backspace => self.chat_input.backspace(),
            AppEvent::Left => self.chat_input.left(),
            AppEvent::Right => self.chat_input.right(),
            AppEvent::Up => self.scroll_up(),
            AppEvent::Down => self.scroll_down(),
            AppEvent::Submit => {
                if !self.session.chat_started {
                    self.notice = Some(Notice::Error(
                        "Start a chat from the control panel first.".to_string(),
                    ));
                    return None;
                }
                if self.chat_input.value().trim().is_empty() {
                    return None;
                }
                self.follow_latest();
                return Some(UserAction::SubmitMessage(self.chat_input.take()));
            }
            _ => {}
        }
        None
    }

    fn export_path(&self) -> PathBuf {
        let name = self.export_file.value().trim();
        if name.is_empty() {
            PathBuf::from(DEFAULT_EXPORT_FILE)
        } else {
            PathBuf::from(name)
        }
    }

    fn scroll_up(&mut self) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_add(1);
    }

    fn scroll_down(&mut self) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(1);
    }
}

#[cfg(test)]
#[path = "../tests/unit/app_tests.rs"]
mod tests;
