use ratatui::prelude::*;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Clear, Padding, Paragraph, Wrap};

use crate::app::{App, Focus, Notice, PANEL_ITEMS, PanelItem};
use crate::markdown::render_markdown;
use crate::session::{Message, Role};
use crate::text_layout::mask;
use crate::theme::Theme;

pub const APP_TITLE: &str = "Chat with Ariadna";

const MAX_INPUT_TEXT_LINES: u16 = 5;
const TEXT_PADDING: u16 = 1;
const STATUS_HEIGHT: u16 = 3;
const TITLE_BAR_HEIGHT: u16 = 3;
const SIDEBAR_WIDTH: u16 = 40;
const LOGIN_WIDTH: u16 = 48;
const LOGIN_HEIGHT: u16 = 9;
const ACTIVE_TITLE_BG: Color = Color::Rgb(90, 145, 200);
const ACTIVE_TITLE_FG: Color = Color::Black;
const STATUS_HELP_TEXT: &str =
    "Tab focus | Up/Down move | Left/Right change | Enter select | PgUp/PgDn scroll | Ctrl+C quit";
const IDLE_HINT: &str = "Choose Start Chat in the control panel to begin.";

pub fn render(frame: &mut Frame, app: &App, theme: &Theme) {
    if app.is_authenticated() {
        render_main(frame, app, theme);
    } else {
        render_login(frame, app, theme);
    }
}

fn render_login(frame: &mut Frame, app: &App, theme: &Theme) {
    let screen = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.chat_bg)),
        screen,
    );
    let width = LOGIN_WIDTH.min(screen.width);
    let height = LOGIN_HEIGHT.min(screen.height);
    let area = Rect::new(
        screen.x + screen.width.saturating_sub(width) / 2,
        screen.y + screen.height.saturating_sub(height) / 2,
        width,
        height,
    );
    frame.render_widget(Clear, area);

    let masked = mask(app.password().value());
    let mut lines = vec![
        Line::from(Span::styled(
            APP_TITLE,
            Style::default()
                .fg(theme.active_fg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled("Password: ", Style::default().fg(theme.muted_fg)),
            Span::styled(masked, Style::default().fg(theme.text_fg)),
        ]),
        Line::default(),
    ];
    lines.push(match app.notice() {
        Some(notice) => notice_line(notice, theme),
        None => Line::from(Span::styled(
            "Enter to sign in | Ctrl+C to quit",
            Style::default().fg(theme.muted_fg),
        )),
    });

    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .alignment(Alignment::Left)
            .style(Style::default().bg(theme.panel_bg).fg(theme.text_fg))
            .block(
                Block::default()
                    .style(Style::default().bg(theme.panel_bg))
                    .padding(Padding::uniform(TEXT_PADDING + 1)),
            ),
        area,
    );

    let inner = area.inner(Margin {
        horizontal: TEXT_PADDING + 1,
        vertical: TEXT_PADDING + 1,
    });
    if inner.width > 0 && inner.height > 2 {
        let prompt_width = "Password: ".len() as u16;
        let col = prompt_width.saturating_add(app.password().cursor() as u16);
        frame.set_cursor_position((
            inner.x.saturating_add(col.min(inner.width.saturating_sub(1))),
            inner.y + 2,
        ));
    }
}

fn render_main(frame: &mut Frame, app: &App, theme: &Theme) {
    let [title, body, status] = Layout::vertical([
        Constraint::Length(TITLE_BAR_HEIGHT),
        Constraint::Min(0),
        Constraint::Length(STATUS_HEIGHT),
    ])
    .areas(frame.area());
    let [sidebar, chat] =
        Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)]).areas(body);

    frame.render_widget(
        Paragraph::new(APP_TITLE)
            .style(
                Style::default()
                    .bg(theme.title_bg)
                    .fg(theme.active_fg)
                    .add_modifier(Modifier::BOLD),
            )
            .block(
                Block::default()
                    .style(Style::default().bg(theme.title_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        title,
    );
    render_control_panel(frame, sidebar, app, app.focus == Focus::Panel, theme);
    render_chat_pane(frame, chat, app, app.focus == Focus::Chat, theme);

    frame.render_widget(
        Paragraph::new(status_line(app, theme))
            .style(Style::default().bg(theme.status_bg).fg(theme.muted_fg))
            .block(
                Block::default()
                    .style(Style::default().bg(theme.status_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        status,
    );
}

fn render_title_bar(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    base: Color,
    active: bool,
    theme: &Theme,
) {
    let bg = title_bar_bg(base, active);
    let fg = if active { ACTIVE_TITLE_FG } else { theme.muted_fg };
    frame.render_widget(
        Paragraph::new(label.to_string())
            .style(Style::default().bg(bg).fg(fg))
            .block(
                Block::default()
                    .style(Style::default().bg(bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        area,
    );
}

fn render_control_panel(frame: &mut Frame, area: Rect, app: &App, active: bool, theme: &Theme) {
    let [title_area, content] =
        Layout::vertical([Constraint::Length(TITLE_BAR_HEIGHT), Constraint::Min(0)]).areas(area);
    render_title_bar(frame, title_area, "Control Panel", theme.panel_bg, active, theme);

    let (lines, export_row) = control_panel_lines(app, active, theme);
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .style(Style::default().bg(theme.panel_bg).fg(theme.text_fg))
            .block(
                Block::default()
                    .style(Style::default().bg(theme.panel_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        content,
    );

    if active && app.panel_item() == PanelItem::ExportFile {
        let inner = content.inner(Margin {
            horizontal: TEXT_PADDING,
            vertical: TEXT_PADDING,
        });
        if inner.width > 0 && export_row < inner.height {
            let col = 2u16.saturating_add(app.export_file().cursor() as u16);
            frame.set_cursor_position((
                inner.x.saturating_add(col.min(inner.width.saturating_sub(1))),
                inner.y + export_row,
            ));
        }
    }
}

/// Sidebar rows plus the row index of the export filename field.
fn control_panel_lines(app: &App, active: bool, theme: &Theme) -> (Vec<Line<'static>>, u16) {
    let mut lines = Vec::new();
    let mut export_row = 0u16;
    for item in PANEL_ITEMS {
        let focused = active && app.panel_item() == item;
        let marker = if focused { "> " } else { "  " };
        let label_style = if focused {
            Style::default()
                .fg(theme.active_fg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.muted_fg)
        };
        match item {
            PanelItem::StartChat | PanelItem::GenerateInsight | PanelItem::SaveDialogue => {
                lines.push(Line::from(vec![
                    Span::styled(marker, label_style),
                    Span::styled(format!("[ {} ]", item.label()), label_style),
                ]));
                lines.push(Line::default());
            }
            PanelItem::ExportFile => {
                lines.push(Line::from(vec![
                    Span::styled(marker, label_style),
                    Span::styled(item.label(), label_style),
                ]));
                export_row = lines.len() as u16;
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(
                        app.export_file().value().to_string(),
                        Style::default().fg(theme.text_fg).bg(theme.input_bg),
                    ),
                ]));
            }
            selector => {
                lines.push(Line::from(vec![
                    Span::styled(marker, label_style),
                    Span::styled(selector.label(), label_style),
                ]));
                let value = app.selected(selector);
                let shown = if value.is_empty() { "(none)" } else { value };
                let arrows = if focused { ("< ", " >") } else { ("  ", "") };
                lines.push(Line::from(vec![
                    Span::styled(arrows.0, Style::default().fg(theme.muted_fg)),
                    Span::styled(shown.to_string(), Style::default().fg(theme.text_fg)),
                    Span::styled(arrows.1, Style::default().fg(theme.muted_fg)),
                ]));
            }
        }
    }
    (lines, export_row)
}

fn render_chat_pane(frame: &mut Frame, area: Rect, app: &App, active: bool, theme: &Theme) {
    let [title_area, content] =
        Layout::vertical([Constraint::Length(TITLE_BAR_HEIGHT), Constraint::Min(0)]).areas(area);
    render_title_bar(frame, title_area, "Conversation", theme.chat_bg, active, theme);
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.chat_bg)),
        content,
    );
    if content.width < 1 || content.height < 2 {
        return;
    }

    let input_text_width = content.width.saturating_sub(TEXT_PADDING * 2).max(1);
    let input_layout = app.chat_input().layout(input_text_width);
    let (cursor_line, cursor_col) = input_layout.cursor(app.chat_input().cursor());
    let max_input_height = content.height.saturating_sub(1).max(1);
    let (input_height, input_scroll) =
        input_box_metrics(input_layout.line_count(), cursor_line, max_input_height);
    let insight_height = match app.session.last_insight {
        Some(_) => (content.height / 3).max(4),
        None => 0,
    };

    let [messages_area, insight_area, input_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(insight_height),
        Constraint::Length(input_height),
    ])
    .areas(content);

    let messages_inner = messages_area.inner(Margin {
        horizontal: TEXT_PADDING,
        vertical: TEXT_PADDING,
    });
    let messages = Paragraph::new(chat_text(&app.session.messages, theme))
        .style(Style::default().bg(theme.chat_bg).fg(theme.text_fg))
        .wrap(Wrap { trim: false });
    let total = messages.line_count(messages_inner.width.max(1));
    let scroll = message_scroll(total, messages_inner.height, app.scroll_from_bottom());
    frame.render_widget(messages.scroll((scroll, 0)), messages_inner);

    if let Some(insight) = app.session.last_insight.as_deref() {
        render_insight(frame, insight_area, insight, theme);
    }

    if !app.session.chat_started {
        frame.render_widget(
            Paragraph::new(IDLE_HINT)
                .style(Style::default().bg(theme.input_bg).fg(theme.muted_fg))
                .block(
                    Block::default()
                        .style(Style::default().bg(theme.input_bg))
                        .padding(Padding::uniform(TEXT_PADDING)),
                ),
            input_area,
        );
        return;
    }

    frame.render_widget(
        Paragraph::new(input_layout.rendered())
            .style(Style::default().bg(theme.input_bg).fg(theme.text_fg))
            .scroll((input_scroll, 0))
            .block(
                Block::default()
                    .style(Style::default().bg(theme.input_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        input_area,
    );

    if active {
        let input_inner = input_area.inner(Margin {
            horizontal: TEXT_PADDING,
            vertical: TEXT_PADDING,
        });
        if input_inner.width > 0 && input_inner.height > 0 {
            let visible_cursor_line = cursor_line.saturating_sub(input_scroll);
            if visible_cursor_line < input_inner.height {
                frame.set_cursor_position((
                    input_inner
                        .x
                        .saturating_add(cursor_col.min(input_inner.width.saturating_sub(1))),
                    input_inner.y.saturating_add(visible_cursor_line),
                ));
            }
        }
    }
}

fn render_insight(frame: &mut Frame, area: Rect, insight: &str, theme: &Theme) {
    if area.height == 0 {
        return;
    }
    let mut lines = vec![Line::from(Span::styled(
        "Insight",
        Style::default()
            .fg(theme.active_fg)
            .add_modifier(Modifier::BOLD),
    ))];
    lines.extend(render_markdown(insight).lines);
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .style(Style::default().bg(theme.insight_bg).fg(theme.text_fg))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .style(Style::default().bg(theme.insight_bg))
                    .padding(Padding::horizontal(TEXT_PADDING)),
            ),
        area,
    );
}

/// Every message as a role label followed by its markdown body, separated
/// by a blank line.
pub fn chat_text(messages: &[Message], theme: &Theme) -> Text<'static> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    for (idx, message) in messages.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            role_label(message.role),
            role_style(message.role, theme),
        )));
        lines.extend(render_markdown(&message.content).lines);
    }
    Text::from(lines)
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "Ariadna",
        Role::System => "System",
        Role::Insight => "Insight",
    }
}

fn role_style(role: Role, theme: &Theme) -> Style {
    let fg = match role {
        Role::User => theme.user_fg,
        Role::Assistant => theme.assistant_fg,
        Role::System | Role::Insight => theme.muted_fg,
    };
    Style::default().fg(fg).add_modifier(Modifier::BOLD)
}

/// Top row to show so that `from_bottom` lines stay hidden below the view.
fn message_scroll(total_lines: usize, visible_lines: u16, from_bottom: u16) -> u16 {
    let total = u16::try_from(total_lines).unwrap_or(u16::MAX);
    let max_scroll = total.saturating_sub(visible_lines);
    max_scroll.saturating_sub(from_bottom.min(max_scroll))
}

fn status_line(app: &App, theme: &Theme) -> Line<'static> {
    let mut spans = Vec::new();
    if let Some(label) = app.busy() {
        spans.push(Span::styled(
            format!("{label}... | "),
            Style::default().fg(theme.active_fg),
        ));
    } else if let Some(notice) = app.notice() {
        spans.extend(notice_line(notice, theme).spans);
        spans.push(Span::raw(" | "));
    }
    spans.push(Span::styled(
        STATUS_HELP_TEXT,
        Style::default().fg(theme.muted_fg),
    ));
    Line::from(spans)
}

fn notice_line(notice: &Notice, theme: &Theme) -> Line<'static> {
    match notice {
        Notice::Success(text) => Line::from(Span::styled(
            text.clone(),
            Style::default().fg(theme.success_fg),
        )),
        Notice::Error(text) => Line::from(Span::styled(
            text.clone(),
            Style::default().fg(theme.error_fg),
        )),
    }
}

fn input_box_metrics(input_text_lines: u16, cursor_line: u16, max_input_height: u16) -> (u16, u16) {
    let capped_text_lines = input_text_lines.clamp(1, MAX_INPUT_TEXT_LINES);
    let desired_height = capped_text_lines.saturating_add(TEXT_PADDING * 2);
    let input_height = desired_height.clamp(1, max_input_height.max(1));
    let visible_text_lines = input_height.saturating_sub(TEXT_PADDING * 2).max(1);
    let max_scroll = input_text_lines.saturating_sub(visible_text_lines);
    let middle_line = visible_text_lines / 2;
    let input_scroll = cursor_line.saturating_sub(middle_line).min(max_scroll);
    (input_height, input_scroll)
}

fn title_bar_bg(base: Color, active: bool) -> Color {
    if active {
        return ACTIVE_TITLE_BG;
    }
    match base {
        Color::Rgb(r, g, b) => Color::Rgb(
            adjust_channel(r, -12),
            adjust_channel(g, -12),
            adjust_channel(b, -12),
        ),
        _ => base,
    }
}

fn adjust_channel(channel: u8, delta: i16) -> u8 {
    let value = channel as i16 + delta;
    value.clamp(0, 255) as u8
}

#[cfg(test)]
#[path = "../tests/unit/ui_tests.rs"]
mod tests;
