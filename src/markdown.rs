use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

/// Renders chat markdown into owned ratatui text.
///
/// `tui_markdown` builds on `ratatui_core`, whose types are distinct from the
/// ones `ratatui` 0.29 draws, so every line is rebuilt span by span.
pub fn render_markdown(source: &str) -> Text<'static> {
    let parsed = tui_markdown::from_str(source);
    let lines: Vec<Line<'static>> = parsed
        .lines
        .iter()
        .map(|line| {
            let spans: Vec<Span<'static>> = line
                .spans
                .iter()
                .map(|span| Span::styled(span.content.to_string(), convert_style(span.style)))
                .collect();
            Line::from(spans).style(convert_style(line.style))
        })
        .collect();
    Text::from(lines).style(convert_style(parsed.style))
}

fn convert_style(style: ratatui_core::style::Style) -> Style {
    let mut out = Style::default()
        .add_modifier(Modifier::from_bits_truncate(style.add_modifier.bits()))
        .remove_modifier(Modifier::from_bits_truncate(style.sub_modifier.bits()));
    if let Some(fg) = style.fg.and_then(convert_color) {
        out = out.fg(fg);
    }
    if let Some(bg) = style.bg.and_then(convert_color) {
        out = out.bg(bg);
    }
    out
}

fn convert_color(color: ratatui_core::style::Color) -> Option<Color> {
    color.to_string().parse().ok()
}

/// Plain text of a rendered block, one entry per line.
#[cfg(test)]
pub fn plain_lines(text: &Text<'_>) -> Vec<String> {
    text.lines
        .iter()
        .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect())
        .collect()
}
