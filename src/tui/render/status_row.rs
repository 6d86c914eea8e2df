use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode};
use crate::util::unicode;

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let bright = Style::default().fg(app.theme.text_bright).bg(bg);
    let cursor = Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg));

    let (spans, hint) = match app.mode {
        Mode::Navigate => {
            if let Some(message) = &app.status_message {
                let color = if app.status_is_error {
                    app.theme.red
                } else {
                    app.theme.text
                };
                (
                    vec![Span::styled(
                        format!(" {}", message),
                        Style::default().fg(color).bg(bg),
                    )],
                    None,
                )
            } else if let Some(pattern) = &app.last_search {
                (
                    vec![Span::styled(
                        format!("/{}", pattern),
                        Style::default().fg(app.theme.dim).bg(bg),
                    )],
                    Some("n/N next/prev"),
                )
            } else {
                (Vec::new(), Some("? help"))
            }
        }
        Mode::Prompt => {
            let (before, after) = app.prompt.text.split_at(app.prompt.cursor);
            (
                vec![
                    Span::styled(" New task: ", Style::default().fg(app.theme.dim).bg(bg)),
                    Span::styled(before.to_string(), bright),
                    cursor,
                    Span::styled(after.to_string(), bright),
                ],
                Some("Enter add  Esc cancel"),
            )
        }
        Mode::Confirm => {
            let content = app
                .confirm_state
                .as_ref()
                .map_or("", |state| state.content.as_str());
            let shown = unicode::truncate_to_width(content, width.saturating_sub(24));
            (
                vec![Span::styled(
                    format!(" Delete \"{}\"?", shown),
                    Style::default().fg(app.theme.red).bg(bg),
                )],
                Some("y/n"),
            )
        }
        Mode::Search => (
            vec![
                Span::styled(format!("/{}", app.search_input), bright),
                cursor,
            ],
            Some("Enter search  Esc cancel"),
        ),
    };

    let line = with_hint(spans, hint, width, app.theme.dim, bg);
    let paragraph = Paragraph::new(line).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// Right-align a dim hint after `spans` when there is room for it
fn with_hint<'a>(
    mut spans: Vec<Span<'a>>,
    hint: Option<&'a str>,
    width: usize,
    dim: Color,
    bg: Color,
) -> Line<'a> {
    if let Some(hint) = hint {
        let content_width: usize = spans
            .iter()
            .map(|s| unicode::display_width(&s.content))
            .sum();
        let hint_width = unicode::display_width(hint);
        if content_width + hint_width < width {
            let padding = width - content_width - hint_width;
            spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
            spans.push(Span::styled(hint, Style::default().fg(dim).bg(bg)));
        }
    }
    Line::from(spans)
}
