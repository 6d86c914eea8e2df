use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, View};

/// Render the title row (current view and list size) with a separator below
pub fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let bg = app.theme.background;
    let title_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(app.theme.dim).bg(bg);

    let mut spans = vec![
        Span::styled(" \u{25B6} ", Style::default().fg(app.theme.highlight).bg(bg)),
    ];
    match (app.view, app.session.as_ref()) {
        (View::Tasks, Some(session)) => {
            spans.push(Span::styled(session.scope().title().to_string(), title_style));
            let count = session.collection().len();
            let noun = if count == 1 { "task" } else { "tasks" };
            spans.push(Span::styled(format!("  {} {}", count, noun), dim_style));
            if session.is_sorted() {
                spans.push(Span::styled("  by priority", dim_style));
            }
        }
        _ => {
            spans.push(Span::styled("Projects", title_style));
            spans.push(Span::styled(
                format!("  {}", app.scopes.len().saturating_sub(1)),
                dim_style,
            ));
        }
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(bg)),
        chunks[0],
    );

    let separator = "\u{2500}".repeat(area.width as usize);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(separator, dim_style))),
        chunks[1],
    );
}
