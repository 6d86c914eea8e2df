use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::Scope;
use crate::tui::app::App;
use crate::util::unicode;

use super::{push_highlighted_spans, scroll_into_view};

/// Render the project picker: "Today" first, then every project
pub fn render_project_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    if app.scopes.is_empty() {
        let empty = Paragraph::new(" No projects")
            .style(Style::default().fg(app.theme.dim).bg(bg));
        frame.render_widget(empty, area);
        return;
    }

    let height = area.height as usize;
    let width = area.width as usize;
    app.projects_scroll = scroll_into_view(app.projects_cursor, app.projects_scroll, height);

    let search_re = app.active_search_re();
    let highlight = Style::default()
        .fg(app.theme.search_match_fg)
        .bg(app.theme.search_match_bg);

    let mut lines: Vec<Line> = Vec::new();
    for (i, scope) in app
        .scopes
        .iter()
        .enumerate()
        .skip(app.projects_scroll)
        .take(height)
    {
        let is_cursor = i == app.projects_cursor;
        let row_bg = if is_cursor { app.theme.selection_bg } else { bg };
        let mut spans: Vec<Span> = Vec::new();

        let marker = if is_cursor { "\u{258E}" } else { " " };
        spans.push(Span::styled(
            marker,
            Style::default().fg(app.theme.highlight).bg(row_bg),
        ));
        spans.push(Span::styled(" ", Style::default().bg(row_bg)));

        let mut name_style = Style::default().fg(app.theme.text).bg(row_bg);
        if is_cursor {
            name_style = name_style
                .fg(app.theme.text_bright)
                .add_modifier(Modifier::BOLD);
        }
        if matches!(scope, Scope::Today) {
            name_style = name_style.fg(app.theme.yellow);
        }
        let name = unicode::truncate_to_width(scope.title(), width.saturating_sub(2));
        push_highlighted_spans(&mut spans, &name, name_style, highlight, search_re.as_ref());

        // Pad cursor line
        if is_cursor {
            let used = 2 + unicode::display_width(&name);
            spans.push(Span::styled(
                " ".repeat(width.saturating_sub(used)),
                Style::default().bg(row_bg),
            ));
        }
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
