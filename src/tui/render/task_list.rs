use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::Due;
use crate::ops::menu::MenuEntry;
use crate::tui::app::App;
use crate::util::unicode;

use super::{push_highlighted_spans, scroll_into_view};

/// Cells taken by the cursor marker, badge and their spacing
const PREFIX_CELLS: usize = 5;
const MAX_DUE_CELLS: usize = 24;

/// Render the open tasks of the current session, one menu entry per row
pub fn render_task_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let Some(session) = app.session.as_ref() else {
        return;
    };

    let height = area.height as usize;
    let width = area.width as usize;
    let scroll = scroll_into_view(app.tasks_cursor, app.tasks_scroll, height);

    let search_re = app.active_search_re();
    let highlight = Style::default()
        .fg(app.theme.search_match_fg)
        .bg(app.theme.search_match_bg);

    let mut lines: Vec<Line> = Vec::new();
    for (i, entry) in session
        .menu()
        .entries()
        .iter()
        .enumerate()
        .skip(scroll)
        .take(height)
    {
        let (label, priority, due) = match entry {
            MenuEntry::Task {
                label,
                priority,
                due,
                ..
            } => (label, *priority, due.as_ref()),
            MenuEntry::Info(text) => {
                lines.push(Line::from(Span::styled(
                    format!("  {}", text),
                    Style::default()
                        .fg(app.theme.dim)
                        .bg(bg)
                        .add_modifier(Modifier::ITALIC),
                )));
                continue;
            }
        };

        let is_cursor = i == app.tasks_cursor;
        let row_bg = if is_cursor { app.theme.selection_bg } else { bg };
        let mut spans: Vec<Span> = Vec::new();

        let marker = if is_cursor { "\u{258E}" } else { " " };
        spans.push(Span::styled(
            marker,
            Style::default().fg(app.theme.highlight).bg(row_bg),
        ));
        spans.push(Span::styled(" ", Style::default().bg(row_bg)));
        spans.push(Span::styled(
            priority.label(),
            Style::default()
                .fg(app.theme.priority_color(priority))
                .bg(row_bg)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(" ", Style::default().bg(row_bg)));

        let due_text = due.map(|d| unicode::truncate_to_width(&due_label(d), MAX_DUE_CELLS));
        let due_cells = due_text
            .as_deref()
            .map_or(0, |t| unicode::display_width(t) + 1);
        let budget = width.saturating_sub(PREFIX_CELLS + due_cells);
        let content = unicode::truncate_to_width(label, budget);

        let mut content_style = Style::default().fg(app.theme.text).bg(row_bg);
        if is_cursor {
            content_style = content_style
                .fg(app.theme.text_bright)
                .add_modifier(Modifier::BOLD);
        }
        push_highlighted_spans(
            &mut spans,
            &content,
            content_style,
            highlight,
            search_re.as_ref(),
        );

        // Right-align the due date; pad cursor line to full width
        let used = PREFIX_CELLS + unicode::display_width(&content);
        if let (Some(text), Some(due)) = (due_text, due) {
            let gap = width.saturating_sub(used + unicode::display_width(&text));
            spans.push(Span::styled(" ".repeat(gap), Style::default().bg(row_bg)));
            let color = if due.is_overdue(app.today) {
                app.theme.red
            } else {
                app.theme.dim
            };
            spans.push(Span::styled(text, Style::default().fg(color).bg(row_bg)));
        } else if is_cursor {
            spans.push(Span::styled(
                " ".repeat(width.saturating_sub(used)),
                Style::default().bg(row_bg),
            ));
        }

        lines.push(Line::from(spans));
    }

    app.tasks_scroll = scroll;
    let paragraph = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// What the service shows for a due date: its natural-language string, or
/// the bare date when there is none
fn due_label(due: &Due) -> String {
    if due.string.trim().is_empty() {
        due.date.format("%b %-d").to_string()
    } else {
        due.string.clone()
    }
}
