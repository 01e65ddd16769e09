//! Release/asset list rendering.

use afetch::session::{ListItem, ListView};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const RELEASE_HELP: &str =
    "Press '↑/↓' or 'j/k' to navigate, 'enter' to select, 'q' or 'ctrl+c' to quit";
const ASSET_HELP: &str = "Press '↑/↓' or 'j/k' to navigate, 'space' to select/deselect, \
                          'enter' to download, 'q' or 'ctrl+c' to quit";

/// Build the lines for a list view, scrolled so the cursor stays visible.
pub fn list_lines(view: &ListView, notice: Option<&str>, height: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            view.title().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    // Title, blank, and up to four footer lines
    let visible = height.saturating_sub(6).max(1);
    let first = view.cursor().saturating_sub(visible - 1);

    for (i, item) in view.items().iter().enumerate().skip(first).take(visible) {
        let marker = match item {
            ListItem::Asset(_) if view.is_selected(i) => " [x] ",
            ListItem::Asset(_) => " [ ] ",
            ListItem::Release(_) => "",
        };
        let text = item.label();
        let line = if i == view.cursor() {
            Line::from(Span::styled(
                format!("> {}{}", marker, text),
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ))
        } else if view.is_selected(i) {
            Line::from(vec![
                Span::raw("  "),
                Span::styled(marker, Style::default().fg(Color::Green)),
                Span::raw(text),
            ])
        } else {
            Line::from(format!("  {}{}", marker, text))
        };
        lines.push(line);
    }

    if view.is_multi_select() && view.selected_count() > 0 {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("{} asset(s) selected", view.selected_count()),
            Style::default().fg(Color::DarkGray),
        )));
    }
    if let Some(notice) = notice {
        lines.push(Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(Color::Yellow),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(if view.is_multi_select() {
        ASSET_HELP
    } else {
        RELEASE_HELP
    }));
    lines
}

/// Draw the list view into `area`.
pub fn render(frame: &mut Frame, area: Rect, view: &ListView, notice: Option<&str>) {
    let lines = list_lines(view, notice, area.height as usize);
    frame.render_widget(Paragraph::new(lines), area);
}
