//! Terminal UI for afetch.
//!
//! # Module Structure
//!
//! - `list` - release and asset selection lists
//! - `progress_table` - per-asset download progress
//! - `input` - key bindings

pub mod input;
pub mod list;
pub mod progress_table;

use afetch::session::{Phase, Session};
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub use input::map_key;
pub use progress_table::{progress_rows, render_plain};

/// Draw the whole screen for the current phase.
pub fn draw(frame: &mut Frame, session: &Session) {
    let area = frame.area();
    match session.phase() {
        Phase::ChoosingRelease | Phase::ChoosingAssets => {
            list::render(frame, area, session.list(), session.notice());
        }
        Phase::Downloading | Phase::Finished => {
            let [title, table, footer] = Layout::vertical([
                Constraint::Length(2),
                Constraint::Min(1),
                Constraint::Length(2),
            ])
            .areas(area);

            let heading = if session.is_finished() {
                "Download results:"
            } else {
                "Download progress:"
            };
            frame.render_widget(
                Paragraph::new(Span::styled(
                    heading,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                title,
            );
            progress_table::render(frame, table, &progress_rows(session));

            let footer_line = match session.result() {
                Some(result) => Line::from(Span::styled(
                    result.summary.clone(),
                    Style::default().fg(Color::Yellow),
                )),
                None => Line::from(Span::styled(
                    "Press 'q' or 'ctrl+c' to cancel",
                    Style::default().fg(Color::DarkGray),
                )),
            };
            frame.render_widget(Paragraph::new(footer_line), footer);
        }
    }
}

/// Heading and plain-text table printed after the terminal is restored.
pub fn final_report(session: &Session) -> String {
    format!(
        "Download results:\n\n{}",
        render_plain(&progress_rows(session))
    )
}
