//! Per-asset progress table.
//!
//! ```text
//! Filename                                 Status          Tag                            Progress
//! tool-1.2-linux.tar.gz                    [✓]             v1.2                           4.1MB / 4.1MB
//! tool-1.2-darwin.tar.gz                   [-]             v1.2                           1.0MB / 3.9MB
//! tool-1.2-windows.zip                     [ ]             v1.2                           0B / 4.4MB
//! ```
//!
//! The same rows feed both the ratatui table and the plain-text table
//! printed after the terminal is restored.

use afetch::catalog::AssetDescriptor;
use afetch::download::DownloadProgress;
use afetch::format::{format_size, truncate};
use afetch::session::Session;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Row, Table},
    Frame,
};

/// Column widths in characters.
pub const NAME_WIDTH: usize = 40;
pub const STATUS_WIDTH: usize = 15;
pub const TAG_WIDTH: usize = 30;

const DONE: &str = "[✓]";
const ACTIVE: &str = "[-]";
const PENDING: &str = "[ ]";
const FAILED: &str = "[✗]";

/// One table row, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRow {
    pub name: String,
    pub status: &'static str,
    pub tag: String,
    pub progress: String,
}

/// Status glyph and `downloaded / total` text for one entry.
pub fn format_progress(asset: &AssetDescriptor, progress: &DownloadProgress) -> (&'static str, String) {
    if progress.completed {
        let size = [progress.total, asset.size, progress.downloaded]
            .into_iter()
            .find(|&s| s > 0)
            .unwrap_or(0);
        return (DONE, format!("{} / {}", bytes(size), bytes(size)));
    }

    let total = if progress.total > 0 {
        progress.total
    } else {
        asset.size
    };
    let status = if progress.downloaded > 0 || progress.total > 0 {
        ACTIVE
    } else {
        PENDING
    };
    (status, format!("{} / {}", bytes(progress.downloaded), format_size(total)))
}

/// Like `format_size`, but a zero count is `0B` rather than `Unknown`.
fn bytes(n: u64) -> String {
    if n == 0 {
        "0B".to_string()
    } else {
        format_size(n)
    }
}

/// Rows for every queued asset; failed entries get their own glyph.
pub fn progress_rows(session: &Session) -> Vec<ProgressRow> {
    let queue = session.queue();
    queue
        .assets()
        .iter()
        .zip(queue.progress())
        .enumerate()
        .map(|(i, (asset, progress))| {
            let (status, text) = format_progress(asset, progress);
            ProgressRow {
                name: truncate(&asset.name, NAME_WIDTH),
                status: if session.is_failed(i) { FAILED } else { status },
                tag: truncate(&asset.release_tag, TAG_WIDTH),
                progress: text,
            }
        })
        .collect()
}

/// Fixed-width text table with a header line.
pub fn render_plain(rows: &[ProgressRow]) -> String {
    let mut out = format!(
        "{:<nw$} {:<sw$} {:<tw$} {}\n",
        "Filename",
        "Status",
        "Tag",
        "Progress",
        nw = NAME_WIDTH,
        sw = STATUS_WIDTH,
        tw = TAG_WIDTH
    );
    for row in rows {
        out.push_str(&format!(
            "{:<nw$} {:<sw$} {:<tw$} {}\n",
            row.name,
            row.status,
            row.tag,
            row.progress,
            nw = NAME_WIDTH,
            sw = STATUS_WIDTH,
            tw = TAG_WIDTH
        ));
    }
    out
}

/// Draw the table into `area`.
pub fn render(frame: &mut Frame, area: Rect, rows: &[ProgressRow]) {
    let header = Row::new(vec!["Filename", "Status", "Tag", "Progress"]).style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let body = rows.iter().map(|row| {
        let color = match row.status {
            DONE => Color::Green,
            ACTIVE => Color::Cyan,
            FAILED => Color::Red,
            _ => Color::DarkGray,
        };
        Row::new(vec![
            row.name.clone(),
            row.status.to_string(),
            row.tag.clone(),
            row.progress.clone(),
        ])
        .style(Style::default().fg(color))
    });

    let widths = [
        Constraint::Length(NAME_WIDTH as u16),
        Constraint::Length(STATUS_WIDTH as u16),
        Constraint::Length(TAG_WIDTH as u16),
        Constraint::Min(10),
    ];
    frame.render_widget(Table::new(body, widths).header(header), area);
}
