//! Documents view: uploaded document list, upload modal, delete confirmation.
//!
//! Press `u` to upload a PDF by path, `d` to delete the selected document,
//! `r` to refresh. As with the chat view, document state belongs to
//! [`Library`]; this view only tracks selection and modal input.

use std::path::PathBuf;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use super::super::layout::centered_fixed;
use super::super::theme;
use super::super::widgets::text_input::TextInput;
use crate::client::Library;
use crate::core::models::Document;

/// What the app should do after library input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryResult {
    Consumed,
    Refresh,
    Delete(String),
    Upload(PathBuf),
    /// Input was refused; show the message.
    Refused(String),
}

#[derive(Debug, Clone)]
enum LibraryModal {
    Upload { error: Option<String> },
    ConfirmDelete { id: String, filename: String },
}

#[derive(Default)]
pub struct LibraryView {
    selected: usize,
    modal: Option<LibraryModal>,
    path_input: TextInput,
}

impl LibraryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_modal(&self) -> bool {
        self.modal.is_some()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    // ── Input ────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &Event, library: &Library) -> Option<LibraryResult> {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return None;
        };

        let documents = library.documents();
        if self.selected >= documents.len() {
            self.selected = documents.len().saturating_sub(1);
        }

        if self.modal.is_some() {
            return Some(self.handle_modal_input(*code, *modifiers));
        }

        if *modifiers != KeyModifiers::NONE && *modifiers != KeyModifiers::SHIFT {
            return None;
        }

        match code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected + 1 < documents.len() {
                    self.selected += 1;
                }
                Some(LibraryResult::Consumed)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                Some(LibraryResult::Consumed)
            }
            KeyCode::Char('r') => Some(LibraryResult::Refresh),
            KeyCode::Char('u') | KeyCode::Char('a') => {
                self.path_input.clear();
                self.modal = Some(LibraryModal::Upload { error: None });
                Some(LibraryResult::Consumed)
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                let Some(doc) = documents.get(self.selected) else {
                    return Some(LibraryResult::Consumed);
                };
                match doc.id() {
                    Some(id) => {
                        self.modal = Some(LibraryModal::ConfirmDelete {
                            id: id.to_string(),
                            filename: doc.filename.clone(),
                        });
                        Some(LibraryResult::Consumed)
                    }
                    None => Some(LibraryResult::Refused(format!(
                        "{} has no document id and cannot be deleted",
                        doc.filename
                    ))),
                }
            }
            _ => None,
        }
    }

    fn handle_modal_input(&mut self, code: KeyCode, modifiers: KeyModifiers) -> LibraryResult {
        let Some(modal) = self.modal.clone() else {
            return LibraryResult::Consumed;
        };

        match modal {
            LibraryModal::ConfirmDelete { id, .. } => match code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    self.modal = None;
                    LibraryResult::Delete(id)
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.modal = None;
                    LibraryResult::Consumed
                }
                _ => LibraryResult::Consumed,
            },
            LibraryModal::Upload { .. } => match (modifiers, code) {
                (_, KeyCode::Esc) => {
                    self.modal = None;
                    LibraryResult::Consumed
                }
                (_, KeyCode::Enter) => {
                    if self.path_input.is_blank() {
                        self.modal = Some(LibraryModal::Upload {
                            error: Some("Enter the path of a PDF file".to_string()),
                        });
                        return LibraryResult::Consumed;
                    }
                    self.modal = None;
                    LibraryResult::Upload(expand_path(self.path_input.take().trim()))
                }
                (_, KeyCode::Backspace) => {
                    self.path_input.backspace();
                    LibraryResult::Consumed
                }
                (_, KeyCode::Delete) => {
                    self.path_input.delete();
                    LibraryResult::Consumed
                }
                (_, KeyCode::Left) => {
                    self.path_input.left();
                    LibraryResult::Consumed
                }
                (_, KeyCode::Right) => {
                    self.path_input.right();
                    LibraryResult::Consumed
                }
                (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
                    self.path_input.insert(c);
                    LibraryResult::Consumed
                }
                _ => LibraryResult::Consumed,
            },
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect, library: &Library) {
        let chunks = Layout::vertical([
            Constraint::Length(3), // Summary
            Constraint::Min(1),    // Table
        ])
        .split(area);

        self.render_summary(frame, chunks[0], library);
        self.render_table(frame, chunks[1], library);

        match &self.modal {
            Some(LibraryModal::Upload { error }) => {
                self.render_upload_modal(frame, area, error.as_deref())
            }
            Some(LibraryModal::ConfirmDelete { filename, .. }) => {
                render_confirm_modal(frame, area, filename)
            }
            None => {}
        }
    }

    fn render_summary(&self, frame: &mut Frame, area: Rect, library: &Library) {
        let count = library.documents().len();
        let mut spans = vec![
            Span::styled(format!(" {count} "), theme::highlight()),
            Span::raw(if count == 1 { "document" } else { "documents" }),
            Span::styled("  ·  ", theme::dim()),
            Span::styled(format!("{}", library.total_chunks()), theme::highlight()),
            Span::raw(" chunks indexed"),
        ];

        if library.is_refreshing() {
            spans.push(Span::styled("  refreshing...", theme::muted()));
        }
        if let Some(name) = library.uploading() {
            spans.push(Span::styled(format!("  uploading {name}..."), Style::default().fg(theme::INFO)));
        }
        if let Some(id) = library.deleting() {
            spans.push(Span::styled(format!("  deleting {id}..."), Style::default().fg(theme::ERROR)));
        }

        let block = theme::block_default("Library");
        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }

    fn render_table(&self, frame: &mut Frame, area: Rect, library: &Library) {
        let block = theme::block_focused("Documents").title_bottom(Line::styled(
            " j/k:select  u:upload  d:delete  r:refresh ",
            theme::key_hint(),
        ));

        let documents = library.documents();
        if documents.is_empty() {
            let hint = if library.is_refreshing() {
                "  Loading documents..."
            } else {
                "  No documents yet. Press u to upload a PDF."
            };
            frame.render_widget(Paragraph::new(Line::styled(hint, theme::muted())).block(block), area);
            return;
        }

        let header = Row::new(["Filename", "Chunks", "Uploaded", "Status"]).style(theme::heading());
        let rows = documents.iter().map(document_row);
        let table = Table::new(
            rows,
            [
                Constraint::Min(20),
                Constraint::Length(8),
                Constraint::Length(18),
                Constraint::Length(12),
            ],
        )
        .header(header)
        .row_highlight_style(theme::selected_row())
        .highlight_symbol("▶ ")
        .block(block);

        let mut state = TableState::default().with_selected(Some(self.selected.min(documents.len() - 1)));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_upload_modal(&self, frame: &mut Frame, area: Rect, error: Option<&str>) {
        let modal = centered_fixed(64, 8, area);
        frame.render_widget(Clear, modal);

        let block = Block::default()
            .title(" Upload PDF ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT));
        let inner = block.inner(modal);
        frame.render_widget(block, modal);

        let mut lines = vec![
            Line::styled("Path to a PDF file:", theme::muted()),
            self.path_input.line(true, ""),
            Line::raw(""),
        ];
        if let Some(error) = error {
            lines.push(Line::styled(error.to_string(), Style::default().fg(theme::ERROR)));
        }
        lines.push(Line::styled("Enter:upload  Esc:cancel", theme::key_hint()));
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

fn render_confirm_modal(frame: &mut Frame, area: Rect, filename: &str) {
    let modal = centered_fixed(56, 6, area);
    frame.render_widget(Clear, modal);

    let block = Block::default()
        .title(" Delete document ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::ERROR));
    let lines = vec![
        Line::from(vec![
            Span::raw("Delete "),
            Span::styled(filename.to_string(), theme::highlight()),
            Span::raw("?"),
        ]),
        Line::styled("Its chunks are removed from the index.", theme::muted()),
        Line::styled("y:delete  n:cancel", theme::key_hint()),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), modal);
}

fn document_row(doc: &Document) -> Row<'static> {
    let uploaded = doc
        .uploaded_at()
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| doc.upload_date.clone());
    let status = match (&doc.status, doc.id()) {
        (Some(status), _) => status.clone(),
        (None, None) => "no id".to_string(),
        (None, Some(_)) => "ready".to_string(),
    };

    Row::new([
        Cell::from(doc.filename.clone()),
        Cell::from(doc.chunks_count.to_string()),
        Cell::from(uploaded),
        Cell::from(status),
    ])
}

/// Expand a leading `~/` to the home directory.
fn expand_path(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(raw)),
        None => PathBuf::from(raw),
    }
}
