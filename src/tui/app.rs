use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use super::events::{Action, AppEvent, Focus};
use super::layout::{centered_rect, AppLayout};
use super::theme;
use super::views::chat::{ChatInputMode, ChatResult, ChatView};
use super::views::library::{LibraryResult, LibraryView};
use crate::client::{FollowUp, Page, ToastKind, UploadFile};

/// Central application state (Elm architecture).
///
/// Network calls never run on the render loop. They are spawned as tasks and
/// their results come back through `event_rx`, where they are applied to the
/// [`Page`] in arrival order.
pub struct AppState {
    /// Whether the app is still running.
    pub running: bool,
    /// Currently focused top-level view.
    pub focus: Focus,
    /// Session, conversation, library and toast.
    pub page: Page,
    pub chat_view: ChatView,
    pub library_view: LibraryView,
    /// Whether the help modal is open.
    pub show_help: bool,
    /// Receiver for background task results.
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    /// Sender handed to spawned tasks.
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl AppState {
    pub fn new(
        page: Page,
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            running: true,
            focus: Focus::Chat,
            page,
            chat_view: ChatView::new(),
            library_view: LibraryView::new(),
            show_help: false,
            event_rx,
            event_tx,
        }
    }

    // ── Elm event loop ──────────────────────────────────────────────────

    /// Main event loop: render → select → update → loop.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        tick_rate: Duration,
    ) -> io::Result<()> {
        let mut tick_interval = tokio::time::interval(tick_rate);
        let mut event_stream = EventStream::new();

        // The document list loads once on startup.
        self.dispatch_refresh();

        while self.running {
            terminal.draw(|frame| self.render(frame))?;

            tokio::select! {
                _ = tick_interval.tick() => {
                    self.on_tick();
                }
                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event);
                }
                Some(Ok(crossterm_event)) = event_stream.next() => {
                    self.handle_event(AppEvent::Input(crossterm_event));
                }
            }
        }

        Ok(())
    }

    // ── Event handling ──────────────────────────────────────────────────

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(crossterm_event) => {
                // Priority 1: Help modal
                if self.show_help {
                    if let Some(action) = map_help_input(&crossterm_event) {
                        self.handle_action(action);
                    }
                    return;
                }

                // Priority 2: Focused view
                if self.dispatch_view_input(&crossterm_event) {
                    return;
                }

                // Priority 3: Global keybindings
                if let Some(action) = map_input_to_action(&crossterm_event) {
                    self.handle_action(action);
                }
            }
            AppEvent::Action(action) => self.handle_action(action),
            AppEvent::Tick => self.on_tick(),
            AppEvent::ChatAnswered(result) => {
                self.page.finish_send(result);
                self.chat_view.follow_tail();
            }
            AppEvent::FeedbackSent(result) => self.page.finish_rating(result),
            AppEvent::DocumentsLoaded(result) => self.page.finish_refresh(result),
            AppEvent::DocumentDeleted(result) => {
                if self.page.finish_delete(result) == FollowUp::Refresh {
                    self.dispatch_refresh();
                }
            }
            AppEvent::UploadFileRead(Ok(file)) => self.dispatch_upload(file),
            AppEvent::UploadFileRead(Err(e)) => {
                self.page.notify(ToastKind::Error, e.to_string());
            }
            AppEvent::UploadFinished(result) => {
                if self.page.finish_upload(result) == FollowUp::Refresh {
                    self.dispatch_refresh();
                }
            }
            AppEvent::Quit => {
                self.running = false;
            }
        }
    }

    /// Dispatch input to the focused view. Returns true if consumed.
    fn dispatch_view_input(&mut self, event: &Event) -> bool {
        match self.focus {
            Focus::Chat => match self.chat_view.handle_input(event, self.page.chat()) {
                Some(ChatResult::Consumed) => true,
                Some(ChatResult::Send(text)) => {
                    self.dispatch_send(&text);
                    true
                }
                Some(ChatResult::ToggleFeedback(index)) => {
                    self.page.toggle_feedback(index);
                    true
                }
                Some(ChatResult::Rate { index, rating }) => {
                    self.dispatch_rating(index, rating);
                    true
                }
                None => false,
            },
            Focus::Library => match self.library_view.handle_input(event, self.page.library()) {
                Some(LibraryResult::Consumed) => true,
                Some(LibraryResult::Refresh) => {
                    self.dispatch_refresh();
                    true
                }
                Some(LibraryResult::Delete(id)) => {
                    self.dispatch_delete(id);
                    true
                }
                Some(LibraryResult::Upload(path)) => {
                    self.dispatch_upload_read(path);
                    true
                }
                Some(LibraryResult::Refused(message)) => {
                    self.page.notify(ToastKind::Error, message);
                    true
                }
                None => false,
            },
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::FocusChat => self.focus = Focus::Chat,
            Action::FocusLibrary => self.focus = Focus::Library,
            Action::TabNext => self.focus = self.focus.next(),
            Action::TabPrev => self.focus = self.focus.prev(),
            Action::ShowHelp => self.show_help = true,
            Action::CloseHelp => self.show_help = false,
            Action::RefreshLibrary => self.dispatch_refresh(),
            Action::DismissToast => self.page.dismiss_toast(),
            Action::Quit => self.running = false,
        }
    }

    fn on_tick(&mut self) {
        self.page.tick(Instant::now());
    }

    // ── Background calls ────────────────────────────────────────────────

    fn dispatch_send(&mut self, text: &str) {
        let Some(request) = self.page.begin_send(text) else {
            return;
        };
        let api = self.page.api();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = api.chat(request).await;
            let _ = tx.send(AppEvent::ChatAnswered(result));
        });
    }

    fn dispatch_rating(&mut self, index: usize, rating: u8) {
        let Some(feedback) = self.page.begin_rating(index, rating) else {
            return;
        };
        let api = self.page.api();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = api.submit_feedback(feedback).await;
            let _ = tx.send(AppEvent::FeedbackSent(result));
        });
    }

    fn dispatch_refresh(&mut self) {
        if !self.page.begin_refresh() {
            return;
        }
        let api = self.page.api();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = api.list_documents().await;
            let _ = tx.send(AppEvent::DocumentsLoaded(result));
        });
    }

    fn dispatch_delete(&mut self, id: String) {
        if !self.page.begin_delete(&id) {
            return;
        }
        let api = self.page.api();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = api.delete_document(id).await;
            let _ = tx.send(AppEvent::DocumentDeleted(result));
        });
    }

    fn dispatch_upload_read(&mut self, path: PathBuf) {
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = UploadFile::from_path(&path).await;
            let _ = tx.send(AppEvent::UploadFileRead(result));
        });
    }

    fn dispatch_upload(&mut self, file: UploadFile) {
        if !self.page.begin_upload(&file) {
            return;
        }
        log::info!("Uploading {} ({} bytes)", file.filename, file.data.len());
        let api = self.page.api();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = api.upload(file).await;
            let _ = tx.send(AppEvent::UploadFinished(result));
        });
    }

    // ── Rendering ───────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let layout = AppLayout::compute(area);

        self.render_tabs(frame, layout.tabs);
        match self.focus {
            Focus::Chat => self.chat_view.render(frame, layout.main, self.page.chat()),
            Focus::Library => self.library_view.render(frame, layout.main, self.page.library()),
        }
        self.render_status_bar(frame, layout.status);

        // Overlays
        self.render_toast(frame, area);

        if self.show_help {
            render_help_modal(frame, area);
        }
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles = Focus::ALL
            .iter()
            .enumerate()
            .map(|(i, f)| format!(" {} {} ", i + 1, f.label()));
        let selected = Focus::ALL.iter().position(|&f| f == self.focus).unwrap_or(0);
        let tabs = Tabs::new(titles)
            .select(selected)
            .style(theme::muted())
            .highlight_style(theme::selected_row())
            .divider("│");
        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let activity = if self.page.chat().is_awaiting() {
            Span::styled("answering", Style::default().fg(theme::PRIMARY_LIGHT))
        } else if let Some(name) = self.page.library().uploading() {
            Span::styled(format!("uploading {name}"), Style::default().fg(theme::INFO))
        } else {
            Span::styled("ready", Style::default().fg(theme::TEXT_MUTED))
        };

        let mode_indicator = match self.chat_view.input_mode() {
            ChatInputMode::Insert if self.focus == Focus::Chat => {
                Span::styled(" INSERT ", theme::insert_badge())
            }
            _ => Span::raw(""),
        };

        let session: String = self.page.session().as_str().chars().take(8).collect();

        let status = Line::from(vec![
            Span::styled(" FINQA ", theme::brand_badge()),
            Span::raw(" "),
            mode_indicator,
            Span::raw(" "),
            Span::styled(
                self.focus.label(),
                Style::default()
                    .fg(theme::PRIMARY_LIGHT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" │ "),
            activity,
            Span::raw(" │ "),
            Span::styled("session ", theme::key_hint()),
            Span::styled(session, theme::muted()),
            Span::raw(" │ "),
            Span::styled("Tab", theme::key_hint()),
            Span::raw(":nav "),
            Span::styled("?", theme::key_hint()),
            Span::raw(":help "),
            Span::styled("q", theme::key_hint()),
            Span::raw(":quit"),
        ]);

        frame.render_widget(Paragraph::new(status), area);
    }

    fn render_toast(&self, frame: &mut Frame, area: Rect) {
        let Some(toast) = self.page.toast().current() else {
            return;
        };

        let (prefix, color) = match toast.kind {
            ToastKind::Info => ("ℹ", theme::INFO),
            ToastKind::Success => ("✓", theme::SUCCESS),
            ToastKind::Error => ("✗", theme::ERROR),
        };

        let max_width = 60.min(area.width.saturating_sub(2));
        let x = area.width.saturating_sub(max_width + 1);
        let toast_area = Rect::new(x, 1, max_width, 1);

        let line = Line::from(vec![
            Span::styled(format!(" {prefix} "), Style::default().fg(color).bold()),
            Span::raw(toast.message.clone()),
        ]);

        frame.render_widget(Clear, toast_area);
        frame.render_widget(Paragraph::new(line), toast_area);
    }
}

fn map_input_to_action(event: &Event) -> Option<Action> {
    let Event::Key(KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        ..
    }) = event
    else {
        return None;
    };

    match (*modifiers, *code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(Action::Quit),
        (KeyModifiers::CONTROL, KeyCode::Char('r')) => Some(Action::RefreshLibrary),
        (KeyModifiers::NONE | KeyModifiers::SHIFT, code) => match code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('?') => Some(Action::ShowHelp),
            KeyCode::Tab => Some(Action::TabNext),
            KeyCode::BackTab => Some(Action::TabPrev),
            KeyCode::Char('1') => Some(Action::FocusChat),
            KeyCode::Char('2') => Some(Action::FocusLibrary),
            KeyCode::Esc => Some(Action::DismissToast),
            _ => None,
        },
        _ => None,
    }
}

fn map_help_input(event: &Event) -> Option<Action> {
    let Event::Key(KeyEvent {
        code,
        kind: KeyEventKind::Press,
        ..
    }) = event
    else {
        return None;
    };

    match code {
        KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => Some(Action::CloseHelp),
        _ => None,
    }
}

fn render_help_modal(frame: &mut Frame, area: Rect) {
    let modal = centered_rect(60, 80, area);

    let keybindings = [
        ("Global:", ""),
        ("q", "Quit"),
        ("?", "Toggle this help"),
        ("Tab / Shift+Tab", "Next / previous view"),
        ("1-2", "Jump to view by number"),
        ("Ctrl+R", "Refresh documents"),
        ("Ctrl+C", "Force quit"),
        ("Esc", "Dismiss notification"),
        ("", ""),
        ("Chat View:", ""),
        ("i / Enter", "Type a question"),
        ("Enter (typing)", "Send question"),
        ("Up / Down", "Pick an example question (empty chat)"),
        ("Esc", "Stop typing"),
        ("j/k", "Scroll messages"),
        ("G / g", "Jump to bottom / top"),
        ("n / p", "Select next / previous answer"),
        ("f", "Open rating for selected answer"),
        ("1-5", "Rate the selected answer"),
        ("", ""),
        ("Documents View:", ""),
        ("j/k", "Select document"),
        ("u", "Upload a PDF"),
        ("d", "Delete selected document"),
        ("r", "Refresh list"),
    ];

    let mut lines = vec![
        Line::raw(""),
        Line::from(Span::styled(" Keybindings", theme::title())),
        Line::raw(""),
    ];

    for (key, desc) in keybindings {
        if key.is_empty() {
            lines.push(Line::raw(""));
        } else if desc.is_empty() {
            lines.push(Line::from(Span::styled(format!("  {key}"), theme::title())));
        } else {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(
                    format!("{key:<22}"),
                    Style::default().fg(theme::PRIMARY_LIGHT).bold(),
                ),
                Span::raw(desc),
            ]));
        }
    }

    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::raw("  Press "),
        Span::styled("?", Style::default().fg(theme::PRIMARY_LIGHT).bold()),
        Span::raw(" or "),
        Span::styled("Esc", Style::default().fg(theme::PRIMARY_LIGHT).bold()),
        Span::raw(" to close"),
    ]));

    let block = Block::default()
        .title(" Help ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::ACCENT));

    frame.render_widget(Clear, modal);
    frame.render_widget(Paragraph::new(lines).block(block), modal);
}
