//! Chat view: conversation log, citations, rating, question input.
//!
//! The view owns only presentation state (input text, scroll, selection).
//! Conversation state lives in [`ChatState`] and is read here, never written.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

use super::super::theme;
use super::super::widgets::text_input::TextInput;
use crate::client::ChatState;
use crate::core::models::{Message, Role};

const EXCERPT_CHARS: usize = 160;

/// Starter questions offered while the conversation is empty.
pub const EXAMPLE_QUESTIONS: [&str; 5] = [
    "What is the total revenue for 2025?",
    "What is the year-over-year operating profit growth rate?",
    "What are the main cost items?",
    "How is the cash flow situation?",
    "What is the debt ratio?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatInputMode {
    Normal,
    Insert,
}

/// What the app should do after chat input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatResult {
    Consumed,
    Send(String),
    ToggleFeedback(usize),
    Rate { index: usize, rating: u8 },
}

pub struct ChatView {
    input: TextInput,
    input_mode: ChatInputMode,
    scroll_offset: usize,
    auto_scroll: bool,
    /// Index into the message log of the answer selected for rating.
    selected: Option<usize>,
    /// Highlighted starter question, only meaningful while the log is empty.
    example: Option<usize>,
}

impl Default for ChatView {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatView {
    pub fn new() -> Self {
        Self {
            input: TextInput::new(),
            input_mode: ChatInputMode::Insert,
            scroll_offset: 0,
            auto_scroll: true,
            selected: None,
            example: None,
        }
    }

    pub fn input_mode(&self) -> ChatInputMode {
        self.input_mode
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn example(&self) -> Option<usize> {
        self.example
    }

    /// Move the starter highlight and copy that question into the input.
    fn pick_example(&mut self, forward: bool) {
        let last = EXAMPLE_QUESTIONS.len() - 1;
        let next = match (self.example, forward) {
            (None, true) => 0,
            (None, false) => last,
            (Some(i), true) => (i + 1) % EXAMPLE_QUESTIONS.len(),
            (Some(i), false) => i.checked_sub(1).unwrap_or(last),
        };
        self.example = Some(next);
        self.input.set(EXAMPLE_QUESTIONS[next]);
    }

    /// Jump back to the newest message, e.g. after a new answer arrives.
    pub fn follow_tail(&mut self) {
        self.auto_scroll = true;
    }

    // ── Input ────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &Event, chat: &ChatState) -> Option<ChatResult> {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return None;
        };

        match self.input_mode {
            ChatInputMode::Insert => self.handle_insert_input(*code, *modifiers, chat),
            ChatInputMode::Normal => self.handle_normal_input(*code, *modifiers, chat),
        }
    }

    fn handle_insert_input(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
        chat: &ChatState,
    ) -> Option<ChatResult> {
        match (modifiers, code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => return None,
            (_, KeyCode::Tab) | (_, KeyCode::BackTab) => return None,
            (KeyModifiers::NONE, KeyCode::Esc) => {
                self.input_mode = ChatInputMode::Normal;
                return Some(ChatResult::Consumed);
            }
            _ => {}
        }

        // Input is disabled while an answer is pending.
        if chat.is_awaiting() {
            return Some(ChatResult::Consumed);
        }

        match (modifiers, code) {
            (KeyModifiers::NONE, KeyCode::Enter) => {
                if self.input.is_blank() {
                    return Some(ChatResult::Consumed);
                }
                self.auto_scroll = true;
                self.example = None;
                Some(ChatResult::Send(self.input.take()))
            }
            (KeyModifiers::NONE, KeyCode::Down | KeyCode::Up) if chat.messages().is_empty() => {
                self.pick_example(code == KeyCode::Down);
                Some(ChatResult::Consumed)
            }
            (KeyModifiers::NONE, KeyCode::Backspace) => {
                self.input.backspace();
                Some(ChatResult::Consumed)
            }
            (KeyModifiers::NONE, KeyCode::Delete) => {
                self.input.delete();
                Some(ChatResult::Consumed)
            }
            (KeyModifiers::NONE, KeyCode::Left) => {
                self.input.left();
                Some(ChatResult::Consumed)
            }
            (KeyModifiers::NONE, KeyCode::Right) => {
                self.input.right();
                Some(ChatResult::Consumed)
            }
            (KeyModifiers::NONE, KeyCode::Home) | (KeyModifiers::CONTROL, KeyCode::Char('a')) => {
                self.input.home();
                Some(ChatResult::Consumed)
            }
            (KeyModifiers::NONE, KeyCode::End) | (KeyModifiers::CONTROL, KeyCode::Char('e')) => {
                self.input.end();
                Some(ChatResult::Consumed)
            }
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
                self.input.clear();
                Some(ChatResult::Consumed)
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
                self.input.insert(c);
                Some(ChatResult::Consumed)
            }
            _ => Some(ChatResult::Consumed),
        }
    }

    fn handle_normal_input(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
        chat: &ChatState,
    ) -> Option<ChatResult> {
        if modifiers != KeyModifiers::NONE && modifiers != KeyModifiers::SHIFT {
            return None;
        }

        match code {
            KeyCode::Char('i') | KeyCode::Enter => {
                self.input_mode = ChatInputMode::Insert;
                Some(ChatResult::Consumed)
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll_down(1);
                Some(ChatResult::Consumed)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll_up(1);
                Some(ChatResult::Consumed)
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.auto_scroll = true;
                Some(ChatResult::Consumed)
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.scroll_offset = 0;
                self.auto_scroll = false;
                Some(ChatResult::Consumed)
            }
            KeyCode::PageDown => {
                self.scroll_down(10);
                Some(ChatResult::Consumed)
            }
            KeyCode::PageUp => {
                self.scroll_up(10);
                Some(ChatResult::Consumed)
            }
            KeyCode::Char('n') => {
                self.selected = next_answer(chat.messages(), self.selected, true);
                Some(ChatResult::Consumed)
            }
            KeyCode::Char('p') => {
                self.selected = next_answer(chat.messages(), self.selected, false);
                Some(ChatResult::Consumed)
            }
            KeyCode::Esc => {
                self.selected = None;
                Some(ChatResult::Consumed)
            }
            KeyCode::Char('f') => {
                let index = self.selected?;
                Some(ChatResult::ToggleFeedback(index))
            }
            KeyCode::Char(c @ '1'..='5') => {
                let index = self.selected?;
                let open = chat.messages().get(index).is_some_and(|m| m.feedback_open);
                if !open {
                    return Some(ChatResult::Consumed);
                }
                let rating = c.to_digit(10).and_then(|d| u8::try_from(d).ok())?;
                Some(ChatResult::Rate { index, rating })
            }
            _ => None,
        }
    }

    fn scroll_down(&mut self, n: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(n);
        self.auto_scroll = false;
    }

    fn scroll_up(&mut self, n: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(n);
        self.auto_scroll = false;
    }

    // ── Rendering ────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect, chat: &ChatState) {
        let chunks = Layout::vertical([
            Constraint::Min(1),    // Messages
            Constraint::Length(3), // Input
        ])
        .split(area);

        self.render_messages(frame, chunks[0], chat);
        self.render_input(frame, chunks[1], chat);
    }

    fn render_messages(&self, frame: &mut Frame, area: Rect, chat: &ChatState) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::TEXT_MUTED))
            .title(" Conversation ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if chat.messages().is_empty() {
            let mut welcome = vec![
                Line::raw(""),
                Line::styled("  Ask about your financial documents", theme::title()),
                Line::styled(
                    "  Upload PDFs from the Documents tab first (Tab to switch).",
                    theme::muted(),
                ),
                Line::raw(""),
                Line::styled("  Try one of these (Up/Down to pick, Enter to ask):", theme::heading()),
            ];
            for (i, question) in EXAMPLE_QUESTIONS.iter().enumerate() {
                welcome.push(if self.example == Some(i) {
                    Line::styled(format!("  ▶ {question}"), theme::highlight())
                } else {
                    Line::styled(format!("  • {question}"), theme::muted())
                });
            }
            frame.render_widget(Paragraph::new(welcome), inner);
            return;
        }

        let width = usize::from(inner.width.saturating_sub(1)).max(10);

        let mut all_lines: Vec<Line> = chat
            .messages()
            .iter()
            .enumerate()
            .flat_map(|(i, m)| message_lines(m, self.selected == Some(i), width))
            .collect();
        if chat.is_awaiting() {
            all_lines.push(Line::styled("  Analyzing documents...", theme::muted()));
        }

        let visible_height = usize::from(inner.height);
        let total = all_lines.len();
        let max_scroll = total.saturating_sub(visible_height);
        let effective_scroll = if self.auto_scroll {
            max_scroll
        } else {
            self.scroll_offset.min(max_scroll)
        };

        let visible: Vec<Line> = all_lines
            .into_iter()
            .skip(effective_scroll)
            .take(visible_height)
            .collect();
        frame.render_widget(Paragraph::new(visible), inner);

        if total > visible_height {
            let mut scrollbar_state = ScrollbarState::new(total)
                .position(effective_scroll)
                .viewport_content_length(visible_height);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                area,
                &mut scrollbar_state,
            );
        }
    }

    fn render_input(&self, frame: &mut Frame, area: Rect, chat: &ChatState) {
        let awaiting = chat.is_awaiting();
        let active = self.input_mode == ChatInputMode::Insert && !awaiting;

        let (border_color, title) = match (self.input_mode, awaiting) {
            (_, true) => (theme::TEXT_DIM, " Question (waiting for answer) "),
            (ChatInputMode::Insert, false) => (theme::ACCENT, " Question (Esc for normal mode) "),
            (ChatInputMode::Normal, false) => (theme::TEXT_MUTED, " Question (i to type) "),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(title);

        let line = self.input.line(active, "Ask a question about your documents...");
        let paragraph = if awaiting {
            Paragraph::new(line).style(theme::dim())
        } else {
            Paragraph::new(line)
        };
        frame.render_widget(paragraph.block(block), area);
    }
}

/// Next (or previous) rateable answer from `from`, wrapping around.
fn next_answer(messages: &[Message], from: Option<usize>, forward: bool) -> Option<usize> {
    let answers: Vec<usize> = messages
        .iter()
        .enumerate()
        .filter(|(_, m)| m.role == Role::Assistant && !m.is_error)
        .map(|(i, _)| i)
        .collect();
    if answers.is_empty() {
        return None;
    }

    let pos = from.and_then(|idx| answers.iter().position(|&i| i == idx));
    let next = match (pos, forward) {
        (None, true) => 0,
        (None, false) => answers.len() - 1,
        (Some(p), true) => (p + 1) % answers.len(),
        (Some(p), false) => (p + answers.len() - 1) % answers.len(),
    };
    Some(answers[next])
}

/// Greedy word wrap. Words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for raw_line in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;
        for word in raw_line.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if current_len > 0 {
                    out.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(width);
                out.push(word.into_iter().collect());
                word = rest;
            }
            let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
            if needed > width && current_len > 0 {
                out.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current_len += word.len();
            current.extend(word);
        }
        out.push(current);
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

fn stars(rating: u8) -> String {
    (1..=5).map(|i| if i <= rating { '★' } else { '☆' }).collect()
}

fn message_lines(message: &Message, selected: bool, width: usize) -> Vec<Line<'static>> {
    let marker = if selected { "▶ " } else { "" };
    let (label, color) = match (message.role, message.is_error) {
        (Role::User, _) => ("You", theme::USER),
        (Role::Assistant, false) => ("Assistant", theme::ASSISTANT),
        (Role::Assistant, true) => ("Assistant (error)", theme::ERROR),
    };

    let mut lines = vec![Line::from(Span::styled(
        format!("{marker}── {label} ──"),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))];

    let body_style = if message.is_error {
        Style::default().fg(theme::ERROR)
    } else {
        Style::default().fg(theme::TEXT)
    };
    lines.extend(
        wrap(&message.content, width)
            .into_iter()
            .map(|l| Line::styled(l, body_style)),
    );

    if !message.sources.is_empty() {
        lines.push(Line::styled("  Sources:", theme::heading()));
        for (n, source) in message.sources.iter().enumerate() {
            let name = source.filename().unwrap_or("document");
            lines.push(Line::from(vec![
                Span::styled(format!("  [{}] ", n + 1), theme::highlight()),
                Span::raw(format!("{name} p.{}", source.page)),
                Span::styled(format!(" ({:.2})", source.score), theme::muted()),
            ]));
            for excerpt in wrap(&source.excerpt(EXCERPT_CHARS), width.saturating_sub(6).max(10)) {
                lines.push(Line::styled(format!("      {excerpt}"), theme::dim()));
            }
        }
    }

    if let Some(secs) = message.processing_time {
        lines.push(Line::styled(format!("  answered in {secs:.1}s"), theme::muted()));
    }

    if let Some(rating) = message.rating {
        lines.push(Line::from(vec![
            Span::styled("  Rated ", theme::muted()),
            Span::styled(stars(rating), Style::default().fg(theme::STAR)),
        ]));
    } else if message.feedback_open {
        lines.push(Line::from(vec![
            Span::styled("  Rate this answer: ", theme::highlight()),
            Span::styled(stars(0), Style::default().fg(theme::STAR)),
            Span::styled("  press 1-5", theme::muted()),
        ]));
    } else if selected && message.can_rate() {
        lines.push(Line::styled("  f: rate this answer", theme::key_hint()));
    }

    lines.push(Line::raw(""));
    lines
}
