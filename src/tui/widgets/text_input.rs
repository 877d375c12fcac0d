//! Single-line text input with a char-indexed cursor.

use ratatui::{
    style::Style,
    text::{Line, Span},
};

use super::super::theme;

#[derive(Debug, Default, Clone)]
pub struct TextInput {
    chars: Vec<char>,
    /// Cursor position in chars, `0..=chars.len()`.
    cursor: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, c: char) {
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.chars.remove(self.cursor);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.chars.len());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.chars.len();
    }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }

    /// Replace the content and put the cursor at the end.
    pub fn set(&mut self, value: &str) {
        self.chars = value.chars().collect();
        self.cursor = self.chars.len();
    }

    /// Take the content out, leaving the input empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.chars).into_iter().collect()
    }

    pub fn value(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_blank(&self) -> bool {
        self.chars.iter().all(|c| c.is_whitespace())
    }

    /// Render as a single line. The cursor cell is only drawn when `active`.
    pub fn line(&self, active: bool, placeholder: &str) -> Line<'static> {
        if self.chars.is_empty() && !active {
            return Line::styled(placeholder.to_string(), theme::muted());
        }
        if !active {
            return Line::raw(self.value());
        }

        let before: String = self.chars[..self.cursor].iter().collect();
        let at = self.chars.get(self.cursor).copied().unwrap_or(' ');
        let after: String = self
            .chars
            .get(self.cursor + 1..)
            .map(|rest| rest.iter().collect())
            .unwrap_or_default();

        Line::from(vec![
            Span::raw(before),
            Span::styled(at.to_string(), Style::default().bg(theme::TEXT).fg(theme::BG_BASE)),
            Span::raw(after),
        ])
    }
}
