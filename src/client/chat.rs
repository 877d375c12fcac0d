//! Conversation state machine.
//!
//! One exchange moves `idle -> awaiting -> resolved | error_resolved`. The
//! network call happens between [`ChatState::begin_send`] and
//! [`ChatState::complete_send`], driven by whoever owns the state.

use super::api::ApiError;
use super::session::SessionId;
use crate::core::models::{ChatRequest, ChatResponse, FeedbackRequest, Message, Role};

pub const ERROR_REPLY: &str =
    "Sorry, something went wrong while answering that question. Please try again.";

#[derive(Debug, Default)]
pub struct ChatState {
    messages: Vec<Message>,
    awaiting: bool,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// True while a question is in flight. Input is disabled meanwhile.
    pub fn is_awaiting(&self) -> bool {
        self.awaiting
    }

    /// Start an exchange. Returns the request to send, or `None` when the
    /// input is blank or another question is already in flight.
    pub fn begin_send(&mut self, input: &str, session: &SessionId) -> Option<ChatRequest> {
        let question = input.trim();
        if question.is_empty() || self.awaiting {
            return None;
        }

        self.messages.push(Message::user(question));
        self.awaiting = true;
        Some(ChatRequest::new(question, session.as_str()))
    }

    /// Finish the in-flight exchange.
    ///
    /// A failure still appends a synthetic assistant message. The error is
    /// handed back so the caller can raise a notification.
    pub fn complete_send(&mut self, result: Result<ChatResponse, ApiError>) -> Result<(), ApiError> {
        self.awaiting = false;
        match result {
            Ok(response) => {
                self.messages.push(Message::assistant(response));
                Ok(())
            }
            Err(e) => {
                log::warn!("Chat request failed: {}", e);
                self.messages.push(Message::assistant_error(ERROR_REPLY));
                Err(e)
            }
        }
    }

    /// Expand or collapse the rating control of one answer.
    pub fn toggle_feedback(&mut self, index: usize) {
        if let Some(message) = self.messages.get_mut(index) {
            if message.can_rate() {
                message.feedback_open = !message.feedback_open;
            }
        }
    }

    /// The user message that prompted the answer at `index`.
    pub fn question_for(&self, index: usize) -> Option<&Message> {
        self.messages
            .get(..index)?
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
    }

    /// Record a 1-5 rating for the answer at `index` and build the feedback
    /// submission. The control is hidden afterwards.
    pub fn rate(&mut self, index: usize, rating: u8, session: &SessionId) -> Option<FeedbackRequest> {
        if !(1..=5).contains(&rating) {
            return None;
        }
        if !self.messages.get(index)?.can_rate() {
            return None;
        }

        let question = self
            .question_for(index)
            .map(|m| m.content.clone())
            .unwrap_or_default();

        let answer = &mut self.messages[index];
        answer.rating = Some(rating);
        answer.feedback_open = false;

        Some(FeedbackRequest {
            question,
            answer: answer.content.clone(),
            rating: i64::from(rating),
            session_id: Some(session.to_string()),
            feedback_text: None,
        })
    }
}
