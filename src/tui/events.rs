use crate::client::{ApiError, UploadFile};
use crate::core::models::{ChatResponse, Document, UploadReceipt};

/// Events flowing through the Elm-architecture event loop.
#[derive(Debug)]
pub enum AppEvent {
    /// Periodic tick for toast expiry.
    Tick,
    /// Raw terminal input (keyboard/mouse).
    Input(crossterm::event::Event),
    /// A resolved action to execute.
    Action(Action),
    /// Background task results. Each one is applied through the page owner.
    ChatAnswered(Result<ChatResponse, ApiError>),
    DocumentsLoaded(Result<Vec<Document>, ApiError>),
    DocumentDeleted(Result<(), ApiError>),
    UploadFileRead(Result<UploadFile, ApiError>),
    UploadFinished(Result<UploadReceipt, ApiError>),
    FeedbackSent(Result<(), ApiError>),
    /// Request to quit the application.
    Quit,
}

/// High-level actions dispatched by the input mapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    FocusChat,
    FocusLibrary,
    TabNext,
    TabPrev,
    ShowHelp,
    CloseHelp,
    RefreshLibrary,
    DismissToast,
    Quit,
}

/// Which top-level view has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Focus {
    Chat,
    Library,
}

impl Focus {
    pub const ALL: [Focus; 2] = [Focus::Chat, Focus::Library];

    pub fn label(self) -> &'static str {
        match self {
            Focus::Chat => "Chat",
            Focus::Library => "Documents",
        }
    }

    pub fn next(self) -> Focus {
        let idx = Focus::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Focus::ALL[(idx + 1) % Focus::ALL.len()]
    }

    pub fn prev(self) -> Focus {
        let idx = Focus::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Focus::ALL[(idx + Focus::ALL.len() - 1) % Focus::ALL.len()]
    }
}
