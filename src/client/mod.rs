//! Client view state: session, conversation, document library, notifications.
//!
//! Everything here is headless. The terminal front end in [`crate::tui`]
//! renders it and feeds it input.

pub mod api;
pub mod chat;
pub mod library;
pub mod page;
pub mod session;
pub mod toast;

pub use api::{ApiError, AssistantApi, HttpAssistantApi};
pub use chat::ChatState;
pub use library::{validate_upload, Library, UploadFile, UploadRejection};
pub use page::{FollowUp, Page};
pub use session::SessionId;
pub use toast::{Notifier, Toast, ToastKind};
