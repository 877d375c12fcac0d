//! Single-slot notification state.
//!
//! At most one toast is visible. Showing a new one replaces the current one.
//! Expiry is driven by [`Notifier::tick`], so the owner decides the clock.

use std::time::{Duration, Instant};

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub shown_at: Instant,
}

#[derive(Debug)]
pub struct Notifier {
    current: Option<Toast>,
    duration: Duration,
    counter: u64,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}

impl Notifier {
    pub fn new(duration: Duration) -> Self {
        Self {
            current: None,
            duration,
            counter: 0,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    /// Show a toast now, replacing any visible one. Returns its id.
    pub fn show(&mut self, kind: ToastKind, message: impl Into<String>) -> u64 {
        self.show_at(kind, message, Instant::now())
    }

    pub fn show_at(&mut self, kind: ToastKind, message: impl Into<String>, now: Instant) -> u64 {
        self.counter += 1;
        let message = message.into();
        log::debug!("Toast {:?}: {}", kind, message);
        self.current = Some(Toast {
            id: self.counter,
            kind,
            message,
            shown_at: now,
        });
        self.counter
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.show(ToastKind::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.show(ToastKind::Error, message)
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.show(ToastKind::Info, message)
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// Drop the toast once its duration has elapsed. Returns true if one was
    /// dismissed by this call.
    pub fn tick(&mut self, now: Instant) -> bool {
        let expired = self
            .current
            .as_ref()
            .is_some_and(|toast| now.saturating_duration_since(toast.shown_at) >= self.duration);
        if expired {
            self.current = None;
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_toast_replaces_current() {
        let mut notifier = Notifier::default();
        let first = notifier.error("Upload failed");
        let second = notifier.success("Deleted q3.pdf");

        assert_ne!(first, second);
        let toast = notifier.current().unwrap();
        assert_eq!(toast.id, second);
        assert_eq!(toast.kind, ToastKind::Success);
        assert_eq!(toast.message, "Deleted q3.pdf");
    }

    #[test]
    fn test_auto_dismiss_after_duration() {
        let start = Instant::now();
        let mut notifier = Notifier::new(Duration::from_millis(3000));
        notifier.show_at(ToastKind::Info, "Refreshing", start);

        assert!(!notifier.tick(start + Duration::from_millis(2999)));
        assert!(notifier.current().is_some());

        assert!(notifier.tick(start + Duration::from_millis(3000)));
        assert!(notifier.current().is_none());
    }

    #[test]
    fn test_replacement_restarts_timer() {
        let start = Instant::now();
        let mut notifier = Notifier::new(Duration::from_millis(3000));
        notifier.show_at(ToastKind::Info, "first", start);
        notifier.show_at(ToastKind::Error, "second", start + Duration::from_millis(2000));

        assert!(!notifier.tick(start + Duration::from_millis(4000)));
        assert_eq!(notifier.current().unwrap().message, "second");
        assert!(notifier.tick(start + Duration::from_millis(5000)));
    }

    #[test]
    fn test_manual_dismiss() {
        let mut notifier = Notifier::default();
        notifier.info("hello");
        notifier.dismiss();
        assert!(notifier.current().is_none());
        assert!(!notifier.tick(Instant::now()));
    }
}
