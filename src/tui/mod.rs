//! Terminal client for the relay.

pub mod app;
pub mod events;
pub mod layout;
pub mod theme;
pub mod views;
pub mod widgets;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::client::{ApiError, HttpAssistantApi, Page};
use crate::config::AppConfig;
use app::AppState;

#[derive(Error, Debug)]
pub enum TuiError {
    #[error("Terminal error: {0}")]
    Terminal(#[from] io::Error),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Run the terminal client until the user quits.
pub async fn run(config: &AppConfig) -> Result<(), TuiError> {
    let relay_url = config.relay_url();
    let api = HttpAssistantApi::new(&relay_url, Duration::from_secs(config.relay.timeout_secs))?;
    log::info!("Terminal client using relay at {}", relay_url);

    let page = Page::new(Arc::new(api), Duration::from_millis(config.tui.toast_duration_ms));
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let mut app = AppState::new(page, event_rx, event_tx);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app
        .run(&mut terminal, Duration::from_millis(config.tui.tick_rate_ms))
        .await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.map_err(TuiError::from)
}
