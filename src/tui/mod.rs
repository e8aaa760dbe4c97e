pub mod app;
pub mod components;
pub mod events;
pub mod markdown;
pub mod text;
pub mod theme;

pub use app::App;
pub use events::{Event, EventHandler};
pub use theme::Theme;

use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use std::sync::Arc;
use tracing::info;

use crate::app::AppState;
use crate::error::Result;

/// Restores the terminal even when the loop bails out early.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
    }
}

/// Runs the interactive chat until the user quits.
pub async fn run(app_state: Arc<AppState>) -> Result<()> {
    let tick_rate = app_state.config().tick_rate();

    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut events = EventHandler::new(tick_rate);
    events.spawn_terminal_reader();
    let mut app = App::new(app_state, events.sender());
    info!("Chat interface started");

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    app.shutdown();
    terminal.show_cursor()?;
    info!("Chat interface stopped");

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        match events.next().await {
            Some(event) => app.handle_event(event),
            None => return Ok(()),
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}
