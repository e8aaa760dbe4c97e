use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, MouseEvent};
use std::thread;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::chat::ChatReply;

/// Everything the chat screen reacts to, from the terminal or from the
/// request task.
#[derive(Clone, Debug)]
pub enum Event {
    Tick,
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    /// The answer service replied
    ReplyReceived(ChatReply),
    /// The request failed; carries text for the error bubble
    ReplyFailed(String),
}

impl Event {
    fn from_terminal(event: CrosstermEvent) -> Option<Self> {
        match event {
            CrosstermEvent::Key(key) => Some(Event::Key(key)),
            CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
            CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
            _ => None,
        }
    }
}

/// Single queue feeding the UI loop. Terminal input and ticks come from a
/// reader thread; request tasks push through [`EventHandler::sender`].
pub struct EventHandler {
    sender: mpsc::UnboundedSender<Event>,
    receiver: mpsc::UnboundedReceiver<Event>,
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver,
            tick_rate,
        }
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.sender.clone()
    }

    /// Starts polling the terminal on a dedicated thread; crossterm reads
    /// block. The thread exits once the handler is dropped.
    pub fn spawn_terminal_reader(&self) {
        let sender = self.sender.clone();
        let tick_rate = self.tick_rate;

        thread::spawn(move || {
            let mut last_tick = Instant::now();
            loop {
                let wait = tick_rate.saturating_sub(last_tick.elapsed());
                match event::poll(wait) {
                    Ok(true) => match event::read() {
                        Ok(raw) => {
                            if let Some(event) = Event::from_terminal(raw) {
                                if sender.send(event).is_err() {
                                    break;
                                }
                            }
                        }
                        Err(e) => warn!("Failed to read terminal event: {}", e),
                    },
                    Ok(false) => {}
                    Err(e) => warn!("Failed to poll terminal: {}", e),
                }

                if last_tick.elapsed() >= tick_rate {
                    last_tick = Instant::now();
                    if sender.send(Event::Tick).is_err() {
                        break;
                    }
                }
            }
            debug!("Terminal reader stopped");
        });
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    pub fn send(&self, event: Event) {
        let _ = self.sender.send(event);
    }
}
