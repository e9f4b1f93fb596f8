use crossterm::event::{Event as CrosstermEvent, KeyEvent, KeyEventKind, MouseEvent};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::warn;

/// Terminal events delivered to the UI loop
#[derive(Debug, Clone)]
pub enum Event {
    /// Keyboard input event
    Key(KeyEvent),

    /// Mouse input event
    Mouse(MouseEvent),

    /// Bracketed paste
    Paste(String),

    /// Terminal resize event
    Resize(u16, u16),

    /// Periodic tick event
    Tick,
}

/// Reads terminal input on a dedicated thread and forwards it, with a tick
/// whenever the terminal stays quiet for `tick_interval`.
pub struct EventHandler {
    receiver: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    pub fn new(tick_interval: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        std::thread::spawn(move || poll_terminal(sender, tick_interval));

        Self::from_receiver(receiver)
    }

    /// Deliver events from an existing channel instead of the terminal
    pub fn from_receiver(receiver: mpsc::UnboundedReceiver<Event>) -> Self {
        Self { receiver }
    }

    /// Get the next event
    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }
}

fn poll_terminal(sender: mpsc::UnboundedSender<Event>, tick_interval: Duration) {
    loop {
        let event = match crossterm::event::poll(tick_interval) {
            Ok(true) => match crossterm::event::read() {
                Ok(event) => convert_crossterm_event(event),
                Err(e) => {
                    warn!("Failed to read terminal event: {}", e);
                    break;
                }
            },
            Ok(false) => Some(Event::Tick),
            Err(e) => {
                warn!("Failed to poll terminal events: {}", e);
                break;
            }
        };

        if let Some(event) = event {
            // The UI loop is gone once the receiver is dropped.
            if sender.send(event).is_err() {
                break;
            }
        }
    }
}

/// Convert crossterm events to application events
fn convert_crossterm_event(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key_event) if key_event.kind != KeyEventKind::Release => {
            Some(Event::Key(key_event))
        }
        CrosstermEvent::Key(_) => None,
        CrosstermEvent::Mouse(mouse_event) => Some(Event::Mouse(mouse_event)),
        CrosstermEvent::Paste(text) => Some(Event::Paste(text)),
        CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
        CrosstermEvent::FocusGained | CrosstermEvent::FocusLost => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    #[test]
    fn test_key_release_is_dropped() {
        let release = KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert!(convert_crossterm_event(CrosstermEvent::Key(release)).is_none());

        let press = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        assert!(matches!(
            convert_crossterm_event(CrosstermEvent::Key(press)),
            Some(Event::Key(_))
        ));
    }

    #[test]
    fn test_focus_events_are_dropped() {
        assert!(convert_crossterm_event(CrosstermEvent::FocusGained).is_none());
        assert!(convert_crossterm_event(CrosstermEvent::FocusLost).is_none());
    }

    #[test]
    fn test_paste_and_resize_pass_through() {
        assert!(matches!(
            convert_crossterm_event(CrosstermEvent::Paste("hi".to_string())),
            Some(Event::Paste(text)) if text == "hi"
        ));
        assert!(matches!(
            convert_crossterm_event(CrosstermEvent::Resize(80, 24)),
            Some(Event::Resize(80, 24))
        ));
    }
}
