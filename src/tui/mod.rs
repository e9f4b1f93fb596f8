//! Terminal user interface built on ratatui

mod app;
mod components;
mod events;
mod keys;
mod styles;

pub use app::App;
pub use events::{Event, EventHandler};

use anyhow::Result;
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::session::{ConversationController, Settlement};

pub type Backend = CrosstermBackend<io::Stdout>;
pub type Frame<'a> = ratatui::Frame<'a>;

/// Initialize the terminal for TUI mode
pub fn init_terminal(mouse: bool) -> Result<Terminal<Backend>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    if mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore_terminal(terminal: &mut Terminal<Backend>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Leave raw mode before the default hook prints, so a panic message is readable
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableBracketedPaste,
            DisableMouseCapture
        );
        error!("Application panicked: {}", panic_info);
        default_hook(panic_info);
    }));
}

/// Main TUI entry point
pub async fn run(config: Config, controller: ConversationController) -> Result<()> {
    install_panic_hook();

    let tick_rate = Duration::from_millis(config.tick_rate_ms);
    let mut terminal = init_terminal(config.mouse_enabled)?;
    let mut app = App::new(config, controller);
    let mut event_handler = EventHandler::new(tick_rate);

    info!("Chat UI started");
    let result = run_app(&mut terminal, &mut app, &mut event_handler).await;

    restore_terminal(&mut terminal)?;
    result
}

enum LoopInput {
    Ui(Event),
    Settled(Settlement),
}

/// Main application loop
async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_handler: &mut EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        // The controller holds its own sender, so only the terminal side can close.
        let input = tokio::select! {
            event = event_handler.next() => match event {
                Some(event) => LoopInput::Ui(event),
                None => {
                    warn!("Terminal input closed, leaving the chat UI");
                    break;
                }
            },
            Some(settlement) = app.controller_mut().next_settlement() => {
                LoopInput::Settled(settlement)
            }
        };

        match input {
            LoopInput::Ui(event) => {
                if app.handle_event(event) {
                    break;
                }
            }
            LoopInput::Settled(settlement) => {
                app.apply_settlement(settlement);
            }
        }
    }

    info!("Chat UI stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::{Reply, ScriptedBackend};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn test_app(backend: ScriptedBackend) -> App {
        let config = Config::default();
        let controller = ConversationController::new(Arc::new(backend), config.greeting.clone());
        App::new(config, controller)
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[tokio::test]
    async fn test_loop_exits_when_input_closes() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let mut app = test_app(ScriptedBackend::default());
        let (sender, receiver) = mpsc::unbounded_channel();
        drop(sender);
        let mut events = EventHandler::from_receiver(receiver);

        let outcome = tokio::time::timeout(
            Duration::from_secs(2),
            run_app(&mut terminal, &mut app, &mut events),
        )
        .await;

        assert!(matches!(outcome, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_loop_applies_answer_then_quits() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let answer = Reply::Answer(serde_json::json!({ "answer": "Up 20%" }));
        let mut app = test_app(ScriptedBackend::default().reply("q", answer));
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut events = EventHandler::from_receiver(receiver);

        sender.send(key(KeyCode::Char('q'), KeyModifiers::NONE)).unwrap();
        sender.send(key(KeyCode::Enter, KeyModifiers::NONE)).unwrap();

        let looping = tokio::spawn(async move {
            run_app(&mut terminal, &mut app, &mut events).await.map(|_| app)
        });

        // Quit once the answer has had time to land.
        tokio::time::sleep(Duration::from_millis(200)).await;
        sender.send(key(KeyCode::Char('c'), KeyModifiers::CONTROL)).unwrap();

        let app = tokio::time::timeout(Duration::from_secs(2), looping)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let contents: Vec<&str> = app
            .controller()
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents[1..], ["q", "Up 20%"]);
        assert!(!app.controller().is_loading());
    }
}
