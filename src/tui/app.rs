use crate::{
    config::Config,
    session::{ConversationController, MessageId, Settlement},
    tui::{
        components::{render_header, ChatInput, MessageList, SampleQuestions, HEADER_HEIGHT},
        events::Event,
        keys::KeyMap,
        styles::Theme,
        Frame,
    },
    utils::text::string,
};
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tracing::debug;

const WHEEL_LINES: usize = 3;
const STATUS_ENDPOINT_CHARS: usize = 48;

/// Main application state and controller
pub struct App {
    /// Whether the application should quit
    pub should_quit: bool,

    /// Key mappings for the application
    pub key_map: KeyMap,

    /// Current theme for styling
    pub theme: Theme,

    /// Whether the help overlay is open
    pub show_help: bool,

    config: Config,
    controller: ConversationController,
    message_list: MessageList,
    samples: SampleQuestions,
    input: ChatInput,
    tick_count: usize,
}

impl App {
    pub fn new(config: Config, controller: ConversationController) -> Self {
        let input = ChatInput::new(config.placeholder.clone());

        Self {
            should_quit: false,
            key_map: KeyMap::default(),
            theme: Theme::default(),
            show_help: false,
            config,
            controller,
            message_list: MessageList::new(),
            samples: SampleQuestions::new(),
            input,
            tick_count: 0,
        }
    }

    pub fn controller(&self) -> &ConversationController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ConversationController {
        &mut self.controller
    }

    fn sample_questions_visible(&self) -> bool {
        self.controller.shows_sample_questions() && !self.config.sample_questions.is_empty()
    }

    /// Handle an input event. Returns true when the app should exit.
    pub fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key_event) => self.handle_key_event(key_event),
            Event::Mouse(mouse_event) => {
                if self.config.mouse_enabled {
                    self.handle_mouse_event(mouse_event);
                }
            }
            Event::Paste(text) => {
                self.input.insert_str(&text, self.controller.draft_mut());
            }
            // The next draw picks up the new size.
            Event::Resize(_, _) => {}
            Event::Tick => {
                self.tick_count = self.tick_count.wrapping_add(1);
            }
        }

        self.should_quit
    }

    /// Merge a finished request into the conversation
    pub fn apply_settlement(&mut self, settlement: Settlement) -> Option<MessageId> {
        self.controller.apply(settlement)
    }

    fn handle_key_event(&mut self, event: KeyEvent) {
        if self.key_map.should_quit(&event) {
            self.should_quit = true;
            return;
        }

        if self.key_map.should_show_help(&event) {
            self.show_help = !self.show_help;
            return;
        }

        if self.show_help {
            if event.code == KeyCode::Esc {
                self.show_help = false;
            }
            return;
        }

        if self.key_map.is_submit(&event) {
            self.submit();
        } else if self.key_map.is_newline(&event) {
            self.input.insert_char('\n', self.controller.draft_mut());
        } else if self.key_map.next_sample.matches(&event) {
            if self.sample_questions_visible() {
                self.samples.select_next(self.config.sample_questions.len());
            }
        } else if self.key_map.scroll_up.matches(&event) {
            self.message_list.scroll_up(self.message_list.page_size());
        } else if self.key_map.scroll_down.matches(&event) {
            self.message_list.scroll_down(self.message_list.page_size());
        } else {
            self.input.handle_key_event(event, self.controller.draft_mut());
        }
    }

    fn handle_mouse_event(&mut self, event: MouseEvent) {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) if self.sample_questions_visible() => {
                if let Some(index) = self.samples.hit_test(event.column, event.row) {
                    self.submit_sample(index);
                }
            }
            MouseEventKind::ScrollUp => self.message_list.scroll_up(WHEEL_LINES),
            MouseEventKind::ScrollDown => self.message_list.scroll_down(WHEEL_LINES),
            _ => {}
        }
    }

    /// Send the draft, or the highlighted sample question when the draft is blank
    fn submit(&mut self) {
        if self.controller.draft().trim().is_empty() && self.sample_questions_visible() {
            if let Some(index) = self.samples.selected() {
                self.submit_sample(index);
                return;
            }
        }

        if self.controller.submit_draft().is_some() {
            self.input.reset();
        }
    }

    fn submit_sample(&mut self, index: usize) {
        let Some(question) = self.config.sample_questions.get(index).cloned() else {
            return;
        };
        debug!("Submitting sample question {}", index + 1);
        self.samples.clear_selection();
        self.controller.submit(&question);
    }

    /// Render the application UI
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let show_samples = self.sample_questions_visible();
        let samples_height = if show_samples {
            SampleQuestions::height(self.config.sample_questions.len())
        } else {
            0
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(3),
                Constraint::Length(samples_height),
                Constraint::Length(ChatInput::height(self.controller.draft())),
                Constraint::Length(1),
            ])
            .split(size);

        render_header(
            frame,
            chunks[0],
            &self.config.title,
            &self.config.subtitle,
            &self.theme,
        );

        let thinking = self.controller.is_loading().then_some(self.tick_count);
        self.message_list.render(
            frame,
            chunks[1],
            self.controller.messages(),
            thinking,
            &self.theme,
        );

        if show_samples {
            self.samples
                .render(frame, chunks[2], &self.config.sample_questions, &self.theme);
        }

        self.input
            .render(frame, chunks[3], self.controller.draft(), &self.theme);

        self.render_status_bar(frame, chunks[4]);

        if self.show_help {
            self.render_help_overlay(frame);
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let state = if self.controller.is_loading() {
            Span::styled(" Thinking... ", self.theme.thinking_style())
        } else {
            Span::raw(" Ready ")
        };

        let status = Line::from(vec![
            state,
            Span::raw(format!(
                "| {} ",
                string::truncate(self.controller.endpoint(), STATUS_ENDPOINT_CHARS)
            )),
            Span::raw("| Ctrl+G help | Ctrl+C quit"),
        ]);

        frame.render_widget(
            Paragraph::new(status).style(self.theme.status_bar_style()),
            area,
        );
    }

    fn render_help_overlay(&self, frame: &mut Frame) {
        let help_area = centered_rect(60, 50, frame.size());

        let help_block = Block::default()
            .borders(Borders::ALL)
            .title(" Help (Esc to close) ")
            .style(self.theme.help_style());

        let help_paragraph = Paragraph::new(self.key_map.help_text())
            .block(help_block)
            .style(self.theme.text_style());

        frame.render_widget(Clear, help_area);
        frame.render_widget(help_paragraph, help_area);
    }
}

/// Create a centered rectangle with given percentage of the screen
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
