//! Scrollable conversation history

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::{
    api::Source,
    session::{Message, MessageRole},
    tui::{styles::Theme, Frame},
    utils::text::string,
};

const CONTENT_INDENT: &str = "  ";
const SOURCE_INDENT: &str = "      ";
const SPINNER_FRAMES: [&str; 4] = ["●∙∙", "∙●∙", "∙∙●", "∙●∙"];

/// Conversation view that follows the newest message.
///
/// Scrolling is tracked as a distance from the bottom, so new lines never
/// shift what the user is reading until the message count changes, at
/// which point the view snaps back to the end.
#[derive(Debug, Default)]
pub struct MessageList {
    scroll_from_bottom: usize,
    seen_messages: usize,
    area: Rect,
}

impl MessageList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(lines);
    }

    /// Lines in one page of the current view
    pub fn page_size(&self) -> usize {
        usize::from(self.area.height.saturating_sub(2)).max(1)
    }

    pub fn is_following(&self) -> bool {
        self.scroll_from_bottom == 0
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        messages: &[Message],
        thinking: Option<usize>,
        theme: &Theme,
    ) {
        self.area = area;

        if messages.len() != self.seen_messages {
            self.seen_messages = messages.len();
            self.scroll_from_bottom = 0;
        }

        let width = usize::from(area.width.saturating_sub(2));
        let height = usize::from(area.height.saturating_sub(2));

        let mut lines: Vec<Line<'static>> = messages
            .iter()
            .flat_map(|message| message_lines(message, width, theme))
            .collect();
        if let Some(frame_index) = thinking {
            lines.push(thinking_line(frame_index, theme));
        }

        let max_top = lines.len().saturating_sub(height);
        self.scroll_from_bottom = self.scroll_from_bottom.min(max_top);
        let top = max_top - self.scroll_from_bottom;

        let title = if self.is_following() {
            " Conversation ".to_string()
        } else {
            format!(" Conversation (↑{}) ", self.scroll_from_bottom)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(theme.border_style());

        let paragraph = Paragraph::new(lines)
            .block(block)
            .style(theme.text_style())
            .scroll((u16::try_from(top).unwrap_or(u16::MAX), 0));

        frame.render_widget(paragraph, area);
    }
}

/// Lines for one turn: label, wrapped content, sources, then a spacer
pub fn message_lines(message: &Message, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let label_style = match message.role {
        MessageRole::User => theme.user_label_style(),
        MessageRole::Assistant => theme.assistant_label_style(),
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(message.role.to_string(), label_style),
        Span::styled(format!("  {}", message.local_time()), theme.dim_style()),
    ])];

    let content_width = width.saturating_sub(CONTENT_INDENT.len());
    for line in string::wrap_preserving_breaks(&message.content, content_width) {
        lines.push(Line::from(format!("{}{}", CONTENT_INDENT, line)));
    }

    if message.is_assistant() && !message.sources.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("{}Sources:", CONTENT_INDENT),
            theme.dim_style(),
        )));
        for (index, source) in message.sources.iter().enumerate() {
            lines.extend(source_lines(index, source, width, theme));
        }
    }

    lines.push(Line::from(""));
    lines
}

/// Lines for one citation, in the order the backend ranked it
pub fn source_lines(index: usize, source: &Source, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let mut heading = vec![
        Span::styled(format!("{}[{}] ", CONTENT_INDENT, index + 1), theme.dim_style()),
        Span::styled(source.display_name().to_string(), theme.source_name_style()),
    ];
    if let Some(page) = source.display_page() {
        heading.push(Span::styled(format!("  Page {}", page), theme.dim_style()));
    }
    if let Some(relevance) = source.relevance {
        heading.push(Span::styled(
            format!("  relevance {:.2}", relevance),
            theme.dim_style(),
        ));
    }

    let mut lines = vec![Line::from(heading)];

    if let Some(url) = source.url() {
        lines.push(Line::from(vec![
            Span::styled(format!("{}View PDF: ", SOURCE_INDENT), theme.dim_style()),
            Span::styled(url.to_string(), theme.link_style()),
        ]));
    }

    let preview_width = width.saturating_sub(SOURCE_INDENT.len());
    let preview = string::collapse_whitespace(&source.preview());
    for line in string::wrap_preserving_breaks(&preview, preview_width) {
        lines.push(Line::from(Span::styled(
            format!("{}{}", SOURCE_INDENT, line),
            theme.dim_style(),
        )));
    }

    lines
}

/// Animated "Thinking..." row shown while a request is in flight
pub fn thinking_line(frame_index: usize, theme: &Theme) -> Line<'static> {
    let spinner = SPINNER_FRAMES[frame_index % SPINNER_FRAMES.len()];
    Line::from(vec![
        Span::styled(format!("{}{} ", CONTENT_INDENT, spinner), theme.dim_style()),
        Span::styled("Thinking...", theme.thinking_style()),
    ])
}
