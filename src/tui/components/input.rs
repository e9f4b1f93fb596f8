//! Multi-line draft editor
//!
//! The draft text itself belongs to the conversation controller; this
//! component only tracks the cursor and edits the string it is handed.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use crate::tui::{styles::Theme, Frame};

const MAX_VISIBLE_LINES: u16 = 5;

#[derive(Debug)]
pub struct ChatInput {
    /// Cursor position in characters
    cursor: usize,
    placeholder: String,
}

impl ChatInput {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            cursor: 0,
            placeholder: placeholder.into(),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Height needed to show `draft`, border included
    pub fn height(draft: &str) -> u16 {
        let lines = u16::try_from(draft.split('\n').count()).unwrap_or(u16::MAX);
        lines.clamp(1, MAX_VISIBLE_LINES) + 2
    }

    /// Apply an editing key. Returns false when the key is not an edit.
    pub fn handle_key_event(&mut self, event: KeyEvent, draft: &mut String) -> bool {
        self.clamp(draft);

        match event.code {
            KeyCode::Char(c)
                if !event
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.insert_char(c, draft);
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    let at = byte_index(draft, self.cursor - 1);
                    draft.remove(at);
                    self.cursor -= 1;
                }
            }
            KeyCode::Delete => {
                if self.cursor < draft.chars().count() {
                    let at = byte_index(draft, self.cursor);
                    draft.remove(at);
                }
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(draft.chars().count()),
            KeyCode::Home => self.cursor = line_start(draft, self.cursor),
            KeyCode::End => self.cursor = line_end(draft, self.cursor),
            _ => return false,
        }

        true
    }

    pub fn insert_char(&mut self, c: char, draft: &mut String) {
        self.clamp(draft);
        let at = byte_index(draft, self.cursor);
        draft.insert(at, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, text: &str, draft: &mut String) {
        self.clamp(draft);
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        let at = byte_index(draft, self.cursor);
        draft.insert_str(at, &text);
        self.cursor += text.chars().count();
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, draft: &str, theme: &Theme) {
        self.clamp(draft);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Message ")
            .border_style(theme.focused_border_style());
        let inner = block.inner(area);

        let (row, column) = cursor_row_column(draft, self.cursor);
        let scroll = (row + 1).saturating_sub(inner.height);

        let paragraph = if draft.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                self.placeholder.clone(),
                theme.placeholder_style(),
            )))
        } else {
            Paragraph::new(draft.to_string())
                .style(theme.text_style())
                .scroll((scroll, 0))
        };
        frame.render_widget(paragraph.block(block), area);

        if inner.width > 0 && inner.height > 0 {
            let x = inner.x + column.min(inner.width - 1);
            let y = inner.y + (row - scroll).min(inner.height - 1);
            frame.set_cursor(x, y);
        }
    }

    fn clamp(&mut self, draft: &str) {
        self.cursor = self.cursor.min(draft.chars().count());
    }
}

fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

fn line_start(text: &str, cursor: usize) -> usize {
    let before: Vec<char> = text.chars().take(cursor).collect();
    before
        .iter()
        .rposition(|c| *c == '\n')
        .map(|i| i + 1)
        .unwrap_or(0)
}

fn line_end(text: &str, cursor: usize) -> usize {
    text.chars()
        .skip(cursor)
        .position(|c| c == '\n')
        .map(|offset| cursor + offset)
        .unwrap_or_else(|| text.chars().count())
}

/// Screen row and column of the cursor within the draft
fn cursor_row_column(text: &str, cursor: usize) -> (u16, u16) {
    let before: String = text.chars().take(cursor).collect();
    let row = before.matches('\n').count();
    let column = before.rsplit('\n').next().map(|line| line.width()).unwrap_or(0);
    (
        u16::try_from(row).unwrap_or(u16::MAX),
        u16::try_from(column).unwrap_or(u16::MAX),
    )
}
