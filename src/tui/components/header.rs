use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::tui::{styles::Theme, Frame};

pub const HEADER_HEIGHT: u16 = 3;

/// Title and subtitle above the conversation
pub fn render_header(frame: &mut Frame, area: Rect, title: &str, subtitle: &str, theme: &Theme) {
    let lines = vec![
        Line::from(vec![
            Span::styled(" ▣ ", theme.assistant_label_style()),
            Span::styled(title.to_string(), theme.title_style()),
        ]),
        Line::from(Span::styled(format!("   {}", subtitle), theme.dim_style())),
    ];

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(theme.border_style());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
