//! Clickable starter questions shown before the first submission

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::tui::{styles::Theme, Frame};

#[derive(Debug, Default)]
pub struct SampleQuestions {
    selected: Option<usize>,
    rows: Vec<Rect>,
}

impl SampleQuestions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Height needed to show `count` questions with a border
    pub fn height(count: usize) -> u16 {
        u16::try_from(count).unwrap_or(u16::MAX).saturating_add(2)
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Move the highlight to the next question, wrapping around
    pub fn select_next(&mut self, count: usize) {
        if count == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(index) => (index + 1) % count,
            None => 0,
        });
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Index of the question rendered at a screen position
    pub fn hit_test(&self, column: u16, row: u16) -> Option<usize> {
        self.rows.iter().position(|rect| {
            row >= rect.y
                && row < rect.y.saturating_add(rect.height)
                && column >= rect.x
                && column < rect.x.saturating_add(rect.width)
        })
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, questions: &[String], theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Try asking (Tab to select, Enter to send) ")
            .border_style(theme.border_style());
        let inner = block.inner(area);

        self.rows = (0..questions.len())
            .map(|i| u16::try_from(i).unwrap_or(u16::MAX))
            .take_while(|offset| *offset < inner.height)
            .map(|offset| Rect::new(inner.x, inner.y + offset, inner.width, 1))
            .collect();

        let lines: Vec<Line> = questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let style = if self.selected == Some(index) {
                    theme.selection_style()
                } else {
                    theme.text_style()
                };
                Line::from(vec![
                    Span::styled(format!("[{}] ", index + 1), theme.dim_style()),
                    Span::styled(question.clone(), style),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}
