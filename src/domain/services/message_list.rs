#[cfg(test)]
#[path = "message_list_test.rs"]
mod tests;

use ratatui::prelude::Backend;
use ratatui::prelude::Rect;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::domain::models::Author;
use crate::domain::models::Message;
use crate::domain::models::MessageType;

/// The transcript. Keeps every message shown on screen, turns and
/// diagnostics alike, wrapped into render lines for the current width. This
/// is display state only, the canonical conversation history lives in the
/// session.
#[derive(Default)]
pub struct MessageList {
    messages: Vec<Message>,
    lines: Vec<Line<'static>>,
    line_width: u16,
}

fn author_color(author: &Author) -> Color {
    match author {
        Author::User => return Color::Cyan,
        Author::Confab => return Color::Blue,
        Author::Model => return Color::Green,
    }
}

impl MessageList {
    pub fn push(&mut self, message: Message) {
        let mut lines = self.lines_for(&message);
        self.lines.append(&mut lines);
        self.messages.push(message);
    }

    pub fn set_width(&mut self, width: u16) {
        if width == self.line_width {
            return;
        }

        self.line_width = width;
        let mut lines = vec![];
        for message in &self.messages {
            lines.extend(self.lines_for(message));
        }
        self.lines = lines;
    }

    pub fn len(&self) -> u16 {
        return self.lines.len() as u16;
    }

    pub fn is_empty(&self) -> bool {
        return self.lines.is_empty();
    }

    pub fn render<B: Backend>(&self, frame: &mut Frame<B>, rect: Rect, position: u16) {
        frame.render_widget(
            Paragraph::new(self.lines.clone()).scroll((position, 0)),
            rect,
        );
    }

    fn lines_for(&self, message: &Message) -> Vec<Line<'static>> {
        let max_width = usize::from(self.line_width.saturating_sub(2)).max(1);

        let mut text_style = Style::default();
        if message.message_type() == MessageType::Error {
            text_style = text_style.fg(Color::Red);
        }

        let mut lines = vec![Line::from(Span::styled(
            message.author.to_string(),
            Style::default()
                .fg(author_color(&message.author))
                .add_modifier(Modifier::BOLD),
        ))];

        for text_line in message.as_string_lines(max_width) {
            lines.push(Line::from(Span::styled(text_line, text_style)));
        }
        lines.push(Line::from(""));

        return lines;
    }
}
