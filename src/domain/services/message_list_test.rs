use ratatui::style::Color;

use super::MessageList;
use crate::domain::models::Author;
use crate::domain::models::Message;
use crate::domain::models::MessageType;

#[test]
fn it_wraps_messages_to_the_current_width() {
    let mut list = MessageList::default();
    list.set_width(12);
    list.push(Message::new(Author::Confab, "one two three four"));

    assert_eq!(list.lines[0].spans[0].content, "Confab");
    assert_eq!(list.lines[1].spans[0].content, "one two");
    assert_eq!(list.lines[2].spans[0].content, "three");
    assert_eq!(list.lines[3].spans[0].content, "four");
    // Header, three wrapped lines, trailing separator.
    assert_eq!(list.len(), 5);
}

#[test]
fn it_rebuilds_lines_when_the_width_changes() {
    let mut list = MessageList::default();
    list.set_width(12);
    list.push(Message::new(Author::Confab, "one two three four"));
    assert_eq!(list.len(), 5);

    list.set_width(40);
    assert_eq!(list.lines[1].spans[0].content, "one two three four");
    assert_eq!(list.len(), 3);
}

#[test]
fn it_styles_diagnostics_distinctly() {
    let mut list = MessageList::default();
    list.set_width(80);
    list.push(Message::new_with_type(
        Author::Confab,
        MessageType::Error,
        "It broke!",
    ));

    assert_eq!(list.lines[1].spans[0].style.fg, Some(Color::Red));
}

#[test]
fn it_appends_messages_in_order() {
    let mut list = MessageList::default();
    list.set_width(80);
    list.push(Message::new(Author::User, "Hello"));
    list.push(Message::new(Author::Model, "Hi there"));

    assert_eq!(list.messages.len(), 2);
    assert!(!list.is_empty());
    // Two messages, each a header plus one line plus a separator.
    assert_eq!(list.len(), 6);
}
