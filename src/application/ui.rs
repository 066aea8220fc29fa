use std::io;

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::widgets::Scrollbar;
use ratatui::widgets::ScrollbarOrientation;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Author;
use crate::domain::models::BackendArc;
use crate::domain::models::Event;
use crate::domain::models::Loading;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::TextArea;
use crate::domain::services::events::EventsService;
use crate::domain::services::MessageList;
use crate::domain::services::Scroll;
use crate::domain::services::Session;
use crate::infrastructure::backends::BackendManager;

/// Greeting plus any configuration warnings worth surfacing before the first
/// prompt is written.
async fn startup_messages(backend: &BackendArc) -> Result<Vec<Message>> {
    let mut messages = vec![Message::new(
        Author::Model,
        "Hey there! What can I do for you?",
    )];

    if let Err(err) = backend.health_check().await {
        messages.push(Message::new_with_type(
            Author::Confab,
            MessageType::Error,
            &format!("Hey, it looks like the Gemini API isn't reachable, I can't connect to it. You should double check that before we start talking, otherwise every prompt is going to fail.\n\nError: {err}"),
        ));

        return Ok(messages);
    }

    let model_name = Config::get(ConfigKey::Model);
    let models = backend.list_models().await?;
    if !models.contains(&format!("models/{model_name}")) {
        messages.push(Message::new_with_type(
            Author::Confab,
            MessageType::Error,
            &format!("Model {model_name} doesn't exist for the Gemini API. Double check your model configuration before we start talking."),
        ));
    }

    return Ok(messages);
}

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    backend: BackendArc,
    tx: mpsc::UnboundedSender<Event>,
    events: &mut EventsService,
) -> Result<()> {
    let mut session = Session::default();
    let mut message_list = MessageList::default();
    let mut scroll = Scroll::default();
    let mut loading = Loading::default();
    let mut textarea = TextArea::default();
    let mut follow_tail = false;

    for message in startup_messages(&backend).await? {
        message_list.push(message);
    }

    loop {
        terminal.draw(|frame| {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints(vec![Constraint::Min(1), Constraint::Max(4)])
                .split(frame.size());

            message_list.set_width(layout[0].width.saturating_sub(1));
            scroll.set_state(message_list.len(), layout[0].height);
            if follow_tail || session.is_waiting() {
                scroll.last();
                follow_tail = false;
            }

            message_list.render(frame, layout[0], scroll.position);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                layout[0].inner(&Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scroll.scrollbar_state,
            );

            if session.is_waiting() {
                loading.render(frame, layout[1]);
            } else {
                frame.render_widget(textarea.widget(), layout[1]);
            }
        })?;

        match events.next().await? {
            Event::BackendResponse(outcome) => {
                let message = session.complete_submit(outcome);
                message_list.push(message);
                follow_tail = true;
            }
            Event::KeyboardCTRLC() => break,
            Event::KeyboardEnter() => {
                let input_str = textarea.lines().join("\n");
                if let Some(prompt) = session.begin_submit(&input_str) {
                    textarea = TextArea::default();
                    if let Some(turn) = prompt.turns.last() {
                        message_list.push(turn.clone());
                    }
                    follow_tail = true;

                    let task_backend = backend.clone();
                    let task_tx = tx.clone();
                    tokio::spawn(async move {
                        let outcome = task_backend.get_completion(prompt).await;
                        return task_tx.send(Event::BackendResponse(outcome));
                    });
                }
            }
            Event::KeyboardCharInput(input) => {
                if !session.is_waiting() {
                    textarea.input(input);
                }
            }
            Event::KeyboardPaste(text) => {
                if !session.is_waiting() {
                    textarea.insert_str(&text);
                }
            }
            Event::UIScrollUp() => scroll.up(),
            Event::UIScrollDown() => scroll.down(),
            Event::UIScrollPageUp() => scroll.up_page(),
            Event::UIScrollPageDown() => scroll.down_page(),
            Event::UITick() => {
                if session.is_waiting() {
                    loading.tick();
                }
            }
        }
    }

    return Ok(());
}

pub fn destruct_terminal_for_panic() {
    disable_raw_mode().unwrap();
    crossterm::execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture).unwrap();
    crossterm::execute!(io::stdout(), cursor::Show).unwrap();
}

pub async fn start(
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    let backend = BackendManager::get();
    let mut events = EventsService::new(rx);
    start_loop(&mut terminal, backend, tx, &mut events).await?;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    return Ok(());
}
