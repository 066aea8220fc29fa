#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use crate::domain::models::Author;
use crate::domain::models::BackendError;
use crate::domain::models::BackendPrompt;
use crate::domain::models::Message;
use crate::domain::models::MessageType;

/// The conversation session. Owns the ordered history of user and model
/// turns plus the busy flag, and is the only place either is mutated. The
/// request lifecycle is two explicit steps so the caller can run the network
/// call wherever it likes:
///
/// 1. [`Session::begin_submit`] appends the user turn optimistically, marks
///    the session busy, and hands back a snapshot of the full history to
///    send.
/// 2. [`Session::complete_submit`] settles the outcome, appending the reply
///    on success or rolling the user turn back on failure, and always clears
///    the busy flag.
pub struct Session {
    turns: Vec<Message>,
    waiting_for_backend: bool,
}

impl Default for Session {
    fn default() -> Session {
        return Session {
            turns: vec![],
            waiting_for_backend: false,
        };
    }
}

impl Session {
    pub fn turns(&self) -> &[Message] {
        return &self.turns;
    }

    pub fn is_waiting(&self) -> bool {
        return self.waiting_for_backend;
    }

    /// Starts a submission. Returns `None` without touching any state when
    /// the input is empty after trimming or another request is already in
    /// flight, both are silent no-ops.
    pub fn begin_submit(&mut self, input: &str) -> Option<BackendPrompt> {
        let text = input.trim();
        if text.is_empty() || self.waiting_for_backend {
            return None;
        }

        self.turns.push(Message::new(Author::User, text));
        self.waiting_for_backend = true;

        return Some(BackendPrompt::new(self.turns.clone()));
    }

    /// Settles the in-flight submission. On success the reply becomes a
    /// model turn. On failure the optimistically appended user turn is
    /// removed, restoring the history to its pre-submit state, and the
    /// returned message is an error diagnostic for the rendering surface
    /// only.
    pub fn complete_submit(&mut self, outcome: Result<String, BackendError>) -> Message {
        self.waiting_for_backend = false;

        match outcome {
            Ok(reply) => {
                let message = Message::new(Author::Model, &reply);
                self.turns.push(message.clone());
                return message;
            }
            Err(err) => {
                self.turns.pop();
                tracing::error!(error = %err, "completion request failed");
                return Message::new_with_type(
                    Author::Confab,
                    MessageType::Error,
                    &format!("The backend failed with the following error: {err}"),
                );
            }
        }
    }
}
