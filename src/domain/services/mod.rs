pub mod events;
mod message_list;
mod scroll;
mod session;

pub use message_list::*;
pub use scroll::*;
pub use session::*;
