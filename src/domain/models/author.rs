use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;

/// Who a message came from. `User` and `Model` are the two conversation
/// roles sent to the backend. `Confab` is the application itself, used for
/// greetings and diagnostics only, and never ends up in a prompt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Author {
    User,
    Confab,
    Model,
}

impl ToString for Author {
    fn to_string(&self) -> String {
        match self {
            Author::User => return Config::get(ConfigKey::Username),
            Author::Confab => return String::from("Confab"),
            Author::Model => return Config::get(ConfigKey::Model),
        }
    }
}
