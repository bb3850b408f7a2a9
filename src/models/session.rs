use serde::{Deserialize, Serialize};

use super::message::Message;
use super::mode::Mode;

/// Mode and message log of one chat. Shares its id with the chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Session {
    pub fn empty(id: &str) -> Self {
        Self {
            id: id.to_string(),
            mode: None,
            messages: Vec::new(),
        }
    }

    /// A chat's mode is fixed once chosen.
    pub fn is_locked(&self) -> bool {
        self.mode.is_some()
    }
}
