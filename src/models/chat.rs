use serde::{Deserialize, Serialize};

pub const DEFAULT_CHAT_TITLE: &str = "New chat";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub title: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}

impl Chat {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: DEFAULT_CHAT_TITLE.into(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Title as shown in the chat list.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }
}

impl Default for Chat {
    fn default() -> Self {
        Self::new()
    }
}
