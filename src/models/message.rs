use serde::{Deserialize, Serialize};

use super::breach::EmailCheckResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    #[serde(rename = "emailcheck")]
    EmailCheck,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub ts: i64,
    #[serde(default)]
    pub kind: MessageKind,
    /// Present only when `kind` is `EmailCheck`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<EmailCheckResponse>,
}

impl Message {
    fn new(role: Role, content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content,
            ts: chrono::Utc::now().timestamp_millis(),
            kind: MessageKind::Text,
            payload: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content.into())
    }

    pub fn email_check(result: EmailCheckResponse) -> Self {
        let mut msg = Self::new(Role::Assistant, result.headline());
        msg.kind = MessageKind::EmailCheck;
        msg.payload = Some(result);
        msg
    }

    /// Assistant-side warning shown when a request fails.
    pub fn failure(description: impl std::fmt::Display) -> Self {
        Self::new(Role::Assistant, format!("⚠️ {description}"))
    }

    /// Breach-check payload, if this message carries one.
    pub fn email_check_payload(&self) -> Option<&EmailCheckResponse> {
        match self.kind {
            MessageKind::EmailCheck => self.payload.as_ref(),
            MessageKind::Text => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_defaults_to_text() {
        let json = r#"{"id":"m1","role":"user","content":"hi","ts":1}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.kind, MessageKind::Text);
        assert!(msg.email_check_payload().is_none());
    }

    #[test]
    fn test_email_check_message() {
        let msg = Message::email_check(EmailCheckResponse {
            email: "a@b.c".into(),
            ..Default::default()
        });
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.content, "No breaches found for a@b.c.");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["kind"], "emailcheck");
        assert_eq!(json["payload"]["email"], "a@b.c");
    }

    #[test]
    fn test_failure_content() {
        let msg = Message::failure("HTTP 500 Internal Server Error");
        assert_eq!(msg.content, "⚠️ HTTP 500 Internal Server Error");
    }
}
