//! Remote query gateway: one outbound request per user question.

pub mod http;

pub use http::HttpGateway;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::AppResult;
use crate::models::ask::AskResponse;
use crate::models::breach::EmailCheckResponse;
use crate::models::message::Message;
use crate::models::mode::Mode;

/// Caller-supplied flags for the breach check. Ignored by the text routes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AskOptions {
    pub include_unverified: bool,
    pub truncate: bool,
    pub domain: Option<String>,
}

/// Reply shape, selected by the requested mode.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Text(AskResponse),
    BreachCheck(EmailCheckResponse),
}

impl QueryResult {
    /// Assistant message to append to the thread.
    pub fn into_message(self) -> Message {
        match self {
            QueryResult::Text(resp) if resp.answer.is_empty() => Message::assistant("(no answer)"),
            QueryResult::Text(resp) => Message::assistant(resp.answer),
            QueryResult::BreachCheck(resp) => Message::email_check(resp),
        }
    }
}

#[async_trait]
pub trait QueryGateway: Send + Sync {
    /// Issue one request for `mode`. Returns `AppError::Cancelled` once `cancel` fires.
    async fn ask(
        &self,
        mode: Mode,
        text: &str,
        options: &AskOptions,
        cancel: &CancellationToken,
    ) -> AppResult<QueryResult>;

    async fn health(&self) -> AppResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::{MessageKind, Role};

    #[test]
    fn test_empty_answer_placeholder() {
        let msg = QueryResult::Text(AskResponse::default()).into_message();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.content, "(no answer)");
    }

    #[test]
    fn test_breach_result_message() {
        let msg = QueryResult::BreachCheck(EmailCheckResponse {
            email: "me@example.com".into(),
            count: 2,
            ..Default::default()
        })
        .into_message();
        assert_eq!(msg.kind, MessageKind::EmailCheck);
        assert_eq!(msg.content, "2 breach(es) found for me@example.com.");
        assert_eq!(msg.email_check_payload().map(|p| p.count), Some(2));
    }
}
