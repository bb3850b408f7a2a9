use crate::error::AppResult;
use crate::gateway::AskOptions;
use crate::models::mode::Mode;
use crate::state::AppState;
use crate::view::{ChatPanel, PanelView, SendOutcome};

fn mount(state: &AppState, options: AskOptions) -> AppResult<ChatPanel> {
    ChatPanel::mount(state.store.clone(), state.gateway.clone(), options)
}

pub fn show_chat(state: &AppState) -> AppResult<PanelView> {
    Ok(mount(state, AskOptions::default())?.view())
}

pub fn choose_mode(state: &AppState, mode: Mode) -> AppResult<PanelView> {
    let panel = mount(state, AskOptions::default())?;
    panel.choose_mode(mode)?;
    Ok(panel.view())
}

pub async fn send_message(
    state: &AppState,
    content: &str,
    options: AskOptions,
) -> AppResult<SendOutcome> {
    log::info!("send_message called: content_len={}", content.len());
    let panel = mount(state, options)?;
    panel.send(content).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::config::AppConfig;
    use crate::gateway::{QueryGateway, QueryResult};
    use crate::models::ask::AskResponse;
    use crate::store::ChatStore;

    struct EchoGateway;

    #[async_trait]
    impl QueryGateway for EchoGateway {
        async fn ask(
            &self,
            _mode: Mode,
            text: &str,
            _options: &AskOptions,
            _cancel: &CancellationToken,
        ) -> AppResult<QueryResult> {
            Ok(QueryResult::Text(AskResponse {
                answer: text.to_uppercase(),
                ..Default::default()
            }))
        }

        async fn health(&self) -> AppResult<bool> {
            Ok(true)
        }
    }

    fn state() -> AppState {
        AppState::new(AppConfig::default(), ChatStore::in_memory(), Arc::new(EchoGateway))
    }

    #[tokio::test]
    async fn test_mode_then_send_across_mounts() {
        let state = state();
        assert_eq!(show_chat(&state).unwrap().mode, None);

        let view = choose_mode(&state, Mode::GeneralSecurity).unwrap();
        assert_eq!(view.mode, Some(Mode::GeneralSecurity));

        let outcome = send_message(&state, "hello", AskOptions::default()).await.unwrap();
        let SendOutcome::Replied(reply) = outcome else {
            panic!("expected reply");
        };
        assert_eq!(reply.content, "HELLO");

        let view = show_chat(&state).unwrap();
        assert_eq!(view.messages.len(), 2);
        assert_eq!(state.store.list_chats().len(), 1);
    }
}
