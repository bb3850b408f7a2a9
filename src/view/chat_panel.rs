use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};
use crate::gateway::{AskOptions, QueryGateway};
use crate::models::message::{Message, Role};
use crate::models::mode::Mode;
use crate::models::session::Session;
use crate::store::{ChatStore, Subscription};
use crate::view::breach::BreachTable;

/// What the main panel currently shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PanelView {
    pub chat_id: String,
    pub mode: Option<Mode>,
    pub messages: Vec<Message>,
    pub loading: bool,
}

impl fmt::Display for PanelView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(mode) = self.mode else {
            writeln!(f, "Choose a function")?;
            for (i, m) in Mode::ALL.iter().enumerate() {
                writeln!(f, "  {}. {} ({}) - {}", i + 1, m.label(), m.key(), m.hint())?;
            }
            return Ok(());
        };

        writeln!(f, "[{}]", mode.label())?;
        for msg in &self.messages {
            let who = match msg.role {
                Role::User => "you",
                Role::Assistant => "shieldmate",
            };
            match msg.email_check_payload() {
                Some(payload) => write!(f, "{who}> {}", BreachTable::from_response(payload))?,
                None => writeln!(f, "{who}> {}", msg.content)?,
            }
        }
        if self.loading {
            writeln!(f, "Sending…")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SendOutcome {
    /// Blank input, nothing sent.
    Ignored,
    /// The chat has no mode yet; the picker must be used first.
    NeedsMode,
    Replied(Message),
    /// A newer send started before this reply arrived; the reply was dropped.
    Superseded,
}

struct PanelState {
    view: PanelView,
    /// Bumped on every send; a reply is applied only if it still matches.
    generation: u64,
    in_flight: Option<CancellationToken>,
}

impl PanelState {
    fn show(&mut self, session: Session) {
        self.view.chat_id = session.id;
        self.view.mode = session.mode;
        self.view.messages = session.messages;
    }
}

fn lock(state: &Mutex<PanelState>) -> MutexGuard<'_, PanelState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Mode picker, message thread and composer for the active chat.
///
/// Follows the store's active pointer for as long as it is alive. At most one
/// request is outstanding: a new send cancels the previous one.
pub struct ChatPanel {
    store: ChatStore,
    gateway: Arc<dyn QueryGateway>,
    options: AskOptions,
    state: Arc<Mutex<PanelState>>,
    _subscription: Subscription,
}

impl ChatPanel {
    pub fn mount(
        store: ChatStore,
        gateway: Arc<dyn QueryGateway>,
        options: AskOptions,
    ) -> AppResult<Self> {
        let mut chat_id = store.active_chat_id();
        if chat_id.is_empty() {
            chat_id = store.create_chat()?.id;
        }

        let state = Arc::new(Mutex::new(PanelState {
            view: PanelView::default(),
            generation: 0,
            in_flight: None,
        }));
        lock(&state).show(store.load_session(&chat_id));

        let subscription = {
            let store = store.clone();
            let state = Arc::downgrade(&state);
            store.clone().subscribe_active_change(move |event| {
                let Some(state) = state.upgrade() else {
                    return;
                };
                let chat_id = if event.is_cleared() {
                    // Another panel may already have created the replacement.
                    let current = store.active_chat_id();
                    if !current.is_empty() {
                        current
                    } else {
                        match store.create_chat() {
                            Ok(chat) => chat.id,
                            Err(e) => {
                                log::error!("Failed to create replacement chat: {}", e);
                                return;
                            }
                        }
                    }
                } else {
                    event.chat_id.clone()
                };
                let session = store.load_session(&chat_id);
                lock(&state).show(session);
            })
        };

        log::debug!("Chat panel mounted on {}", chat_id);
        Ok(Self {
            store,
            gateway,
            options,
            state,
            _subscription: subscription,
        })
    }

    pub fn view(&self) -> PanelView {
        lock(&self.state).view.clone()
    }

    pub fn chat_id(&self) -> String {
        lock(&self.state).view.chat_id.clone()
    }

    pub fn mode(&self) -> Option<Mode> {
        lock(&self.state).view.mode
    }

    pub fn messages(&self) -> Vec<Message> {
        lock(&self.state).view.messages.clone()
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.state).view.loading
    }

    pub fn locked_note(&self) -> String {
        match self.mode() {
            Some(mode) => format!(
                "This chat is locked to “{}”. Create a new chat to use another function.",
                mode.label()
            ),
            None => String::new(),
        }
    }

    /// Lock the current chat to `mode` and title it after the mode.
    pub fn choose_mode(&self, mode: Mode) -> AppResult<()> {
        let mut state = lock(&self.state);
        if state.view.chat_id.is_empty() {
            return Err(AppError::InvalidRequest("No active chat".into()));
        }
        let chat_id = state.view.chat_id.clone();
        let stored = self.store.load_session(&chat_id);
        if stored.is_locked() {
            state.view.mode = stored.mode;
        }
        if let Some(current) = state.view.mode {
            return Err(AppError::InvalidRequest(format!(
                "This chat is locked to {}",
                current.label()
            )));
        }

        self.store.set_session_mode(&chat_id, mode)?;
        self.store.rename_chat(&chat_id, mode.label())?;
        state.view.mode = Some(mode);
        log::info!("Chat {} locked to {}", chat_id, mode);
        Ok(())
    }

    /// Send `text` in the current chat. The user message is persisted before
    /// the request goes out, so it survives a failed or cancelled call.
    pub async fn send(&self, text: &str) -> AppResult<SendOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(SendOutcome::Ignored);
        }

        let (chat_id, mode, generation, cancel) = {
            let mut state = lock(&self.state);
            if state.view.chat_id.is_empty() {
                return Ok(SendOutcome::Ignored);
            }
            let Some(mode) = state.view.mode else {
                return Ok(SendOutcome::NeedsMode);
            };

            let chat_id = state.view.chat_id.clone();
            let user = Message::user(text);
            self.store.append_message(&chat_id, user.clone())?;
            state.view.messages.push(user);

            if let Some(previous) = state.in_flight.take() {
                log::debug!("Cancelling previous request");
                previous.cancel();
            }
            let cancel = CancellationToken::new();
            state.in_flight = Some(cancel.clone());
            state.generation += 1;
            state.view.loading = true;
            (chat_id, mode, state.generation, cancel)
        };

        let result = self.gateway.ask(mode, text, &self.options, &cancel).await;

        let mut state = lock(&self.state);
        if cancel.is_cancelled() || state.generation != generation {
            log::debug!("Discarding superseded reply for chat {}", chat_id);
            return Ok(SendOutcome::Superseded);
        }
        state.in_flight = None;
        state.view.loading = false;

        let reply = match result {
            Ok(result) => result.into_message(),
            Err(AppError::Cancelled) => return Ok(SendOutcome::Superseded),
            Err(e) => {
                log::warn!("Request for chat {} failed: {}", chat_id, e);
                Message::failure(&e)
            }
        };

        // The chat may have been deleted while the request was out.
        if self.store.list_chats().iter().any(|c| c.id == chat_id) {
            self.store.append_message(&chat_id, reply.clone())?;
        }
        if state.view.chat_id == chat_id {
            state.view.messages.push(reply.clone());
        }
        Ok(SendOutcome::Replied(reply))
    }
}
