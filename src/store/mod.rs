//! Durable chat, session and profile state over a [`KeyValueStore`].
//!
//! Every read degrades to an empty or default value when the record is
//! missing or unreadable. Writes surface backend failures to the caller.

pub mod events;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::kv::{self, KeyValueStore};
use crate::models::chat::Chat;
use crate::models::message::Message;
use crate::models::mode::Mode;
use crate::models::session::Session;

pub use events::{ActiveChatChanged, ActiveChatChannel, Subscription};

#[derive(Clone)]
pub struct ChatStore {
    kv: Arc<dyn KeyValueStore>,
    active: ActiveChatChannel,
}

impl ChatStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            active: ActiveChatChannel::new(),
        }
    }

    /// Store over a fresh [`kv::MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(kv::MemoryStore::new()))
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.kv.get(key) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("Failed to read {}: {}", key, e);
                None
            }
        }
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("Ignoring unreadable record {}: {}", key, e);
                None
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AppResult<()> {
        let json = serde_json::to_string(value)?;
        self.kv.set(key, &json)
    }

    // ---- chats ----

    pub fn list_chats(&self) -> Vec<Chat> {
        self.read_json(kv::CHATS_KEY).unwrap_or_default()
    }

    fn save_chats(&self, chats: &[Chat]) -> AppResult<()> {
        self.write_json(kv::CHATS_KEY, chats)
    }

    pub fn create_chat(&self) -> AppResult<Chat> {
        let chat = Chat::new();
        let mut chats = self.list_chats();
        chats.insert(0, chat.clone());
        self.save_chats(&chats)?;
        self.save_session(&Session::empty(&chat.id))?;
        log::info!("Created chat {}", chat.id);
        self.set_active_chat_id(&chat.id)?;
        Ok(chat)
    }

    pub fn rename_chat(&self, id: &str, title: &str) -> AppResult<()> {
        let mut chats = self.list_chats();
        let Some(chat) = chats.iter_mut().find(|c| c.id == id) else {
            log::debug!("Rename ignored, chat {} not found", id);
            return Ok(());
        };
        chat.title = title.to_string();
        self.save_chats(&chats)
    }

    pub fn delete_chat(&self, id: &str) -> AppResult<()> {
        let remaining: Vec<Chat> = self.list_chats().into_iter().filter(|c| c.id != id).collect();
        let was_active = self.stored_active_id() == id;

        self.save_chats(&remaining)?;
        self.kv.remove(&kv::session_key(id))?;
        log::info!("Deleted chat {}", id);

        if was_active {
            let next = remaining.first().map(|c| c.id.as_str()).unwrap_or("");
            self.set_active_chat_id(next)?;
        }
        Ok(())
    }

    // ---- active pointer ----

    fn stored_active_id(&self) -> String {
        self.read_raw(kv::ACTIVE_KEY).unwrap_or_default()
    }

    /// Active chat id, or empty when unset or pointing at a chat that no longer exists.
    pub fn active_chat_id(&self) -> String {
        let id = self.stored_active_id();
        if id.is_empty() || self.list_chats().iter().any(|c| c.id == id) {
            id
        } else {
            log::warn!("Active pointer {} references a missing chat", id);
            String::new()
        }
    }

    /// Persist the pointer and notify subscribers. `id` must name an existing chat or be empty.
    pub fn set_active_chat_id(&self, id: &str) -> AppResult<()> {
        if !id.is_empty() && !self.list_chats().iter().any(|c| c.id == id) {
            return Err(AppError::NotFound(format!("Chat {id} not found")));
        }
        self.kv.set(kv::ACTIVE_KEY, id)?;
        self.active.publish(id);
        Ok(())
    }

    pub fn subscribe_active_change<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&ActiveChatChanged) + Send + Sync + 'static,
    {
        self.active.subscribe(handler)
    }

    pub fn active_subscriber_count(&self) -> usize {
        self.active.subscriber_count()
    }

    // ---- sessions ----

    pub fn load_session(&self, id: &str) -> Session {
        match self.read_json::<Session>(&kv::session_key(id)) {
            Some(mut session) => {
                session.id = id.to_string();
                session
            }
            None => Session::empty(id),
        }
    }

    pub fn save_session(&self, session: &Session) -> AppResult<()> {
        self.write_json(&kv::session_key(&session.id), session)
    }

    /// Lock a session to `mode`. Re-choosing the same mode is a no-op; a different one is rejected.
    pub fn set_session_mode(&self, id: &str, mode: Mode) -> AppResult<()> {
        let mut session = self.load_session(id);
        match session.mode {
            Some(current) if current == mode => return Ok(()),
            Some(current) => {
                return Err(AppError::InvalidRequest(format!(
                    "Chat {id} is locked to {current}"
                )))
            }
            None => session.mode = Some(mode),
        }
        self.save_session(&session)
    }

    pub fn append_message(&self, id: &str, message: Message) -> AppResult<()> {
        let mut session = self.load_session(id);
        session.messages.push(message);
        self.save_session(&session)
    }

    // ---- profile ----

    pub fn ensure_client_id(&self) -> AppResult<String> {
        if let Some(id) = self.read_raw(kv::CLIENT_KEY).filter(|id| !id.is_empty()) {
            return Ok(id);
        }
        let id = uuid::Uuid::new_v4().to_string();
        self.kv.set(kv::CLIENT_KEY, &id)?;
        log::info!("Generated client id {}", id);
        Ok(id)
    }

    pub fn share_preference(&self) -> bool {
        self.read_raw(kv::SHARE_KEY).as_deref() == Some("1")
    }

    pub fn set_share_preference(&self, share: bool) -> AppResult<()> {
        self.kv.set(kv::SHARE_KEY, if share { "1" } else { "0" })
    }
}
