//! String-keyed record storage the chat store persists into.
//!
//! Two backends: [`MemoryStore`] for tests and throwaway runs, and
//! [`crate::db::kv_repo::SqliteStore`] for the on-disk profile.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::AppResult;

pub const CHATS_KEY: &str = "sm_chats";
pub const ACTIVE_KEY: &str = "sm_active_chat_id";
pub const CLIENT_KEY: &str = "sm_client_id";
pub const SHARE_KEY: &str = "sm_share_opt_in";
pub const SESSION_PREFIX: &str = "sm_chat_";

pub fn session_key(chat_id: &str) -> String {
    format!("{SESSION_PREFIX}{chat_id}")
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> AppResult<()>;
    fn remove(&self, key: &str) -> AppResult<()>;
}
