use serde::Serialize;

use crate::error::AppResult;
use crate::models::chat::Chat;
use crate::store::ChatStore;

const UNTITLED: &str = "Untitled";
const CLIENT_ID_PREVIEW: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarItem {
    pub id: String,
    pub title: String,
    pub active: bool,
}

/// Chat list plus the profile controls. Mutations go straight to the store;
/// the main panel learns about pointer moves through the store's channel.
pub struct Sidebar {
    store: ChatStore,
    chats: Vec<Chat>,
    active: String,
    share: bool,
    client_id: String,
}

impl Sidebar {
    pub fn mount(store: ChatStore) -> AppResult<Self> {
        let client_id = store.ensure_client_id()?;
        let mut sidebar = Self {
            store,
            chats: Vec::new(),
            active: String::new(),
            share: false,
            client_id,
        };
        sidebar.refresh();
        Ok(sidebar)
    }

    pub fn refresh(&mut self) {
        self.chats = self.store.list_chats();
        self.active = self.store.active_chat_id();
        self.share = self.store.share_preference();
    }

    pub fn new_chat(&mut self) -> AppResult<Chat> {
        let chat = self.store.create_chat()?;
        self.refresh();
        Ok(chat)
    }

    pub fn select(&mut self, id: &str) -> AppResult<()> {
        self.store.set_active_chat_id(id)?;
        self.active = id.to_string();
        Ok(())
    }

    /// Blank titles are stored as "Untitled".
    pub fn rename(&mut self, id: &str, title: &str) -> AppResult<()> {
        let title = match title.trim() {
            "" => UNTITLED,
            t => t,
        };
        self.store.rename_chat(id, title)?;
        self.refresh();
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> AppResult<()> {
        self.store.delete_chat(id)?;
        self.refresh();
        Ok(())
    }

    pub fn set_share(&mut self, share: bool) -> AppResult<()> {
        self.store.set_share_preference(share)?;
        self.share = share;
        Ok(())
    }

    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    pub fn active_chat_id(&self) -> &str {
        &self.active
    }

    pub fn share(&self) -> bool {
        self.share
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_id_short(&self) -> String {
        let head: String = self.client_id.chars().take(CLIENT_ID_PREVIEW).collect();
        format!("{head}…")
    }

    pub fn items(&self) -> Vec<SidebarItem> {
        self.chats
            .iter()
            .map(|c| SidebarItem {
                id: c.id.clone(),
                title: c.display_title().to_string(),
                active: c.id == self.active,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_generates_client_id() {
        let store = ChatStore::in_memory();
        let sidebar = Sidebar::mount(store.clone()).unwrap();
        assert_eq!(sidebar.client_id(), store.ensure_client_id().unwrap());
        assert_eq!(sidebar.client_id_short().chars().count(), CLIENT_ID_PREVIEW + 1);
        assert!(sidebar.chats().is_empty());
        assert!(!sidebar.share());
    }

    #[test]
    fn test_new_select_and_items() {
        let mut sidebar = Sidebar::mount(ChatStore::in_memory()).unwrap();
        let first = sidebar.new_chat().unwrap();
        let second = sidebar.new_chat().unwrap();
        assert_eq!(sidebar.active_chat_id(), second.id);

        sidebar.select(&first.id).unwrap();
        let items = sidebar.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, second.id);
        assert!(!items[0].active);
        assert!(items[1].active);
    }

    #[test]
    fn test_rename_trims_and_defaults() {
        let mut sidebar = Sidebar::mount(ChatStore::in_memory()).unwrap();
        let chat = sidebar.new_chat().unwrap();

        sidebar.rename(&chat.id, "  Router  ").unwrap();
        assert_eq!(sidebar.chats()[0].title, "Router");

        sidebar.rename(&chat.id, "   ").unwrap();
        assert_eq!(sidebar.chats()[0].title, UNTITLED);
    }

    #[test]
    fn test_delete_refreshes_active() {
        let mut sidebar = Sidebar::mount(ChatStore::in_memory()).unwrap();
        let older = sidebar.new_chat().unwrap();
        let newer = sidebar.new_chat().unwrap();

        sidebar.delete(&newer.id).unwrap();
        assert_eq!(sidebar.active_chat_id(), older.id);
        assert_eq!(sidebar.chats().len(), 1);

        sidebar.delete(&older.id).unwrap();
        assert_eq!(sidebar.active_chat_id(), "");
    }

    #[test]
    fn test_share_toggle_persists() {
        let store = ChatStore::in_memory();
        let mut sidebar = Sidebar::mount(store.clone()).unwrap();
        sidebar.set_share(true).unwrap();
        assert!(store.share_preference());
        assert!(Sidebar::mount(store).unwrap().share());
    }
}
