use crate::error::{AppError, AppResult};
use crate::models::chat::Chat;
use crate::state::AppState;
use crate::view::{Sidebar, SidebarItem};

/// Resolve a chat given as a 1-based list position, a full id, or a unique id prefix.
pub fn resolve_chat(chats: &[Chat], reference: &str) -> AppResult<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(AppError::InvalidRequest("Chat reference is empty".into()));
    }

    if let Ok(position) = reference.parse::<usize>() {
        if let Some(chat) = position.checked_sub(1).and_then(|i| chats.get(i)) {
            return Ok(chat.id.clone());
        }
    }

    if let Some(chat) = chats.iter().find(|c| c.id == reference) {
        return Ok(chat.id.clone());
    }

    let mut matches = chats.iter().filter(|c| c.id.starts_with(reference));
    match (matches.next(), matches.next()) {
        (Some(chat), None) => Ok(chat.id.clone()),
        (Some(_), Some(_)) => Err(AppError::InvalidRequest(format!(
            "Chat reference '{reference}' is ambiguous"
        ))),
        _ => Err(AppError::NotFound(format!("Chat {reference} not found"))),
    }
}

pub fn list_chats(state: &AppState) -> AppResult<Vec<SidebarItem>> {
    Ok(Sidebar::mount(state.store.clone())?.items())
}

pub fn create_chat(state: &AppState) -> AppResult<Chat> {
    Sidebar::mount(state.store.clone())?.new_chat()
}

pub fn select_chat(state: &AppState, reference: &str) -> AppResult<Chat> {
    let mut sidebar = Sidebar::mount(state.store.clone())?;
    let id = resolve_chat(sidebar.chats(), reference)?;
    sidebar.select(&id)?;
    find(&sidebar, &id)
}

pub fn rename_chat(state: &AppState, reference: &str, title: &str) -> AppResult<Chat> {
    let mut sidebar = Sidebar::mount(state.store.clone())?;
    let id = resolve_chat(sidebar.chats(), reference)?;
    sidebar.rename(&id, title)?;
    find(&sidebar, &id)
}

/// Delete a chat and return the chats that remain.
pub fn delete_chat(state: &AppState, reference: &str) -> AppResult<Vec<SidebarItem>> {
    let mut sidebar = Sidebar::mount(state.store.clone())?;
    let id = resolve_chat(sidebar.chats(), reference)?;
    sidebar.delete(&id)?;
    Ok(sidebar.items())
}

fn find(sidebar: &Sidebar, id: &str) -> AppResult<Chat> {
    sidebar
        .chats()
        .iter()
        .find(|c| c.id == id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Chat {id} not found")))
}
