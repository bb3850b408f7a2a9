use serde::Serialize;

use crate::error::AppResult;
use crate::state::AppState;
use crate::view::Sidebar;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileInfo {
    pub client_id: String,
    pub client_id_short: String,
    /// Opt-in flag for sharing data with the API operator. Stored only.
    pub share: bool,
}

pub fn get_profile(state: &AppState) -> AppResult<ProfileInfo> {
    let sidebar = Sidebar::mount(state.store.clone())?;
    Ok(ProfileInfo {
        client_id: sidebar.client_id().to_string(),
        client_id_short: sidebar.client_id_short(),
        share: sidebar.share(),
    })
}

pub fn update_share(state: &AppState, share: bool) -> AppResult<ProfileInfo> {
    let mut sidebar = Sidebar::mount(state.store.clone())?;
    sidebar.set_share(share)?;
    get_profile(state)
}

pub async fn check_health(state: &AppState) -> AppResult<bool> {
    let healthy = state.gateway.health().await?;
    log::info!("API at {} healthy={}", state.config.api_base_url, healthy);
    Ok(healthy)
}
