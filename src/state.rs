use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::kv_repo::SqliteStore;
use crate::db::migrations;
use crate::error::AppResult;
use crate::gateway::{HttpGateway, QueryGateway};
use crate::store::ChatStore;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    /// Profile store backed by the SQLite database in `config.data_dir`
    pub store: ChatStore,
    /// Remote API client
    pub gateway: Arc<dyn QueryGateway>,
}

impl AppState {
    pub fn open(config: AppConfig) -> AppResult<Self> {
        let conn = migrations::init_db(&config.data_dir)?;
        let store = ChatStore::new(Arc::new(SqliteStore::new(conn)));
        let gateway = Arc::new(HttpGateway::from_config(&config)?);
        log::info!(
            "Profile at {:?}, API at {}",
            config.data_dir,
            config.api_base_url
        );
        Ok(Self::new(config, store, gateway))
    }

    pub fn new(config: AppConfig, store: ChatStore, gateway: Arc<dyn QueryGateway>) -> Self {
        Self {
            config,
            store,
            gateway,
        }
    }
}
