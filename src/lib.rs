pub mod api;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod models;
pub mod search;
pub mod store;

use std::sync::Arc;
use config::Config;
use coordinator::FetchCoordinator;
use store::ResultStore;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub coordinator: FetchCoordinator,
}

impl AppState {
    pub fn new(config: Config) -> error::Result<Self> {
        let store = Arc::new(ResultStore::new());
        let coordinator = FetchCoordinator::new(&config, store)?;
        Ok(Self {
            config: Arc::new(config),
            coordinator,
        })
    }
}
