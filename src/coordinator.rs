use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::models::{SearchKey, SearchKeyState};
use crate::search::SearchClient;
use crate::store::ResultStore;

/// What happened to one user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and appended under `key`.
    Merged { key: SearchKey, page_index: u32, added: usize },
    /// The key already had results, so nothing was requested.
    Cached { key: SearchKey },
    /// The request or its decoding failed; the store was not touched.
    Failed { key: SearchKey },
}

/// Issues one search request per explicit action and feeds the results into
/// the shared [`ResultStore`].
///
/// Failures are logged and dropped. Concurrent loads are not coordinated:
/// each merges whenever its response arrives.
#[derive(Debug, Clone)]
pub struct FetchCoordinator {
    client: SearchClient,
    store: Arc<ResultStore>,
}

impl FetchCoordinator {
    pub fn new(config: &Config, store: Arc<ResultStore>) -> Result<Self> {
        Ok(Self {
            client: SearchClient::new(config)?,
            store,
        })
    }

    pub fn store(&self) -> &Arc<ResultStore> {
        &self.store
    }

    /// Fetches `page` of `term` and merges it under `term`.
    pub async fn load(&self, term: &str, page: u32) -> LoadOutcome {
        // The key is fixed now, not when the response lands.
        let key: SearchKey = term.to_string();

        match self.client.fetch_page(term, page).await {
            Ok(result) => {
                let page_index = result.page_index;
                let added = result.items.len();
                self.store.merge(&key, result);
                tracing::info!(key = %key, page = page_index, added, "merged search page");
                LoadOutcome::Merged { key, page_index, added }
            }
            Err(err) => {
                tracing::warn!(key = %key, page, error = %err, "search request failed; keeping previous results");
                LoadOutcome::Failed { key }
            }
        }
    }

    pub fn needs_fetch(&self, key: &str) -> bool {
        !self.store.contains(key)
    }

    /// A search submission: only the first submission of a key hits the network.
    pub async fn submit(&self, term: &str) -> LoadOutcome {
        if self.needs_fetch(term) {
            self.load(term, 0).await
        } else {
            tracing::debug!(key = %term, "search key already loaded");
            LoadOutcome::Cached { key: term.to_string() }
        }
    }

    /// Fetches the page after the last one merged for `key`.
    pub async fn load_more(&self, key: &str) -> LoadOutcome {
        let current = self
            .store
            .current_state(key)
            .map(|state| state.page_index)
            .unwrap_or(0);
        let Some(next) = current.checked_add(1) else {
            tracing::warn!(key = %key, page = current, "no page after the last one merged");
            return LoadOutcome::Failed { key: key.to_string() };
        };
        self.load(key, next).await
    }

    pub fn dismiss(&self, key: &str, id: &str) -> usize {
        let removed = self.store.dismiss(key, id);
        tracing::debug!(key = %key, id = %id, removed, "dismissed item");
        removed
    }

    pub fn current_state(&self, key: &str) -> Option<SearchKeyState> {
        self.store.current_state(key)
    }
}
