use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::models::{ResultPage, SearchKey, SearchKeyState};

/// Accumulated results, bucketed by search key.
///
/// Entries are created by the first merge for a key and never removed; only
/// their item lists shrink through dismissal. Every mutation is one critical
/// section, so merges and dismissals from concurrent handlers serialize.
#[derive(Debug, Default)]
pub struct ResultStore {
    results: Mutex<HashMap<SearchKey, SearchKeyState>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SearchKey, SearchKeyState>> {
        // The map is never left half-updated, so a poisoned lock is still usable.
        self.results.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Appends `page.items` after whatever is already stored for `key` and
    /// records `page.page_index` as the latest page.
    ///
    /// Items are not de-duplicated: fetching the same page twice stores its
    /// hits twice.
    pub fn merge(&self, key: &str, page: ResultPage) {
        let mut results = self.lock();
        let state = results.entry(key.to_string()).or_default();
        state.items.extend(page.items);
        state.page_index = page.page_index;
    }

    /// Removes every item with `id` from `key`'s list and returns how many
    /// were removed. Unknown keys are left alone.
    pub fn dismiss(&self, key: &str, id: &str) -> usize {
        let mut results = self.lock();
        let Some(state) = results.get_mut(key) else {
            return 0;
        };

        let before = state.items.len();
        state.items.retain(|item| item.id != id);
        before - state.items.len()
    }

    pub fn current_state(&self, key: &str) -> Option<SearchKeyState> {
        self.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Items of `key` whose title contains `needle`, ignoring case. Nothing
    /// is removed from the store.
    pub fn filtered(&self, key: &str, needle: &str) -> Option<SearchKeyState> {
        let needle = needle.to_lowercase();
        let results = self.lock();
        let state = results.get(key)?;

        Some(SearchKeyState {
            items: state
                .items
                .iter()
                .filter(|item| item.title.to_lowercase().contains(&needle))
                .cloned()
                .collect(),
            page_index: state.page_index,
        })
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
