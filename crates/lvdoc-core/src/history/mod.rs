//! Bounded history of submitted inputs.

mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::models::session::HistoryEntry;

/// Storage key of the history list.
pub const HISTORY_KEY: &str = "documentHistory";

/// Default number of entries kept.
pub const MAX_HISTORY_ENTRIES: usize = 5;

/// Most-recent-first list of past inputs, persisted in a key-value store.
///
/// The list is read once when the store is opened; every change is
/// written back as a whole.
pub struct HistoryStore<S> {
    store: S,
    entries: Vec<HistoryEntry>,
    max_entries: usize,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Open the history with the default bound.
    pub fn open(store: S) -> Self {
        Self::with_limit(store, MAX_HISTORY_ENTRIES)
    }

    /// Open the history keeping at most `max_entries` entries, never more
    /// than [`MAX_HISTORY_ENTRIES`].
    pub fn with_limit(store: S, max_entries: usize) -> Self {
        if max_entries > MAX_HISTORY_ENTRIES {
            warn!(
                "History limit {} exceeds {}, using {}",
                max_entries, MAX_HISTORY_ENTRIES, MAX_HISTORY_ENTRIES
            );
        }
        let max_entries = max_entries.min(MAX_HISTORY_ENTRIES);
        let mut entries = load_entries(&store);
        entries.truncate(max_entries);
        debug!("Loaded {} history entries", entries.len());

        Self {
            store,
            entries,
            max_entries,
        }
    }

    /// Entries, most recent first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Record a submitted input and persist the list.
    pub fn record(&mut self, text: &str, timestamp: DateTime<Utc>) -> Result<(), StoreError> {
        self.entries.insert(0, HistoryEntry::new(text, timestamp));
        self.entries.truncate(self.max_entries);
        self.persist()
    }

    /// Remove every entry.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        self.persist()
    }

    fn persist(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.entries)?;
        self.store.set(HISTORY_KEY, &json)
    }
}

fn load_entries<S: KeyValueStore>(store: &S) -> Vec<HistoryEntry> {
    let raw = match store.get(HISTORY_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("Failed to read history, starting empty: {}", e);
            return Vec::new();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!("Stored history is not valid, starting empty: {}", e);
        Vec::new()
    })
}
