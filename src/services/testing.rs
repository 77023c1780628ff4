//! In-memory store for service tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::models::Entry;
use crate::repository::{EntryStore, RepositoryError, Result};

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<i64, Entry>>,
    fail_writes: bool,
    upserts: AtomicUsize,
}

impl MemoryStore {
    pub fn with(entries: Vec<Entry>) -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(entries.into_iter().map(|e| (e.id, e)).collect()),
            fail_writes: false,
            upserts: AtomicUsize::new(0),
        })
    }

    /// A store whose every write fails.
    pub fn read_only(entries: Vec<Entry>) -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(entries.into_iter().map(|e| (e.id, e)).collect()),
            fail_writes: true,
            upserts: AtomicUsize::new(0),
        })
    }

    pub fn get(&self, id: i64) -> Option<Entry> {
        self.entries.lock().unwrap().get(&id).cloned()
    }

    /// Number of successful full upserts.
    pub fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl EntryStore for MemoryStore {
    fn find_by_title(&self, title: &str) -> Result<Option<Entry>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .values()
            .find(|e| e.details.title.as_deref() == Some(title))
            .cloned())
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Entry>> {
        Ok(self.get(id))
    }

    fn list_all(&self, exclude_id: Option<i64>, limit: Option<usize>) -> Result<Vec<Entry>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .values()
            .filter(|e| Some(e.id) != exclude_id)
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    fn upsert(&self, entry: &Entry) -> Result<()> {
        if self.fail_writes {
            return Err(RepositoryError::Database(rusqlite::Error::InvalidQuery));
        }
        self.entries
            .lock()
            .unwrap()
            .insert(entry.id, entry.clone());
        self.upserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn set_cover(&self, id: i64, cover_image_url: &str) -> Result<()> {
        if self.fail_writes {
            return Err(RepositoryError::Database(rusqlite::Error::InvalidQuery));
        }
        if let Some(entry) = self.entries.lock().unwrap().get_mut(&id) {
            entry.details.cover_image_url = Some(cover_image_url.to_string());
        }
        Ok(())
    }
}
