//! Process-local store, used for `--offline` runs and tests.

use super::{sort_newest_first, ConfigStore, Configuration};
use crate::error::StorageError;
use chrono::{DateTime, Duration, Utc};
use egui::mutex::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    records: Vec<Configuration>,
    next_id: u64,
    last_stamp: Option<DateTime<Utc>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }
}

impl ConfigStore for MemoryStore {
    fn save(&self, config: &Configuration) -> Result<String, StorageError> {
        let mut inner = self.inner.lock();
        // Strictly increasing, so save order is also sort order.
        let now = Utc::now();
        let stamp = match inner.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        inner.last_stamp = Some(stamp);
        inner.next_id += 1;
        let id = format!("mem-{}", inner.next_id);
        inner.records.push(Configuration {
            id: Some(id.clone()),
            created_at: Some(stamp),
            ..config.clone()
        });
        Ok(id)
    }

    fn list_all(&self) -> Result<Vec<Configuration>, StorageError> {
        let mut all = self.inner.lock().records.clone();
        sort_newest_first(&mut all);
        Ok(all)
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Configuration>, StorageError> {
        let inner = self.inner.lock();
        Ok(inner.records.iter().find(|c| c.id.as_deref() == Some(id)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::default_bodies;

    #[test]
    fn empty_store_lists_nothing() {
        let store = MemoryStore::new();
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn latest_save_lists_first() {
        let store = MemoryStore::new();
        for name in ["A", "B", "X"] {
            store.save(&Configuration::draft(name, default_bodies())).unwrap();
        }
        let all = store.list_all().unwrap();
        let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["X", "B", "A"]);
        assert!(all.iter().all(|c| c.id.is_some() && c.created_at.is_some()));
    }

    #[test]
    fn get_by_id_finds_or_reports_missing() {
        let store = MemoryStore::new();
        let id = store.save(&Configuration::draft("solo", default_bodies())).unwrap();
        let found = store.get_by_id(&id).unwrap().unwrap();
        assert_eq!(found.name, "solo");
        assert_eq!(found.planets.as_deref(), Some(default_bodies().as_slice()));
        assert!(store.get_by_id("nope").unwrap().is_none());
        assert_eq!(store.len(), 1);
    }
}
