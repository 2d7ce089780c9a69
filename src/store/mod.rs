//! Named snapshots of the body list and the stores that keep them.

mod firestore;
mod memory;
mod worker;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;
pub use worker::{StoreReply, StoreRequest, StoreWorker};

use crate::bodies::Body;
use crate::error::StorageError;
use chrono::{DateTime, Utc};

/// Collection the reference web client writes to.
pub const DEFAULT_COLLECTION: &str = "solarSystemConfigs";

#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    /// Assigned by the store; `None` until saved.
    pub id: Option<String>,
    pub name: String,
    /// `None` when a stored record has no readable body list.
    pub planets: Option<Vec<Body>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Configuration {
    /// An unsaved snapshot.
    pub fn draft(name: impl Into<String>, planets: Vec<Body>) -> Self {
        Self { id: None, name: name.into(), planets: Some(planets), created_at: None }
    }
}

/// A document store holding one collection of configurations.
///
/// Every call is a single round trip with no retry.
pub trait ConfigStore: Send {
    /// Stamp `config` with a creation time, store it, and return its new id.
    fn save(&self, config: &Configuration) -> Result<String, StorageError>;

    /// Every stored configuration, newest first.
    fn list_all(&self) -> Result<Vec<Configuration>, StorageError>;

    /// `Ok(None)` when no record has this id.
    fn get_by_id(&self, id: &str) -> Result<Option<Configuration>, StorageError>;
}

impl<S: ConfigStore + Sync + ?Sized> ConfigStore for std::sync::Arc<S> {
    fn save(&self, config: &Configuration) -> Result<String, StorageError> {
        (**self).save(config)
    }

    fn list_all(&self) -> Result<Vec<Configuration>, StorageError> {
        (**self).list_all()
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Configuration>, StorageError> {
        (**self).get_by_id(id)
    }
}

/// Newest first; records without a timestamp sort last.
pub(crate) fn sort_newest_first(configs: &mut [Configuration]) {
    configs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
