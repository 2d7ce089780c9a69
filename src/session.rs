//! Save/list/load orchestration on the UI thread.
//!
//! Owns the `is_loading` flag, the error banner, and the list of saved
//! configurations shown in the load dropdown. All store traffic goes through
//! a [`StoreWorker`]; replies are applied in [`Session::poll`].

use crate::state::BodyState;
use crate::store::{Configuration, StoreReply, StoreRequest, StoreWorker};

pub const NOT_CONFIGURED: &str = "Persistence is not configured";
pub const SAVE_FAILED: &str = "Failed to save configuration";
pub const LIST_FAILED: &str = "Failed to load configurations";
pub const LOAD_FAILED: &str = "Failed to load configuration";
const WORKER_GONE: &str = "Configuration store stopped responding";

/// What a finished load did to the body list.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadOutcome {
    /// The body list was replaced with this many bodies.
    Replaced(usize),
    /// No configuration has that id.
    Missing,
    /// The configuration exists but carries no bodies.
    Empty,
}

pub struct Session {
    worker: Option<StoreWorker>,
    saved: Vec<Configuration>,
    is_loading: bool,
    banner: Option<String>,
}

impl Session {
    pub fn new(worker: StoreWorker) -> Self {
        Self { worker: Some(worker), saved: Vec::new(), is_loading: false, banner: None }
    }

    /// No store: every persistence action reports [`NOT_CONFIGURED`].
    pub fn disabled() -> Self {
        Self { worker: None, saved: Vec::new(), is_loading: false, banner: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.worker.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    pub fn saved(&self) -> &[Configuration] {
        &self.saved
    }

    pub fn can_save(&self, name: &str) -> bool {
        !name.trim().is_empty() && !self.is_loading
    }

    /// Snapshot the body list under `name`. Returns false when nothing was sent.
    pub fn save(&mut self, name: &str, state: &BodyState) -> bool {
        if !self.can_save(name) {
            return false;
        }
        let config = Configuration::draft(name.trim(), state.snapshot());
        self.dispatch(StoreRequest::Save(config))
    }

    pub fn refresh(&mut self) -> bool {
        self.dispatch(StoreRequest::List)
    }

    pub fn load(&mut self, id: &str) -> bool {
        self.dispatch(StoreRequest::Get(id.to_string()))
    }

    fn dispatch(&mut self, request: StoreRequest) -> bool {
        let Some(worker) = &self.worker else {
            self.banner = Some(NOT_CONFIGURED.to_string());
            return false;
        };
        if !worker.send(request) {
            log::error!("config store worker is gone");
            self.banner = Some(WORKER_GONE.to_string());
            self.is_loading = false;
            return false;
        }
        self.is_loading = true;
        true
    }

    /// Apply every reply that has arrived. Returns the outcome of any loads.
    pub fn poll(&mut self, state: &mut BodyState) -> Vec<LoadOutcome> {
        let mut outcomes = Vec::new();
        while let Some(reply) = self.worker.as_ref().and_then(StoreWorker::try_recv) {
            outcomes.extend(self.apply(reply, state));
        }
        outcomes
    }

    fn apply(&mut self, reply: StoreReply, state: &mut BodyState) -> Option<LoadOutcome> {
        match reply {
            StoreReply::Saved(Ok(id)) => {
                log::info!("saved configuration {id}");
                self.banner = None;
                // Stay loading through the list refresh.
                self.refresh();
                None
            }
            StoreReply::Saved(Err(e)) => {
                log::error!("saving configuration failed: {e}");
                self.fail(SAVE_FAILED);
                None
            }
            StoreReply::Listed(Ok(configs)) => {
                log::info!("{} saved configurations", configs.len());
                self.saved = configs;
                self.banner = None;
                self.is_loading = false;
                None
            }
            StoreReply::Listed(Err(e)) => {
                log::error!("listing configurations failed: {e}");
                self.fail(LIST_FAILED);
                None
            }
            StoreReply::Fetched { id, result: Ok(found) } => {
                self.is_loading = false;
                let outcome = match found {
                    None => {
                        log::info!("configuration {id} not found, keeping current bodies");
                        LoadOutcome::Missing
                    }
                    Some(config) => match config.planets {
                        Some(bodies) if !bodies.is_empty() => {
                            log::info!("loaded configuration {id} ({})", config.name);
                            let count = bodies.len();
                            state.replace_all(bodies);
                            self.banner = None;
                            LoadOutcome::Replaced(count)
                        }
                        _ => {
                            log::warn!("configuration {id} has no bodies, keeping current bodies");
                            LoadOutcome::Empty
                        }
                    },
                };
                Some(outcome)
            }
            StoreReply::Fetched { id, result: Err(e) } => {
                log::error!("loading configuration {id} failed: {e}");
                self.fail(LOAD_FAILED);
                None
            }
        }
    }

    fn fail(&mut self, message: &str) {
        self.banner = Some(message.to_string());
        self.is_loading = false;
    }

    /// Block until the in-flight request chain settles.
    #[cfg(test)]
    pub fn settle(&mut self, state: &mut BodyState) -> Vec<LoadOutcome> {
        let mut outcomes = Vec::new();
        while self.is_loading {
            let reply = self
                .worker
                .as_ref()
                .and_then(|w| w.recv_timeout(std::time::Duration::from_secs(5)))
                .expect("store worker did not answer");
            outcomes.extend(self.apply(reply, state));
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::{default_bodies, BodyAttribute};
    use crate::error::StorageError;
    use crate::store::{ConfigStore, MemoryStore};
    use std::sync::Arc;

    fn with_store(store: Arc<MemoryStore>) -> Session {
        Session::new(StoreWorker::spawn(Box::new(store), None).unwrap())
    }

    #[test]
    fn blank_names_never_reach_the_store() {
        let store = Arc::new(MemoryStore::new());
        let mut session = with_store(store.clone());
        let state = BodyState::new(default_bodies());
        for name in ["", "   ", "\t\n"] {
            assert!(!session.can_save(name));
            assert!(!session.save(name, &state));
        }
        assert!(!session.is_loading());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn save_then_list_puts_it_first() {
        let store = Arc::new(MemoryStore::new());
        store.save(&Configuration::draft("older", default_bodies())).unwrap();
        let mut session = with_store(store.clone());
        let mut state = BodyState::new(default_bodies());

        assert!(session.save("  X  ", &state));
        assert!(session.is_loading());
        assert!(!session.can_save("Y"));
        session.settle(&mut state);

        assert!(!session.is_loading());
        assert_eq!(session.saved()[0].name, "X");
        assert_eq!(session.saved().len(), 2);
        assert!(session.banner().is_none());
    }

    #[test]
    fn missing_id_leaves_bodies_alone() {
        let mut session = with_store(Arc::new(MemoryStore::new()));
        let mut state = BodyState::new(default_bodies());
        state.set_attribute("earth", BodyAttribute::Size, 4.0);
        let before = state.snapshot();

        session.load("does-not-exist");
        let outcomes = session.settle(&mut state);
        assert_eq!(outcomes, [LoadOutcome::Missing]);
        assert_eq!(state.snapshot(), before);
        assert!(session.banner().is_none());
    }

    #[test]
    fn load_replaces_the_whole_list() {
        let store = Arc::new(MemoryStore::new());
        let mut saved = default_bodies();
        saved.truncate(3);
        saved[1].speed = 2.5;
        let id = store.save(&Configuration::draft("three", saved.clone())).unwrap();

        let mut session = with_store(store);
        let mut state = BodyState::new(default_bodies());
        session.load(&id);
        assert_eq!(session.settle(&mut state), [LoadOutcome::Replaced(3)]);
        assert_eq!(state.bodies(), saved.as_slice());
    }

    #[test]
    fn empty_configurations_are_ignored() {
        let store = Arc::new(MemoryStore::new());
        let empty = store.save(&Configuration::draft("none", Vec::new())).unwrap();
        let mut bare = Configuration::draft("bare", Vec::new());
        bare.planets = None;
        let bare = store.save(&bare).unwrap();

        let mut session = with_store(store);
        let mut state = BodyState::new(default_bodies());
        for id in [empty, bare] {
            session.load(&id);
            assert_eq!(session.settle(&mut state), [LoadOutcome::Empty]);
        }
        assert_eq!(state.bodies(), default_bodies().as_slice());
    }

    struct BrokenStore;

    impl ConfigStore for BrokenStore {
        fn save(&self, _: &Configuration) -> Result<String, StorageError> {
            Err(StorageError::Status { status: 403, message: "denied".to_string() })
        }
        fn list_all(&self) -> Result<Vec<Configuration>, StorageError> {
            Err(StorageError::Transport("offline".to_string()))
        }
        fn get_by_id(&self, _: &str) -> Result<Option<Configuration>, StorageError> {
            Err(StorageError::Transport("offline".to_string()))
        }
    }

    #[test]
    fn failures_become_banners_and_keep_state() {
        let mut session = Session::new(StoreWorker::spawn(Box::new(BrokenStore), None).unwrap());
        let mut state = BodyState::new(default_bodies());

        session.save("X", &state);
        session.settle(&mut state);
        assert_eq!(session.banner(), Some(SAVE_FAILED));

        session.refresh();
        session.settle(&mut state);
        assert_eq!(session.banner(), Some(LIST_FAILED));

        session.load("any");
        session.settle(&mut state);
        assert_eq!(session.banner(), Some(LOAD_FAILED));
        assert!(!session.is_loading());
        assert_eq!(state.bodies(), default_bodies().as_slice());
    }

    #[test]
    fn disabled_session_says_so() {
        let mut session = Session::disabled();
        let mut state = BodyState::new(default_bodies());
        assert!(!session.save("X", &state));
        assert_eq!(session.banner(), Some(NOT_CONFIGURED));
        session.dismiss_banner();
        assert!(!session.load("abc"));
        assert_eq!(session.banner(), Some(NOT_CONFIGURED));
        assert!(session.poll(&mut state).is_empty());
        assert!(!session.is_loading());
    }
}
