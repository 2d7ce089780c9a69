//! Runs store calls on a dedicated thread so the UI never waits on the network.

use super::{ConfigStore, Configuration};
use crate::error::StorageError;
use std::sync::mpsc;

pub enum StoreRequest {
    Save(Configuration),
    List,
    Get(String),
}

pub enum StoreReply {
    Saved(Result<String, StorageError>),
    Listed(Result<Vec<Configuration>, StorageError>),
    Fetched {
        id: String,
        result: Result<Option<Configuration>, StorageError>,
    },
}

pub struct StoreWorker {
    tx: mpsc::Sender<StoreRequest>,
    rx: mpsc::Receiver<StoreReply>,
}

impl StoreWorker {
    /// Move `store` onto a new thread. Requests are served one at a time, in
    /// the order they were sent.
    pub fn spawn(store: Box<dyn ConfigStore>, repaint: Option<egui::Context>) -> std::io::Result<Self> {
        let (req_tx, req_rx) = mpsc::channel::<StoreRequest>();
        let (reply_tx, reply_rx) = mpsc::channel::<StoreReply>();
        std::thread::Builder::new()
            .name("config-store".to_string())
            .spawn(move || {
                while let Ok(request) = req_rx.recv() {
                    let reply = match request {
                        StoreRequest::Save(config) => StoreReply::Saved(store.save(&config)),
                        StoreRequest::List => StoreReply::Listed(store.list_all()),
                        StoreRequest::Get(id) => {
                            let result = store.get_by_id(&id);
                            StoreReply::Fetched { id, result }
                        }
                    };
                    if reply_tx.send(reply).is_err() {
                        break;
                    }
                    if let Some(ctx) = &repaint {
                        ctx.request_repaint();
                    }
                }
            })?;
        Ok(Self { tx: req_tx, rx: reply_rx })
    }

    /// Queue a request. Returns false if the worker thread is gone.
    pub fn send(&self, request: StoreRequest) -> bool {
        self.tx.send(request).is_ok()
    }

    pub fn try_recv(&self) -> Option<StoreReply> {
        self.rx.try_recv().ok()
    }

    #[cfg(test)]
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<StoreReply> {
        self.rx.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::default_bodies;
    use crate::store::MemoryStore;
    use std::time::Duration;

    #[test]
    fn replies_arrive_in_request_order() {
        let worker = StoreWorker::spawn(Box::new(MemoryStore::new()), None).unwrap();
        assert!(worker.send(StoreRequest::Save(Configuration::draft("X", default_bodies()))));
        assert!(worker.send(StoreRequest::List));
        assert!(worker.send(StoreRequest::Get("missing".to_string())));

        let wait = Duration::from_secs(5);
        let id = match worker.recv_timeout(wait) {
            Some(StoreReply::Saved(Ok(id))) => id,
            _ => panic!("expected a save reply"),
        };
        match worker.recv_timeout(wait) {
            Some(StoreReply::Listed(Ok(list))) => {
                assert_eq!(list[0].name, "X");
                assert_eq!(list[0].id.as_deref(), Some(id.as_str()));
            }
            _ => panic!("expected a list reply"),
        }
        match worker.recv_timeout(wait) {
            Some(StoreReply::Fetched { id, result: Ok(None) }) => assert_eq!(id, "missing"),
            _ => panic!("expected a not-found reply"),
        }
    }
}
