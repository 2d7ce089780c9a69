//! Background texture loading, one cancellable task per slot.
//!
//! Each task runs on its own thread and reports through a channel; the
//! renderer drains it with [`TextureSlots::poll`] once per frame and reads the
//! result with [`TextureSlots::loaded`].

use crate::error::TextureError;
use crate::texture::{SurfaceTexture, TextureFetcher};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;

/// Slot key for the central star; body ids use their own id.
pub const SUN_SLOT: &str = "__sun__";

pub enum SlotState {
    Loading,
    Loaded(Arc<SurfaceTexture>),
    Failed,
}

struct Slot {
    url: String,
    generation: u64,
    cancel: Arc<AtomicBool>,
    state: SlotState,
}

struct TaskResult {
    key: String,
    generation: u64,
    result: Result<SurfaceTexture, TextureError>,
}

pub struct TextureSlots {
    fetcher: Arc<dyn TextureFetcher>,
    slots: HashMap<String, Slot>,
    next_generation: u64,
    tx: mpsc::Sender<TaskResult>,
    rx: mpsc::Receiver<TaskResult>,
    repaint: Option<egui::Context>,
}

impl TextureSlots {
    pub fn new(fetcher: Arc<dyn TextureFetcher>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            fetcher,
            slots: HashMap::new(),
            next_generation: 0,
            tx,
            rx,
            repaint: None,
        }
    }

    /// Ask egui for a frame whenever a task finishes.
    pub fn with_repaint(mut self, ctx: egui::Context) -> Self {
        self.repaint = Some(ctx);
        self
    }

    /// Make the slot for `key` track `url`, restarting its task if the URL
    /// changed. `None` clears the slot.
    pub fn sync(&mut self, key: &str, url: Option<&str>) {
        let Some(url) = url.filter(|u| !u.is_empty()) else {
            self.remove(key);
            return;
        };
        if self.slots.get(key).is_some_and(|s| s.url == url) {
            return;
        }
        self.remove(key);

        let generation = self.next_generation;
        self.next_generation += 1;
        let cancel = Arc::new(AtomicBool::new(false));
        self.slots.insert(
            key.to_string(),
            Slot { url: url.to_string(), generation, cancel: cancel.clone(), state: SlotState::Loading },
        );

        let fetcher = self.fetcher.clone();
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();
        let task_key = key.to_string();
        let task_url = url.to_string();
        let spawned = std::thread::Builder::new()
            .name(format!("texture-{key}"))
            .spawn(move || {
                if cancel.load(Ordering::Relaxed) {
                    return;
                }
                let result = fetcher.fetch(&task_url);
                if cancel.load(Ordering::Relaxed) {
                    return;
                }
                let _ = tx.send(TaskResult { key: task_key, generation, result });
                if let Some(ctx) = repaint {
                    ctx.request_repaint();
                }
            });
        if let Err(e) = spawned {
            log::warn!("could not start texture task for {url}: {e}");
            if let Some(slot) = self.slots.get_mut(key) {
                slot.state = SlotState::Failed;
            }
        }
    }

    /// Drop every slot whose key is not in `keys`.
    pub fn retain<'a>(&mut self, keys: impl IntoIterator<Item = &'a str>) {
        let keep: std::collections::HashSet<&str> = keys.into_iter().collect();
        let stale: Vec<String> = self
            .slots
            .keys()
            .filter(|k| !keep.contains(k.as_str()))
            .cloned()
            .collect();
        for key in stale {
            self.remove(&key);
        }
    }

    fn remove(&mut self, key: &str) {
        if let Some(slot) = self.slots.remove(key) {
            slot.cancel.store(true, Ordering::Relaxed);
        }
    }

    /// Apply finished tasks. Returns the keys whose state changed.
    pub fn poll(&mut self) -> Vec<String> {
        let mut changed = Vec::new();
        while let Ok(done) = self.rx.try_recv() {
            let Some(slot) = self.slots.get_mut(&done.key) else {
                continue;
            };
            if slot.generation != done.generation {
                continue;
            }
            slot.state = match done.result {
                Ok(texture) => {
                    log::debug!("loaded texture for {} from {}", done.key, slot.url);
                    SlotState::Loaded(Arc::new(texture))
                }
                Err(e) => {
                    log::warn!("texture for {} unavailable, using fallback color: {e}", done.key);
                    SlotState::Failed
                }
            };
            changed.push(done.key);
        }
        changed
    }

    pub fn state(&self, key: &str) -> Option<&SlotState> {
        self.slots.get(key).map(|s| &s.state)
    }

    pub fn loaded(&self, key: &str) -> Option<Arc<SurfaceTexture>> {
        match self.state(key) {
            Some(SlotState::Loaded(t)) => Some(t.clone()),
            _ => None,
        }
    }

    pub fn pending(&self) -> usize {
        self.slots.values().filter(|s| matches!(s.state, SlotState::Loading)).count()
    }
}
