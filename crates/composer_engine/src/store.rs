use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use composer_core::{MessageId, QueuedMessage};
use composer_logging::{composer_debug, composer_error, composer_warn};
use serde::{Deserialize, Serialize};

use crate::{RonDocument, StoreError};

pub const QUEUE_FILENAME: &str = "queue.ron";

const FORMAT_VERSION: u32 = 1;

/// Durable, ordered list of pending messages.
///
/// Best effort: implementations swallow (and log) their own failures. A
/// failed `load` reads as an empty queue and a failed `save` is a no-op;
/// the controller's in-memory queue stays authoritative for the session.
/// No validation happens here.
pub trait QueueStore: Send {
    /// Stored queue in stored order; empty when missing or unreadable.
    fn load(&self) -> Vec<QueuedMessage>;

    /// Replaces the stored queue with `messages`, in that order.
    fn save(&self, messages: &[QueuedMessage]);

    fn remove(&self, id: MessageId) {
        let mut messages = self.load();
        let before = messages.len();
        messages.retain(|message| message.id != id);
        if messages.len() != before {
            self.save(&messages);
        }
    }

    fn clear(&self) {
        self.save(&[]);
    }

    fn reorder(&self, messages: &[QueuedMessage]) {
        self.save(messages);
    }

    fn update_content(&self, id: MessageId, content: &str) {
        let mut messages = self.load();
        let Some(message) = messages.iter_mut().find(|message| message.id == id) else {
            return;
        };
        message.content = content.to_string();
        self.save(&messages);
    }
}

impl<S: QueueStore + ?Sized> QueueStore for Box<S> {
    fn load(&self) -> Vec<QueuedMessage> {
        (**self).load()
    }

    fn save(&self, messages: &[QueuedMessage]) {
        (**self).save(messages)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedMessage {
    id: MessageId,
    position: usize,
    content: String,
    enqueued_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedQueue {
    version: u32,
    messages: Vec<PersistedMessage>,
}

/// Queue stored as a RON document in a state directory.
#[derive(Debug, Clone)]
pub struct FileQueueStore {
    document: RonDocument<PersistedQueue>,
}

impl FileQueueStore {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            document: RonDocument::new(state_dir, QUEUE_FILENAME),
        }
    }

    pub fn path(&self) -> &Path {
        self.document.path()
    }

    pub fn try_load(&self) -> Result<Vec<QueuedMessage>, StoreError> {
        let Some(stored) = self.document.read()? else {
            return Ok(Vec::new());
        };
        if stored.version != FORMAT_VERSION {
            composer_warn!(
                "Stored queue {:?} has format version {}, expected {}",
                self.path(),
                stored.version,
                FORMAT_VERSION
            );
        }
        Ok(from_persisted(stored))
    }

    pub fn try_save(&self, messages: &[QueuedMessage]) -> Result<(), StoreError> {
        self.document.write(&to_persisted(messages))
    }
}

impl QueueStore for FileQueueStore {
    fn load(&self) -> Vec<QueuedMessage> {
        match self.try_load() {
            Ok(messages) => {
                composer_debug!("Loaded {} queued message(s) from {:?}", messages.len(), self.path());
                messages
            }
            Err(err) => {
                composer_warn!("Treating stored queue as empty: {}", err);
                Vec::new()
            }
        }
    }

    fn save(&self, messages: &[QueuedMessage]) {
        if let Err(err) = self.try_save(messages) {
            composer_error!("Failed to persist queue to {:?}: {}", self.path(), err);
        }
    }
}

/// In-process store; clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct MemoryQueueStore {
    messages: Arc<Mutex<Vec<QueuedMessage>>>,
}

impl MemoryQueueStore {
    pub fn with_messages(messages: Vec<QueuedMessage>) -> Self {
        Self {
            messages: Arc::new(Mutex::new(messages)),
        }
    }
}

impl QueueStore for MemoryQueueStore {
    fn load(&self) -> Vec<QueuedMessage> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, messages: &[QueuedMessage]) {
        *self.messages.lock().unwrap_or_else(PoisonError::into_inner) = messages.to_vec();
    }
}

fn to_persisted(messages: &[QueuedMessage]) -> PersistedQueue {
    PersistedQueue {
        version: FORMAT_VERSION,
        messages: messages
            .iter()
            .enumerate()
            .map(|(position, message)| PersistedMessage {
                id: message.id,
                position,
                content: message.content.clone(),
                enqueued_at: message.enqueued_at,
            })
            .collect(),
    }
}

fn from_persisted(stored: PersistedQueue) -> Vec<QueuedMessage> {
    let mut messages = stored.messages;
    // Hand-edited files may repeat positions; the stamp breaks the tie.
    messages.sort_by_key(|message| (message.position, message.enqueued_at));
    messages
        .into_iter()
        .map(|message| QueuedMessage {
            id: message.id,
            content: message.content,
            enqueued_at: message.enqueued_at,
        })
        .collect()
}
