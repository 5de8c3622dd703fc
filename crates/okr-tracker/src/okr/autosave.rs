use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::warn;

/// Persistence seam for debounced actual-value saves; the service's
/// repository write sits behind this in production.
pub trait ValuePersister: Send + Sync + 'static {
    fn persist(&self, key_result_id: &str, value: &str) -> Result<(), PersistError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("save failed: {0}")]
    Failed(String),
}

struct PendingSave {
    value: String,
    generation: u64,
}

/// Collapses rapid edits to one persist per key result after an idle window.
///
/// Each `submit` supersedes the pending timer for that key result; `flush`
/// (the field-blur path) cancels the timer and persists the last-seen value
/// immediately. Timers are keyed per entity, so edits to different key
/// results never interfere. A failed persist is logged and dropped; the next
/// edit or blur re-attempts.
pub struct AutosaveQueue<P> {
    persister: Arc<P>,
    debounce: Duration,
    pending: Arc<Mutex<HashMap<String, PendingSave>>>,
    generation: std::sync::atomic::AtomicU64,
}

impl<P: ValuePersister> AutosaveQueue<P> {
    pub fn new(persister: Arc<P>, debounce: Duration) -> Arc<Self> {
        Arc::new(Self {
            persister,
            debounce,
            pending: Arc::new(Mutex::new(HashMap::new())),
            generation: std::sync::atomic::AtomicU64::new(0),
        })
    }

    /// Record an edit and (re)start its debounce timer.
    pub async fn submit(self: &Arc<Self>, key_result_id: &str, value: &str) {
        let generation = self
            .generation
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);

        {
            let mut pending = self.pending.lock().await;
            pending.insert(
                key_result_id.to_string(),
                PendingSave {
                    value: value.to_string(),
                    generation,
                },
            );
        }

        let queue = Arc::clone(self);
        let id = key_result_id.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(queue.debounce).await;
            let entry = {
                let mut pending = queue.pending.lock().await;
                match pending.get(&id) {
                    // A newer edit owns this key result now; let its timer run.
                    Some(save) if save.generation != generation => None,
                    Some(_) => pending.remove(&id),
                    None => None,
                }
            };
            if let Some(save) = entry {
                queue.persist(&id, &save.value);
            }
        });
    }

    /// Cancel any pending timer for this key result and persist its last
    /// submitted value right away. No-op when nothing is pending.
    pub async fn flush(&self, key_result_id: &str) {
        let entry = {
            let mut pending = self.pending.lock().await;
            pending.remove(key_result_id)
        };
        if let Some(save) = entry {
            self.persist(key_result_id, &save.value);
        }
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    fn persist(&self, key_result_id: &str, value: &str) {
        if let Err(err) = self.persister.persist(key_result_id, value) {
            warn!(%err, key_result_id, "actual value save failed, next edit will re-attempt");
        }
    }
}
