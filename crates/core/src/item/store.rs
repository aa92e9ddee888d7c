//! In-memory item store with synchronous, per-item-atomic mutations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::handle::{HandleRegistry, TransientHandle};
use super::types::{ConversionItem, ItemStatus, SourceImage};

/// Read-only snapshot of one item, for display and assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    pub id: u64,
    pub name: String,
    pub status: ItemStatus,
    pub result_name: String,
    pub error: Option<String>,
}

/// A completed item's payload, cloned out for delivery.
#[derive(Debug, Clone)]
pub struct ReadyResult {
    pub id: u64,
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Ordered collection of conversion items.
///
/// Display order is insertion order and is never changed by conversion
/// outcome. All mutations are synchronous and take the inner lock once,
/// so each item's revoke-then-remove is atomic with respect to concurrent
/// workers. Worker write-backs (`complete`/`fail`) are keyed by id and
/// no-op when the item was removed while its exchange was in flight.
#[derive(Debug)]
pub struct ItemStore {
    items: Mutex<Vec<ConversionItem>>,
    next_id: AtomicU64,
    handles: Arc<HandleRegistry>,
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemStore {
    /// Create an empty store with its own handle registry.
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            handles: HandleRegistry::new(),
        }
    }

    /// The registry that tracks this store's transient handles.
    pub fn registry(&self) -> &Arc<HandleRegistry> {
        &self.handles
    }

    /// Append one item per source, in arrival order. Returns the new ids.
    pub fn add(&self, sources: Vec<SourceImage>) -> Vec<u64> {
        let mut items = self.items.lock().expect("item store lock poisoned");
        let mut ids = Vec::with_capacity(sources.len());
        for source in sources {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let preview = self.handles.create(source.bytes.clone());
            items.push(ConversionItem {
                id,
                source,
                preview,
                status: ItemStatus::Idle,
                result: None,
                result_name: String::new(),
                error: None,
            });
            ids.push(id);
        }
        ids
    }

    /// Remove an item, releasing its handles. No-op when the id is absent.
    pub fn remove(&self, id: u64) {
        let mut items = self.items.lock().expect("item store lock poisoned");
        // Dropping the item drops its preview and result handles.
        items.retain(|item| item.id != id);
    }

    /// Release every result and reset all items to `Idle`.
    ///
    /// Previews and the items themselves are kept.
    pub fn clear_results(&self) {
        let mut items = self.items.lock().expect("item store lock poisoned");
        for item in items.iter_mut() {
            item.result = None;
            item.result_name.clear();
            item.error = None;
            item.status = ItemStatus::Idle;
        }
    }

    /// Empty the store, releasing every transient handle.
    pub fn clear_all(&self) {
        let mut items = self.items.lock().expect("item store lock poisoned");
        items.clear();
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.lock().expect("item store lock poisoned").len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of a single item.
    pub fn get(&self, id: u64) -> Option<ItemView> {
        let items = self.items.lock().expect("item store lock poisoned");
        items.iter().find(|i| i.id == id).map(Self::view)
    }

    /// Snapshots of all items in display order.
    pub fn views(&self) -> Vec<ItemView> {
        let items = self.items.lock().expect("item store lock poisoned");
        items.iter().map(Self::view).collect()
    }

    /// Ids in display order; the bulk work queue is built from this.
    pub fn snapshot_ids(&self) -> Vec<u64> {
        let items = self.items.lock().expect("item store lock poisoned");
        items.iter().map(|i| i.id).collect()
    }

    /// Count of items in the given status.
    pub fn count_status(&self, status: ItemStatus) -> usize {
        let items = self.items.lock().expect("item store lock poisoned");
        items.iter().filter(|i| i.status == status).count()
    }

    /// Payloads of all `Done` items, in display order.
    pub fn ready_results(&self) -> Vec<ReadyResult> {
        let items = self.items.lock().expect("item store lock poisoned");
        items
            .iter()
            .filter(|i| i.is_ready())
            .map(|i| ReadyResult {
                id: i.id,
                name: i.result_name.clone(),
                bytes: i
                    .result
                    .as_ref()
                    .map(|h| h.bytes().to_vec())
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// Transition an item to `Converting` and hand its source to a worker.
    ///
    /// Returns `None` when the id is absent or the item is already
    /// converting (a concurrent retry is a no-op) or already `Done`.
    /// Any previous result handle is released here, before the retry
    /// produces a replacement.
    pub fn begin_convert(&self, id: u64) -> Option<SourceImage> {
        let mut items = self.items.lock().expect("item store lock poisoned");
        let item = items.iter_mut().find(|i| i.id == id)?;
        if item.status == ItemStatus::Converting {
            debug!(item = id, "already converting, skipping");
            return None;
        }
        // Bulk runs call clear_results first, so Done is only reachable
        // here through a stray convert_one on a finished item.
        if item.status == ItemStatus::Done {
            debug!(item = id, "already done, skipping");
            return None;
        }
        item.status = ItemStatus::Converting;
        item.error = None;
        item.result = None;
        item.result_name.clear();
        Some(item.source.clone())
    }

    /// Record a successful conversion.
    ///
    /// Returns false (and releases the handle) when the item no longer
    /// exists: a removal raced the in-flight exchange and the late result
    /// must be discarded, not written to a ghost item.
    pub fn complete(&self, id: u64, result: TransientHandle, name: String) -> bool {
        let mut items = self.items.lock().expect("item store lock poisoned");
        match items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.result = Some(result);
                item.result_name = name;
                item.error = None;
                item.status = ItemStatus::Done;
                true
            }
            None => {
                debug!(item = id, "item removed mid-flight, discarding result");
                // `result` drops here and is released through the registry.
                false
            }
        }
    }

    /// Record a failed conversion. Returns false when the item is gone.
    pub fn fail(&self, id: u64, message: String) -> bool {
        let mut items = self.items.lock().expect("item store lock poisoned");
        match items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.result = None;
                item.result_name.clear();
                item.error = Some(message);
                item.status = ItemStatus::Error;
                true
            }
            None => {
                debug!(item = id, "item removed mid-flight, dropping error");
                false
            }
        }
    }

    fn view(item: &ConversionItem) -> ItemView {
        ItemView {
            id: item.id,
            name: item.source.name.clone(),
            status: item.status,
            result_name: item.result_name.clone(),
            error: item.error.clone(),
        }
    }
}
