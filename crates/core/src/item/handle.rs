//! Transient byte-blob handles with exactly-once release accounting.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Allocates [`TransientHandle`]s and tracks their lifecycle.
///
/// Every handle created through a registry increments the `created`
/// counter; dropping the handle increments `revoked`. Release happens in
/// `Drop`, so a handle cannot leak while reachable and cannot be revoked
/// twice. Tests assert `created() == revoked()` after teardown.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    created: AtomicU64,
    revoked: AtomicU64,
}

impl HandleRegistry {
    /// Create a new registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Allocate a handle owning the given bytes.
    pub fn create(self: &Arc<Self>, bytes: Vec<u8>) -> TransientHandle {
        self.created.fetch_add(1, Ordering::SeqCst);
        TransientHandle {
            bytes,
            registry: Arc::clone(self),
        }
    }

    /// Total handles ever created.
    pub fn created(&self) -> u64 {
        self.created.load(Ordering::SeqCst)
    }

    /// Total handles released.
    pub fn revoked(&self) -> u64 {
        self.revoked.load(Ordering::SeqCst)
    }

    /// Handles currently alive.
    pub fn active(&self) -> u64 {
        self.created() - self.revoked()
    }
}

/// An owned byte payload whose release is tracked by its registry.
///
/// The payload is private to one owning item and is released exactly
/// once, when the handle is dropped (item removal, result replacement,
/// or store teardown).
pub struct TransientHandle {
    bytes: Vec<u8>,
    registry: Arc<HandleRegistry>,
}

impl TransientHandle {
    /// The payload bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for TransientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransientHandle")
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Drop for TransientHandle {
    fn drop(&mut self) {
        self.registry.revoked.fetch_add(1, Ordering::SeqCst);
    }
}
