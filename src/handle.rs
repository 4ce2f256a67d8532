use crate::codec::MediaPayload;
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Shared store of live transient handles.
///
/// Plays the role of the browser's blob-URL table: issuing a handle registers
/// the payload under a fresh id, revoking it removes the entry. Cloning the
/// registry clones the reference, not the store.
#[derive(Clone, Default)]
pub struct HandleRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    entries: HashMap<u64, Arc<MediaPayload>>,
}

impl HandleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new handle for the given payload
    pub fn create(&self, payload: MediaPayload) -> TransientHandle {
        let mut inner = self.inner.lock().expect("handle registry poisoned");
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.insert(id, Arc::new(payload));
        debug!("Issued transient handle {}", id);
        TransientHandle {
            id,
            url: format!("blob:pixelclip/{:08x}", id),
            registry: Arc::clone(&self.inner),
        }
    }

    /// Number of handles currently live (issued and not yet revoked)
    pub fn live_count(&self) -> usize {
        self.inner.lock().expect("handle registry poisoned").entries.len()
    }
}

/// An ephemeral, revocable reference to a [`MediaPayload`], usable by a
/// playback surface via its `url()`.
///
/// Revocation is idempotent; dropping the handle revokes it, so a handle can
/// never outlive its owner by accident.
pub struct TransientHandle {
    id: u64,
    url: String,
    registry: Arc<Mutex<RegistryInner>>,
}

impl TransientHandle {
    /// The blob-style URL identifying this handle
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the payload, or `None` if the handle has been revoked
    pub fn resolve(&self) -> Option<Arc<MediaPayload>> {
        let inner = self.registry.lock().expect("handle registry poisoned");
        inner.entries.get(&self.id).cloned()
    }

    /// Whether the handle is still live
    pub fn is_live(&self) -> bool {
        self.resolve().is_some()
    }

    /// Release the underlying payload. Revoking an already-revoked handle
    /// is a no-op.
    pub fn revoke(&self) {
        let mut inner = self.registry.lock().expect("handle registry poisoned");
        if inner.entries.remove(&self.id).is_some() {
            debug!("Revoked transient handle {}", self.id);
        }
    }
}

impl Drop for TransientHandle {
    fn drop(&mut self) {
        self.revoke();
    }
}

impl std::fmt::Debug for TransientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransientHandle")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("live", &self.is_live())
            .finish()
    }
}
