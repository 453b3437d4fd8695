//! Handles shared between the update loop and background tasks

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use afcdeck_core::prelude::*;
use afcdeck_device::Transport;
use tokio::sync::Mutex;

/// Cooperative cancellation flag for long-running background loops
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Single-slot holder for the live device session.
///
/// At most one transport is held. [`release`](Self::release) closes the
/// current one; the connector always releases before opening another.
pub struct TransportSlot<T> {
    inner: Arc<Mutex<Option<Arc<T>>>>,
}

impl<T> Clone for TransportSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for TransportSlot<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
        }
    }
}

impl<T: Transport + Sync + 'static> TransportSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The live transport, if any
    pub async fn get(&self) -> Option<Arc<T>> {
        self.inner.lock().await.clone()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_none()
    }

    /// Store a freshly opened transport.
    ///
    /// Any transport still in the slot is closed first.
    pub async fn install(&self, transport: T) -> Arc<T> {
        let transport = Arc::new(transport);
        let previous = {
            let mut slot = self.inner.lock().await;
            slot.replace(Arc::clone(&transport))
        };
        if let Some(previous) = previous {
            warn!("Replacing a transport that was never released");
            previous.close().await;
        }
        transport
    }

    /// Close and drop the live transport. No-op when empty.
    pub async fn release(&self) {
        let previous = self.inner.lock().await.take();
        if let Some(transport) = previous {
            debug!("Releasing transport for {}", transport.udid());
            transport.close().await;
        }
    }
}
