//! Engine - orchestration state shared by the TUI and the integration tests
//!
//! The Engine owns the message channel, the device backend and the single
//! transport slot. Frontends feed it input messages and drain everything the
//! background tasks report back.

use std::sync::Arc;

use afcdeck_device::DeviceBackend;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::Settings;
use crate::message::Message;
use crate::process;
use crate::shared::TransportSlot;
use crate::signals;
use crate::state::AppState;

/// Capacity of the unified message channel
const CHANNEL_CAPACITY: usize = 256;

/// Orchestration engine for afcdeck.
///
/// Encapsulates:
/// - TEA state management
/// - Message channel
/// - The device backend and the live transport
/// - Settings
pub struct Engine<B: DeviceBackend> {
    /// TEA application state (the Model)
    pub state: AppState,

    /// Sender half of the unified message channel.
    /// Clone this to give to input sources.
    pub msg_tx: mpsc::Sender<Message>,

    /// Receiver half of the unified message channel.
    pub msg_rx: mpsc::Receiver<Message>,

    /// Loaded settings
    pub settings: Settings,

    backend: Arc<B>,

    slot: TransportSlot<B::Transport>,
}

impl<B: DeviceBackend + Sync + 'static> Engine<B> {
    /// Create a new Engine.
    ///
    /// Creates the message channel and spawns the signal handler, so this
    /// must be called inside a tokio runtime. No device work starts until
    /// [`start`](Self::start).
    pub fn new(settings: Settings, backend: B) -> Self {
        let state = AppState::with_settings(settings.clone());
        let (msg_tx, msg_rx) = mpsc::channel::<Message>(CHANNEL_CAPACITY);

        signals::spawn_signal_handler(msg_tx.clone());

        Self {
            state,
            msg_tx,
            msg_rx,
            settings,
            backend: Arc::new(backend),
            slot: TransportSlot::new(),
        }
    }

    /// Begin looking for a device
    pub fn start(&mut self) {
        info!("Starting device watcher");
        self.process_message(Message::StartWatcher);
    }

    /// Process a single message through the TEA update cycle.
    pub fn process_message(&mut self, msg: Message) {
        process::process_message(&mut self.state, msg, &self.msg_tx, &self.backend, &self.slot);
    }

    /// Drain and process all pending messages from the channel.
    ///
    /// Returns the number of messages processed.
    pub fn drain_pending_messages(&mut self) -> usize {
        let mut count = 0;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.process_message(msg);
            count += 1;
        }
        count
    }

    /// Wait for the next message from a background task or input source
    pub async fn next_message(&mut self) -> Option<Message> {
        self.msg_rx.recv().await
    }

    /// Get a clone of the message sender for spawning input sources.
    pub fn msg_sender(&self) -> mpsc::Sender<Message> {
        self.msg_tx.clone()
    }

    /// Check if the application should quit.
    pub fn should_quit(&self) -> bool {
        self.state.should_quit()
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Handle on the live transport
    pub fn transport_slot(&self) -> &TransportSlot<B::Transport> {
        &self.slot
    }

    /// Stop background loops and close the device session.
    pub async fn shutdown(&mut self) {
        debug!("Engine shutting down");
        self.state.stop_background();
        self.slot.release().await;
    }
}
