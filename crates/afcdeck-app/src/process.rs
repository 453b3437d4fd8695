//! Message processing: runs update and dispatches the resulting actions

use std::sync::Arc;

use afcdeck_device::DeviceBackend;
use tokio::sync::mpsc;

use crate::actions::handle_action;
use crate::handler;
use crate::message::Message;
use crate::shared::TransportSlot;
use crate::state::AppState;

/// Process a message through the TEA update function.
///
/// Follow-up messages are processed immediately; actions are dispatched to
/// background tasks as they are produced.
pub fn process_message<B>(
    state: &mut AppState,
    message: Message,
    msg_tx: &mpsc::Sender<Message>,
    backend: &Arc<B>,
    slot: &TransportSlot<B::Transport>,
) where
    B: DeviceBackend + Sync + 'static,
{
    let mut msg = Some(message);
    while let Some(m) = msg {
        let result = handler::update(state, m);

        if let Some(action) = result.action {
            handle_action(action, msg_tx.clone(), Arc::clone(backend), slot.clone());
        }

        msg = result.message;
    }
}
