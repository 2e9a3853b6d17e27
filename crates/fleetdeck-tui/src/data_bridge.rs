//! Data bridge — connects [`Controller`] streams to TUI actions.
//!
//! Runs as a background task: starts the controller (which owns the
//! inventory poller), then forwards every machine-list change and
//! connection-state transition as an [`Action`] through the TUI's action
//! channel. Shuts down cleanly on cancellation.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use fleetdeck_core::{ConnectionState, Controller};

use crate::action::Action;

/// Spawn the data bridge connecting [`Controller`] reactive streams to the TUI.
pub async fn spawn_data_bridge(
    controller: Controller,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let _ = action_tx.send(Action::Connecting);

    controller.connect().await;

    let _ = action_tx.send(Action::Connected);

    let mut machines = controller.machines();
    let mut conn_state = controller.connection_state();

    // Push the initial snapshot so the grid has data immediately.
    let _ = action_tx.send(Action::MachinesUpdated(machines.current().clone()));

    // Stream loop — forward every change until cancelled
    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Some(snapshot) = machines.changed() => {
                let _ = action_tx.send(Action::MachinesUpdated(snapshot));
            }

            Ok(()) = conn_state.changed() => {
                let state = *conn_state.borrow_and_update();
                match state {
                    ConnectionState::Connected => {
                        let _ = action_tx.send(Action::Connected);
                    }
                    ConnectionState::Disconnected => {
                        let _ = action_tx.send(Action::Disconnected("disconnected".into()));
                    }
                    ConnectionState::Connecting => {
                        let _ = action_tx.send(Action::Connecting);
                    }
                }
            }
        }
    }

    controller.shutdown().await;
    debug!("data bridge shut down");
}
