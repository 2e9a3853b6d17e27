// ── Command API ──
//
// All write operations flow through a unified `Command` enum, routed
// through an mpsc channel to the controller's command processor.

use secrecy::SecretString;

use crate::error::CoreError;
use crate::model::{MacAddress, PowerOp};

pub use fleetdeck_api::AddMachineRequest;

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All possible write operations against the backend.
#[derive(Debug, Clone)]
pub enum Command {
    /// A power operation. `password` is `None` on the optimistic first
    /// attempt; the challenge replay carries the operator's credential.
    Power {
        identity: MacAddress,
        operation: PowerOp,
        password: Option<SecretString>,
    },

    /// Remove a machine from the inventory.
    DeleteMachine { identity: MacAddress },

    /// Register a new machine. The request body is forwarded verbatim.
    AddMachine(AddMachineRequest),
}

/// Successful command outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Power operation executed; `message` is the backend's confirmation.
    PowerCompleted { message: String },
    /// The backend wants a password for this power operation. Not an
    /// error — the caller re-enters the challenge flow.
    PowerAuthRequired,
    /// Mutation accepted (delete / add).
    Done,
}
