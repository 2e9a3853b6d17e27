// ── Controller abstraction ──
//
// Full lifecycle management for a backend connection: the inventory
// poller, command routing, and the two-phase power authentication
// protocol. The rendered view stays eventually consistent with the
// backend through the periodic poll plus one out-of-band refresh after
// every successful mutation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, Notify, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use fleetdeck_api::{InventoryClient, PowerOutcome, TransportConfig};

use crate::command::{AddMachineRequest, Command, CommandEnvelope, CommandResult};
use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::model::{MacAddress, Machine, PowerOp};
use crate::store::MachineStore;
use crate::stream::EntityStream;

const COMMAND_CHANNEL_SIZE: usize = 16;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

// ── Pending power action ─────────────────────────────────────────

/// The client's record of a power operation that is in flight or waiting
/// on the operator's password.
///
/// `token` is a monotonically increasing generation counter: a response
/// (or password submission) resolving under a token that is no longer
/// current is dropped instead of being misattributed to whatever action
/// replaced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPower {
    pub token: u64,
    pub identity: MacAddress,
    pub operation: PowerOp,
}

/// One step of the two-phase power protocol, as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PowerProgress {
    /// Terminal: the backend executed the operation.
    Completed { message: String },
    /// Non-terminal: the backend answered 401. The caller prompts the
    /// operator and replays via [`Controller::resume_power`] with the same
    /// `token`. `machine` is the challenge target from the last-fetched
    /// list, for the prompt message.
    Challenge {
        token: u64,
        machine: Option<Arc<Machine>>,
    },
    /// The pending action was replaced or cancelled while this attempt
    /// was outstanding; its resolution has been dropped.
    Superseded,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Owns the poller task,
/// the command processor, and all action-dispatch state.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    client: InventoryClient,
    store: Arc<MachineStore>,
    connection_state: watch::Sender<ConnectionState>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    /// Out-of-band refresh trigger, fired after successful mutations.
    refresh: Notify,
    /// The single current pending power action (at most one exists).
    pending_power: std::sync::Mutex<Option<PendingPower>>,
    /// Generation counter backing [`PendingPower::token`].
    power_generation: AtomicU64,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a new Controller from configuration. Does NOT fetch anything —
    /// call [`connect()`](Self::connect) to start the poller and command
    /// processor.
    pub fn new(config: ControllerConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
            danger_accept_invalid_certs: config.accept_invalid_certs,
        };
        let client = InventoryClient::new(config.url.clone(), &transport)?;

        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);

        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                client,
                store: Arc::new(MachineStore::new()),
                connection_state,
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                refresh: Notify::new(),
                pending_power: std::sync::Mutex::new(None),
                power_generation: AtomicU64::new(0),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Access the controller configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// Access the underlying machine store.
    pub fn store(&self) -> &Arc<MachineStore> {
        &self.inner.store
    }

    /// The backend HTTP client (for URL construction, e.g. Connect targets).
    pub fn client(&self) -> &InventoryClient {
        &self.inner.client
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Start the client: one immediate inventory fetch, then the poller
    /// and command processor background tasks.
    ///
    /// A failing initial fetch is logged and swallowed, same as any other
    /// poll failure — the poller keeps trying and the UI stays live. With
    /// polling disabled (one-shot mode) the startup fetch is skipped too;
    /// the caller drives [`refresh()`](Self::refresh) explicitly and gets
    /// to surface its errors.
    pub async fn connect(&self) {
        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Connecting);

        if self.inner.config.poll_interval_secs > 0 {
            if let Err(e) = self.refresh().await {
                warn!(error = %e, "initial inventory fetch failed");
            }
        }

        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let ctrl = self.clone();
            handles.push(tokio::spawn(command_processor_task(ctrl, rx)));
        }

        let ctrl = self.clone();
        let cancel = self.inner.cancel.clone();
        let interval_secs = self.inner.config.poll_interval_secs;
        handles.push(tokio::spawn(poll_task(ctrl, interval_secs, cancel)));

        let _ = self.inner.connection_state.send(ConnectionState::Connected);
        info!(url = %self.inner.config.url, "connected to backend");
    }

    /// Stop background tasks and mark the controller disconnected.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Disconnected);
        debug!("controller shut down");
    }

    /// One-shot: connect, run closure, shut down.
    ///
    /// Optimized for the CLI: disables the periodic poll since a single
    /// invocation only needs explicit fetches.
    pub async fn oneshot<F, Fut, T>(config: ControllerConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.poll_interval_secs = 0;

        let controller = Controller::new(cfg)?;
        controller.connect().await;
        let result = f(controller.clone()).await;
        controller.shutdown().await;
        result
    }

    // ── Inventory refresh ────────────────────────────────────────

    /// Fetch the machine list and replace the store snapshot.
    ///
    /// On failure the previous snapshot is left untouched; the caller
    /// decides whether the error is surfaced (the poller swallows it).
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let records = self.inner.client.list_machines().await?;
        let machines: Vec<Machine> = records.into_iter().map(Machine::from).collect();
        debug!(count = machines.len(), "inventory refreshed");
        self.inner.store.replace_all(machines);
        Ok(())
    }

    /// Request an out-of-band poll refresh (non-blocking).
    pub fn trigger_refresh(&self) {
        self.inner.refresh.notify_one();
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command against the backend.
    ///
    /// Sends the command through the internal channel to the command
    /// processor task and awaits the result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        let (tx, rx) = tokio::sync::oneshot::channel();

        self.inner
            .command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::ControllerShutdown)?;

        rx.await.map_err(|_| CoreError::ControllerShutdown)?
    }

    // ── Two-phase power protocol ─────────────────────────────────

    /// Initiate a power operation: record the pending action and issue
    /// the optimistic unauthenticated attempt.
    ///
    /// Any previously pending action is superseded — its eventual
    /// resolution will be dropped rather than misattributed.
    pub async fn begin_power(
        &self,
        identity: MacAddress,
        operation: PowerOp,
    ) -> Result<PowerProgress, CoreError> {
        let token = self.inner.power_generation.fetch_add(1, Ordering::Relaxed) + 1;
        {
            let mut pending = self
                .inner
                .pending_power
                .lock()
                .expect("pending power lock poisoned");
            if let Some(prev) = pending.replace(PendingPower {
                token,
                identity: identity.clone(),
                operation,
            }) {
                debug!(superseded = prev.token, token, "replacing pending power action");
            }
        }

        self.attempt_power(token, None).await
    }

    /// Replay the pending power operation with the operator's credential.
    ///
    /// A 401 here re-enters the challenge — there is no distinct
    /// wrong-password outcome and no retry limit.
    pub async fn resume_power(
        &self,
        token: u64,
        password: secrecy::SecretString,
    ) -> Result<PowerProgress, CoreError> {
        self.attempt_power(token, Some(password)).await
    }

    /// Abandon the pending power action. No backend call is made.
    pub fn cancel_power(&self, token: u64) {
        let mut pending = self
            .inner
            .pending_power
            .lock()
            .expect("pending power lock poisoned");
        if pending.as_ref().is_some_and(|p| p.token == token) {
            debug!(token, "power action cancelled");
            *pending = None;
        }
    }

    /// The currently pending power action, if any.
    pub fn pending_power(&self) -> Option<PendingPower> {
        self.inner
            .pending_power
            .lock()
            .expect("pending power lock poisoned")
            .clone()
    }

    /// One attempt of the power request, shared by the unauthenticated
    /// initiation and the credentialed replay.
    async fn attempt_power(
        &self,
        token: u64,
        password: Option<secrecy::SecretString>,
    ) -> Result<PowerProgress, CoreError> {
        let Some(pending) = self.current_pending(token) else {
            debug!(token, "power attempt for superseded token — skipping");
            return Ok(PowerProgress::Superseded);
        };

        let result = self
            .execute(Command::Power {
                identity: pending.identity.clone(),
                operation: pending.operation,
                password,
            })
            .await;

        // Response-time correlation: if the pending slot moved on while
        // the request was in flight, drop this resolution entirely.
        if self.current_pending(token).is_none() {
            debug!(token, "dropping stale power resolution");
            return Ok(PowerProgress::Superseded);
        }

        match result {
            Ok(CommandResult::PowerCompleted { message }) => {
                self.clear_pending(token);
                Ok(PowerProgress::Completed { message })
            }
            Ok(CommandResult::PowerAuthRequired) => {
                let machine = self.inner.store.get(&pending.identity);
                Ok(PowerProgress::Challenge { token, machine })
            }
            Ok(CommandResult::Done) => Err(CoreError::Internal(
                "power command resolved to a non-power result".into(),
            )),
            Err(e) => {
                // Terminal failure: the pending action is over.
                self.clear_pending(token);
                Err(e)
            }
        }
    }

    fn current_pending(&self, token: u64) -> Option<PendingPower> {
        self.inner
            .pending_power
            .lock()
            .expect("pending power lock poisoned")
            .clone()
            .filter(|p| p.token == token)
    }

    fn clear_pending(&self, token: u64) {
        let mut pending = self
            .inner
            .pending_power
            .lock()
            .expect("pending power lock poisoned");
        if pending.as_ref().is_some_and(|p| p.token == token) {
            *pending = None;
        }
    }

    // ── Other dispatch operations ────────────────────────────────

    /// Remove a machine from the inventory.
    ///
    /// Failures are logged and swallowed — the intentional asymmetry from
    /// power actions: the operator confirmed the intent, and the next poll
    /// shows whether the machine is gone.
    pub async fn delete_machine(&self, identity: &MacAddress) {
        match self
            .execute(Command::DeleteMachine {
                identity: identity.clone(),
            })
            .await
        {
            Ok(_) => debug!(machine = %identity, "machine deleted"),
            Err(e) => warn!(machine = %identity, error = %e, "delete failed"),
        }
    }

    /// Register a new machine. The backend's error detail is discarded;
    /// callers surface a generic failure.
    pub async fn add_machine(&self, request: AddMachineRequest) -> Result<(), CoreError> {
        self.execute(Command::AddMachine(request)).await.map(|_| ())
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// Current machine snapshot (delegates to the store).
    pub fn machines_snapshot(&self) -> Arc<Vec<Arc<Machine>>> {
        self.inner.store.snapshot()
    }

    /// Subscribe to machine list changes.
    pub fn machines(&self) -> EntityStream<Machine> {
        self.inner.store.subscribe()
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// The inventory poller: a fixed-interval fetch plus the out-of-band
/// refresh trigger. Failures are logged and the previous snapshot is
/// retained — no back-off, no user-facing error.
async fn poll_task(controller: Controller, interval_secs: u64, cancel: CancellationToken) {
    let mut ticker = (interval_secs > 0).then(|| {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        interval.reset(); // connect() already did the immediate fetch
        interval
    });

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = controller.inner.refresh.notified() => {
                if let Err(e) = controller.refresh().await {
                    warn!(error = %e, "action-triggered refresh failed");
                }
            }
            () = tick(ticker.as_mut()) => {
                if let Err(e) = controller.refresh().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}

/// Await the next interval tick, or never when polling is disabled.
async fn tick(ticker: Option<&mut tokio::time::Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Process commands from the mpsc channel, routing each to the
/// appropriate backend call.
async fn command_processor_task(controller: Controller, mut rx: mpsc::Receiver<CommandEnvelope>) {
    let cancel = controller.inner.cancel.clone();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&controller, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

/// Route a command to the backend. Every successful mutation triggers one
/// out-of-band poll refresh so the view reflects backend state without
/// waiting for the next tick.
async fn route_command(controller: &Controller, cmd: Command) -> Result<CommandResult, CoreError> {
    let client = &controller.inner.client;

    match cmd {
        Command::Power {
            identity,
            operation,
            password,
        } => {
            match client
                .power(identity.as_str(), operation.as_wire(), password.as_ref())
                .await
            {
                Ok(PowerOutcome::Completed { message }) => {
                    controller.trigger_refresh();
                    Ok(CommandResult::PowerCompleted { message })
                }
                Ok(PowerOutcome::AuthRequired) => Ok(CommandResult::PowerAuthRequired),
                Err(e) => Err(e.into()),
            }
        }

        Command::DeleteMachine { identity } => {
            client.delete_machine(identity.as_str()).await?;
            controller.trigger_refresh();
            Ok(CommandResult::Done)
        }

        Command::AddMachine(request) => match client.add_machine(&request).await {
            Ok(()) => {
                controller.trigger_refresh();
                Ok(CommandResult::Done)
            }
            Err(e) => {
                // The backend's detail is discarded for add — log it here,
                // surface only a generic failure.
                warn!(error = %e, "add machine rejected");
                Err(CoreError::OperationFailed {
                    message: "failed to add machine".into(),
                })
            }
        },
    }
}
