// ── Controller abstraction ──
//
// Lifecycle management for one heating controller: initial read, periodic
// status polling, daily clock sync, and serialized command execution. Every
// cache-mutating operation (poll, command, forced refresh) runs under one
// per-device sequence lock, so a refresh that follows a write always
// observes that write.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate, Timelike};
use hysen_api::{HeatingDevice, Operation};
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{
    Command, CommandEnvelope, CommandResult, DeviceWrite, PresetTransition, plan_command,
};
use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::model::{EntityId, StatusSnapshot};
use crate::store::{CacheState, StatusStore};
use crate::stream::CacheStream;
use crate::view::{BoundView, ParameterView};

const COMMAND_CHANNEL_SIZE: usize = 32;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// The initial status read failed.
    Failed,
}

// ── Controller ───────────────────────────────────────────────────

/// Handle to one heating controller.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Owns the device gateway,
/// the status cache, and the background tasks that keep the cache fresh.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    device: Arc<dyn HeatingDevice>,
    store: Arc<StatusStore>,
    connection_state: watch::Sender<ConnectionState>,
    command_tx: Mutex<mpsc::Sender<CommandEnvelope>>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    /// Child token for the current connection, replaced on reconnect.
    cancel_child: Mutex<CancellationToken>,
    /// Held for the whole of every refresh and command sequence.
    sequence: Mutex<()>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a controller around `device`. Does NOT read from it --
    /// call [`connect()`](Self::connect) to load status and start background tasks.
    pub fn new(config: ControllerConfig, device: Arc<dyn HeatingDevice>) -> Self {
        let store = Arc::new(StatusStore::new(config.refresh_interval));
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(ControllerInner {
                config,
                device,
                store,
                connection_state,
                command_tx: Mutex::new(command_tx),
                command_rx: Mutex::new(Some(command_rx)),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                sequence: Mutex::new(()),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<StatusStore> {
        &self.inner.store
    }

    /// Address of the device behind this controller.
    pub fn host(&self) -> &str {
        self.inner.device.host()
    }

    /// Climate entity id derived from the configured name.
    pub fn entity_id(&self) -> EntityId {
        EntityId::climate_for_name(&self.inner.config.name)
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Perform the first status read and spawn background tasks.
    ///
    /// Fails (and leaves the controller in [`ConnectionState::Failed`]) if
    /// the device cannot be read.
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.inner
            .connection_state
            .send_replace(ConnectionState::Connecting);

        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        if let Err(e) = self.refresh().await {
            self.inner.connection_state.send_replace(ConnectionState::Failed);
            return Err(e);
        }

        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let ctrl = self.clone();
            handles.push(tokio::spawn(command_processor_task(ctrl, rx, child.clone())));
        }

        let interval = self.inner.config.refresh_interval;
        if !interval.is_zero() {
            let ctrl = self.clone();
            handles.push(tokio::spawn(refresh_task(ctrl, interval, child)));
        }

        self.inner.connection_state.send_replace(ConnectionState::Connected);
        info!(
            device = %self.inner.config.name,
            host = self.inner.device.host(),
            "connected to heating controller"
        );
        Ok(())
    }

    /// Stop background tasks. The cache keeps its last state.
    pub async fn disconnect(&self) {
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        // Recreate the command channel so a reconnect can spawn a fresh
        // processor; the previous receiver was consumed by the old one.
        {
            let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
            *self.inner.command_tx.lock().await = tx;
            *self.inner.command_rx.lock().await = Some(rx);
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        debug!(device = %self.inner.config.name, "disconnected");
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Read the full status and replace the cached snapshot.
    ///
    /// On failure the previous snapshot is kept, the cache is flagged stale,
    /// and the error is returned.
    pub async fn refresh(&self) -> Result<Arc<StatusSnapshot>, CoreError> {
        let _sequence = self.inner.sequence.lock().await;
        self.refresh_locked(PresetTransition::Keep).await
    }

    async fn refresh_locked(
        &self,
        transition: PresetTransition,
    ) -> Result<Arc<StatusSnapshot>, CoreError> {
        match self.on_device(|device| device.get_status()).await {
            Ok(raw) => {
                let snapshot = self
                    .inner
                    .store
                    .apply_snapshot(StatusSnapshot::from(&raw), transition);
                debug!(
                    device = %self.inner.config.name,
                    revision = self.inner.store.state().revision,
                    "status refreshed"
                );
                Ok(snapshot)
            }
            Err(e) => {
                self.inner.store.record_failure(&e.to_string(), transition);
                Err(CoreError::device(Operation::GetStatus, e))
            }
        }
    }

    /// Run a blocking gateway call on the blocking pool.
    async fn on_device<T, F>(&self, f: F) -> Result<T, hysen_api::Error>
    where
        T: Send + 'static,
        F: FnOnce(&dyn HeatingDevice) -> Result<T, hysen_api::Error> + Send + 'static,
    {
        let device = Arc::clone(&self.inner.device);
        tokio::task::spawn_blocking(move || f(device.as_ref()))
            .await
            .map_err(|e| hysen_api::Error::Backend {
                message: format!("device task failed: {e}"),
            })?
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command.
    ///
    /// Sends the command through the internal channel to the command
    /// processor task and awaits the result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::ControllerDisconnected);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();

        let command_tx = self.inner.command_tx.lock().await.clone();
        command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::ControllerDisconnected)?;

        rx.await.map_err(|_| CoreError::ControllerDisconnected)?
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: connect, run closure, disconnect.
    ///
    /// Disables the poller and clock sync since only a single
    /// request-response cycle is needed.
    pub async fn oneshot<F, Fut, T>(
        config: ControllerConfig,
        device: Arc<dyn HeatingDevice>,
        f: F,
    ) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.refresh_interval = Duration::ZERO;
        cfg.clock_sync = None;

        let controller = Controller::new(cfg, device);
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.disconnect().await;
        result
    }

    // ── State observation ────────────────────────────────────────

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    pub fn snapshot(&self) -> Option<Arc<StatusSnapshot>> {
        self.inner.store.get()
    }

    pub fn state(&self) -> Arc<CacheState> {
        self.inner.store.state()
    }

    pub fn subscribe(&self) -> CacheStream {
        self.inner.store.subscribe()
    }

    /// Attach a view to this controller.
    pub fn view<V: ParameterView + Clone>(&self, view: V) -> BoundView<V> {
        BoundView::new(view, self.clone())
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Poll the device on a fixed period. Failures are logged and reflected in
/// the cache only.
async fn refresh_task(controller: Controller, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    let mut last_clock_sync: Option<NaiveDate> = None;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                match controller.refresh().await {
                    Ok(_) => maybe_sync_clock(&controller, &mut last_clock_sync).await,
                    Err(e) => {
                        warn!(device = %controller.inner.config.name, error = %e, "periodic refresh failed");
                    }
                }
            }
        }
    }
}

/// Correct the device clock once a day at the configured local hour.
async fn maybe_sync_clock(controller: &Controller, last_sync: &mut Option<NaiveDate>) {
    let Some(sync) = controller.inner.config.clock_sync else {
        return;
    };
    let now = Local::now();
    let today = now.date_naive();
    if now.hour() != sync.hour || *last_sync == Some(today) {
        return;
    }
    *last_sync = Some(today);

    match route_command(controller, Command::SyncClock).await {
        Ok(_) => info!(device = %controller.inner.config.name, "device clock synchronized"),
        Err(e) => warn!(device = %controller.inner.config.name, error = %e, "clock sync failed"),
    }
}

/// Process commands from the mpsc channel one at a time.
async fn command_processor_task(
    controller: Controller,
    mut rx: mpsc::Receiver<CommandEnvelope>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&controller, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

/// Validate, write, settle, then re-read.
///
/// The first failed primary write aborts the sequence: later writes are not
/// attempted, the cache is untouched, and no refresh happens. A failed
/// follow-up write is reported only after the refresh.
async fn route_command(
    controller: &Controller,
    command: Command,
) -> Result<CommandResult, CoreError> {
    let inner = &controller.inner;
    let _sequence = inner.sequence.lock().await;

    if matches!(command, Command::Refresh) {
        let snapshot = controller.refresh_locked(PresetTransition::Keep).await?;
        return Ok(CommandResult::Refreshed { snapshot });
    }

    let plan = plan_command(&command, &inner.store.state())?;

    for write in &plan.writes {
        write_one(controller, write).await?;
    }

    let mut follow_up_error = None;
    for write in &plan.follow_up {
        if let Err(e) = write_one(controller, write).await {
            follow_up_error = Some(e);
            break;
        }
    }

    tokio::time::sleep(inner.config.settle_delay).await;

    let refreshed = match controller.refresh_locked(plan.preset).await {
        Ok(_) => true,
        Err(e) => {
            warn!(device = %inner.config.name, error = %e, "refresh after command failed");
            false
        }
    };

    if let Some(e) = follow_up_error {
        return Err(e);
    }

    let mut writes = plan.writes;
    writes.extend(plan.follow_up);
    Ok(CommandResult::Applied { writes, refreshed })
}

async fn write_one(controller: &Controller, write: &DeviceWrite) -> Result<(), CoreError> {
    let name = &controller.inner.config.name;
    let operation = write.operation();
    debug!(device = %name, %operation, ?write, "device write");
    let call = write.clone();
    controller
        .on_device(move |device| call.apply(device))
        .await
        .map_err(|e| {
            warn!(device = %name, %operation, error = %e, "device write failed");
            CoreError::device(operation, e)
        })
}
