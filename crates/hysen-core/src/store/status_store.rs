use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

use crate::command::PresetTransition;
use crate::model::{HvacMode, Preset, StatusSnapshot};
use crate::stream::CacheStream;
use crate::view::climate::effective_mode;

/// Bookkeeping for the most recent status read.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RefreshStatus {
    pub last_attempt: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    /// False once a read fails, true again after the next good one.
    pub last_update_success: bool,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
}

/// Everything a view needs to render, published as one unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CacheState {
    /// Latest good snapshot, `None` until the first successful read.
    pub snapshot: Option<Arc<StatusSnapshot>>,
    pub refresh: RefreshStatus,
    /// Preset forced by a recent command until the device catches up.
    pub preset_override: Option<Preset>,
    /// Bumped on every publish.
    pub revision: u64,
}

impl CacheState {
    pub fn snapshot(&self) -> Option<&StatusSnapshot> {
        self.snapshot.as_deref()
    }

    /// Views render as available only while the last read succeeded.
    pub fn is_fresh(&self) -> bool {
        self.snapshot.is_some() && self.refresh.last_update_success
    }
}

/// Reactive cache for one heating controller.
pub struct StatusStore {
    state: watch::Sender<Arc<CacheState>>,
    refresh_period: Duration,
}

impl StatusStore {
    pub fn new(refresh_period: Duration) -> Self {
        let (state, _) = watch::channel(Arc::new(CacheState::default()));
        Self {
            state,
            refresh_period,
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Current cached snapshot, or `None` if no read has ever succeeded.
    pub fn get(&self) -> Option<Arc<StatusSnapshot>> {
        self.state.borrow().snapshot.clone()
    }

    pub fn state(&self) -> Arc<CacheState> {
        Arc::clone(&self.state.borrow())
    }

    pub fn subscribe(&self) -> CacheStream {
        CacheStream::new(self.state.subscribe())
    }

    pub fn refresh_period(&self) -> Duration {
        self.refresh_period
    }

    pub fn last_update_success(&self) -> bool {
        self.state.borrow().refresh.last_update_success
    }

    /// How long ago the last successful read happened.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.state
            .borrow()
            .refresh
            .last_success
            .map(|t| Utc::now() - t)
    }

    // ── Writes (coordinator only) ────────────────────────────────────

    /// Replace the whole snapshot and mark the read successful.
    ///
    /// A standing `Temporary` override is dropped once the device no longer
    /// reports plain AUTO, since the device-derived preset then takes over.
    pub(crate) fn apply_snapshot(
        &self,
        snapshot: StatusSnapshot,
        transition: PresetTransition,
    ) -> Arc<StatusSnapshot> {
        let snapshot = Arc::new(snapshot);
        let now = Utc::now();
        let published = Arc::clone(&snapshot);
        self.publish(move |next| {
            if effective_mode(&published) != Some(HvacMode::Auto) {
                next.preset_override = None;
            }
            next.snapshot = Some(published);
            next.refresh.last_attempt = Some(now);
            next.refresh.last_success = Some(now);
            next.refresh.last_update_success = true;
            next.refresh.last_error = None;
            next.refresh.consecutive_failures = 0;
            apply_transition(next, transition);
        });
        snapshot
    }

    /// Record a failed read. The previous snapshot stays untouched.
    pub(crate) fn record_failure(&self, error: &str, transition: PresetTransition) {
        let now = Utc::now();
        let error = error.to_owned();
        self.publish(move |next| {
            next.refresh.last_attempt = Some(now);
            next.refresh.last_update_success = false;
            next.refresh.last_error = Some(error);
            next.refresh.consecutive_failures = next.refresh.consecutive_failures.saturating_add(1);
            apply_transition(next, transition);
        });
    }

    fn publish(&self, f: impl FnOnce(&mut CacheState)) {
        self.state.send_modify(|state| {
            let mut next = CacheState::clone(state);
            f(&mut next);
            next.revision = state.revision.wrapping_add(1);
            *state = Arc::new(next);
        });
    }
}

fn apply_transition(state: &mut CacheState, transition: PresetTransition) {
    match transition {
        PresetTransition::Keep => {}
        PresetTransition::EnterTemporary => state.preset_override = Some(Preset::Temporary),
        PresetTransition::Restore => state.preset_override = None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{OperationMode, PowerState};
    use pretty_assertions::assert_eq;

    fn auto_snapshot(target: f32) -> StatusSnapshot {
        StatusSnapshot {
            power: Some(PowerState::On),
            operation_mode: Some(OperationMode::Auto),
            manual_in_auto: Some(false),
            target_temp: Some(target),
            ..StatusSnapshot::default()
        }
    }

    #[test]
    fn starts_empty() {
        let store = StatusStore::new(Duration::from_secs(30));
        assert!(store.get().is_none());
        assert!(!store.last_update_success());
        assert!(store.data_age().is_none());
        assert_eq!(store.refresh_period(), Duration::from_secs(30));
    }

    #[test]
    fn apply_replaces_snapshot() {
        let store = StatusStore::new(Duration::from_secs(30));
        store.apply_snapshot(auto_snapshot(21.0), PresetTransition::Keep);
        store.apply_snapshot(auto_snapshot(23.0), PresetTransition::Keep);

        let state = store.state();
        assert_eq!(state.snapshot().unwrap().target_temp, Some(23.0));
        assert!(state.refresh.last_update_success);
        assert_eq!(state.revision, 2);
    }

    #[test]
    fn failure_keeps_previous_snapshot_intact() {
        let store = StatusStore::new(Duration::from_secs(30));
        let first = store.apply_snapshot(auto_snapshot(21.0), PresetTransition::Keep);

        store.record_failure("timed out", PresetTransition::Keep);

        let state = store.state();
        assert_eq!(state.snapshot().unwrap(), first.as_ref());
        assert!(!state.refresh.last_update_success);
        assert_eq!(state.refresh.last_error.as_deref(), Some("timed out"));
        assert_eq!(state.refresh.consecutive_failures, 1);
        assert!(state.refresh.last_success.is_some());
    }

    #[test]
    fn override_survives_auto_refresh_and_clears_when_mode_changes() {
        let store = StatusStore::new(Duration::from_secs(30));
        store.apply_snapshot(auto_snapshot(21.0), PresetTransition::EnterTemporary);
        assert_eq!(store.state().preset_override, Some(Preset::Temporary));

        store.apply_snapshot(auto_snapshot(21.0), PresetTransition::Keep);
        assert_eq!(store.state().preset_override, Some(Preset::Temporary));

        let manual = StatusSnapshot {
            operation_mode: Some(OperationMode::Manual),
            ..auto_snapshot(21.0)
        };
        store.apply_snapshot(manual, PresetTransition::Keep);
        assert_eq!(store.state().preset_override, None);
    }

    #[test]
    fn restore_clears_override() {
        let store = StatusStore::new(Duration::from_secs(30));
        store.apply_snapshot(auto_snapshot(21.0), PresetTransition::EnterTemporary);
        store.record_failure("boom", PresetTransition::Restore);
        assert_eq!(store.state().preset_override, None);
    }

    #[tokio::test]
    async fn subscribers_are_notified() {
        let store = StatusStore::new(Duration::from_secs(30));
        let mut stream = store.subscribe();
        store.apply_snapshot(auto_snapshot(22.0), PresetTransition::Keep);

        let state = stream.changed().await.unwrap();
        assert_eq!(state.snapshot().unwrap().target_temp, Some(22.0));
    }
}
