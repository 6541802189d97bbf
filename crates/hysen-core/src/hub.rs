// ── Climate hub ──
//
// Registry of running controllers keyed by climate entity id, plus the
// multi-target operations that fan one request out to many thermostats.
// Each controller stays fully independent; the hub only routes.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use hysen_api::Operation;

use crate::command::{Command, ValidationCode};
use crate::controller::Controller;
use crate::error::CoreError;
use crate::model::{EntityId, HvacMode, Preset};

/// Accepted range for batch setpoint changes, checked before any device
/// sees the value.
pub const BATCH_TEMP_MIN: f32 = 10.0;
pub const BATCH_TEMP_MAX: f32 = 40.0;

/// Per-target outcome of a batch operation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub succeeded: Vec<EntityId>,
    pub failed: Vec<BatchFailure>,
    /// Targets outside the climate namespace.
    pub skipped: Vec<EntityId>,
}

impl BatchReport {
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub entity_id: EntityId,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ValidationCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<Operation>,
}

impl BatchFailure {
    fn new(entity_id: EntityId, error: &CoreError) -> Self {
        Self {
            entity_id,
            error: error.to_string(),
            code: error.validation_code(),
            operation: error.failed_operation(),
        }
    }
}

/// Owns every registered controller.
#[derive(Default)]
pub struct ClimateHub {
    devices: DashMap<EntityId, Controller>,
}

impl ClimateHub {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Registry ─────────────────────────────────────────────────

    /// Connect `controller` and make it addressable by its entity id.
    pub async fn register(&self, controller: Controller) -> Result<EntityId, CoreError> {
        let id = controller.entity_id();
        if self.devices.contains_key(&id) {
            return Err(CoreError::Config {
                message: format!("{id} is already registered"),
            });
        }
        controller.connect().await?;

        // A concurrent registration may have claimed the id while connecting.
        let loser = match self.devices.entry(id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(controller);
                None
            }
            Entry::Occupied(_) => Some(controller),
        };
        if let Some(controller) = loser {
            controller.disconnect().await;
            return Err(CoreError::Config {
                message: format!("{id} is already registered"),
            });
        }
        info!(entity_id = %id, "registered heating controller");
        Ok(id)
    }

    /// Stop and drop a controller together with its cache.
    pub async fn deregister(&self, id: &EntityId) -> Result<(), CoreError> {
        let (_, controller) =
            self.devices
                .remove(id)
                .ok_or_else(|| CoreError::DeviceNotFound {
                    identifier: id.to_string(),
                })?;
        controller.disconnect().await;
        info!(entity_id = %id, "deregistered heating controller");
        Ok(())
    }

    pub fn get(&self, id: &EntityId) -> Option<Controller> {
        self.devices.get(id).map(|entry| entry.value().clone())
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.devices.iter().map(|e| e.key().clone()).collect();
        ids.sort_by_key(ToString::to_string);
        ids
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    // ── Batch operations ─────────────────────────────────────────

    /// Set the HVAC mode (`off`, `heat`, `auto`) on every target.
    pub async fn set_hvac_mode(
        &self,
        targets: impl IntoIterator<Item = EntityId>,
        mode: &str,
    ) -> Result<BatchReport, CoreError> {
        let (targets, skipped) = partition_targets(targets)?;
        let mode: HvacMode = mode.parse().map_err(|_| {
            CoreError::validation(
                ValidationCode::InvalidHvacMode,
                format!("unknown HVAC mode '{mode}' (expected off, heat or auto)"),
            )
        })?;
        Ok(self
            .run_batch(targets, skipped, Command::SetHvacMode(mode))
            .await)
    }

    pub async fn set_temperature(
        &self,
        targets: impl IntoIterator<Item = EntityId>,
        temperature: f32,
    ) -> Result<BatchReport, CoreError> {
        let (targets, skipped) = partition_targets(targets)?;
        if !(BATCH_TEMP_MIN..=BATCH_TEMP_MAX).contains(&temperature) {
            return Err(CoreError::validation(
                ValidationCode::OutOfRange,
                format!("temperature {temperature} is outside {BATCH_TEMP_MIN}..={BATCH_TEMP_MAX}"),
            ));
        }
        Ok(self
            .run_batch(targets, skipped, Command::SetTargetTemperature(temperature))
            .await)
    }

    /// Select a schedule preset. `Temporary` is never accepted.
    pub async fn set_preset_mode(
        &self,
        targets: impl IntoIterator<Item = EntityId>,
        preset: &str,
    ) -> Result<BatchReport, CoreError> {
        let (targets, skipped) = partition_targets(targets)?;
        let preset = preset
            .parse::<Preset>()
            .ok()
            .filter(|p| p.pattern().is_some())
            .ok_or_else(|| {
                CoreError::validation(
                    ValidationCode::InvalidPreset,
                    format!("unknown preset '{preset}' (expected workdays, sixdays or fullweek)"),
                )
            })?;
        Ok(self
            .run_batch(targets, skipped, Command::SetPreset(preset))
            .await)
    }

    /// Run `command` on every target concurrently. One target's failure
    /// does not stop the others.
    async fn run_batch(
        &self,
        targets: Vec<EntityId>,
        skipped: Vec<EntityId>,
        command: Command,
    ) -> BatchReport {
        let runs = targets.into_iter().map(|id| {
            let controller = self.get(&id);
            let command = command.clone();
            async move {
                let result = match controller {
                    Some(controller) => controller.execute(command).await.map(|_| ()),
                    None => Err(CoreError::DeviceNotFound {
                        identifier: id.to_string(),
                    }),
                };
                (id, result)
            }
        });

        let mut report = BatchReport {
            skipped,
            ..BatchReport::default()
        };
        for (id, result) in join_all(runs).await {
            match result {
                Ok(()) => report.succeeded.push(id),
                Err(e) => {
                    warn!(entity_id = %id, error = %e, "batch target failed");
                    report.failed.push(BatchFailure::new(id, &e));
                }
            }
        }
        debug!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "batch complete"
        );
        report
    }
}

/// Split targets into climate ids and everything else. Rejects the batch
/// when nothing addressable remains.
fn partition_targets(
    targets: impl IntoIterator<Item = EntityId>,
) -> Result<(Vec<EntityId>, Vec<EntityId>), CoreError> {
    let (valid, skipped): (Vec<_>, Vec<_>) =
        targets.into_iter().partition(EntityId::is_climate);
    for id in &skipped {
        warn!(entity_id = %id, "skipping non-climate target");
    }
    if valid.is_empty() {
        return Err(CoreError::validation(
            ValidationCode::NoValidTargets,
            "no climate entities among the targets",
        ));
    }
    Ok((valid, skipped))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn partition_keeps_climate_ids() {
        let (valid, skipped) = partition_targets([
            EntityId::from("climate.bathroom"),
            EntityId::from("switch.bathroom_poweron"),
            EntityId::from("light.hall"),
        ])
        .unwrap();
        assert_eq!(valid, vec![EntityId::climate("bathroom")]);
        assert_eq!(skipped.len(), 2);
    }

    #[test]
    fn partition_rejects_empty_batch() {
        let err = partition_targets([EntityId::from("sensor.x")]).unwrap_err();
        assert_eq!(err.validation_code(), Some(ValidationCode::NoValidTargets));
        assert!(partition_targets(Vec::new()).is_err());
    }

    #[tokio::test]
    async fn value_tokens_checked_before_dispatch() {
        let hub = ClimateHub::new();
        let ids = || vec![EntityId::climate("bathroom")];

        let err = hub.set_hvac_mode(ids(), "cool").await.unwrap_err();
        assert_eq!(err.validation_code(), Some(ValidationCode::InvalidHvacMode));

        let err = hub.set_preset_mode(ids(), "Temporary").await.unwrap_err();
        assert_eq!(err.validation_code(), Some(ValidationCode::InvalidPreset));

        let err = hub.set_temperature(ids(), 41.0).await.unwrap_err();
        assert_eq!(err.validation_code(), Some(ValidationCode::OutOfRange));
    }

    #[tokio::test]
    async fn unknown_target_reported_as_failure() {
        let hub = ClimateHub::new();
        let report = hub
            .set_hvac_mode(vec![EntityId::climate("nowhere")], "heat")
            .await
            .unwrap();
        assert!(report.succeeded.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert!(!report.is_complete_success());
    }
}
