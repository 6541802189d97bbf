// ── Parameter views ──
//
// Each view is a pure projection of the cache: `render` recomputes every
// field from the latest `CacheState`, and `command` turns a user value into
// the `Command` that changes it. Views hold no copies of device data.

pub mod climate;
pub mod clock;
pub mod number;
pub mod schedule;
pub mod select;
pub mod switch;

use std::fmt;

use serde::Serialize;

use crate::command::{Command, CommandResult};
use crate::controller::Controller;
use crate::error::CoreError;
use crate::store::CacheState;
use crate::stream::ViewStream;

pub use climate::{ClimateRequest, ClimateState, ClimateView};
pub use clock::{ClockRequest, ClockState, ClockView};
pub use number::{NumberState, NumberView};
pub use schedule::{SlotTimeState, SlotTimeView};
pub use select::{SelectState, SelectView};
pub use switch::{SwitchState, SwitchView};

/// A user-facing projection of one attribute or attribute group.
pub trait ParameterView: Send + Sync + 'static {
    /// What the view displays.
    type State: Clone + PartialEq + fmt::Debug + Serialize + Send + Sync + 'static;
    /// What a user hands the view to change it.
    type Value;

    /// Stable key, `<domain>.<attribute>`.
    fn key(&self) -> String;

    fn render(&self, state: &CacheState) -> Self::State;

    /// Translate a user value into a command. Fails only on values the view
    /// can reject without looking at device state.
    fn command(&self, value: Self::Value) -> Result<Command, CoreError>;
}

// ── BoundView ───────────────────────────────────────────────────────

/// A view attached to a running controller.
///
/// Reads go straight to the controller's cache; writes go through its
/// command queue.
pub struct BoundView<V: ParameterView> {
    view: V,
    controller: Controller,
}

impl<V: ParameterView + Clone> BoundView<V> {
    pub(crate) fn new(view: V, controller: Controller) -> Self {
        Self { view, controller }
    }

    pub fn key(&self) -> String {
        self.view.key()
    }

    /// Render from the latest cache state.
    pub fn state(&self) -> V::State {
        self.view.render(&self.controller.store().state())
    }

    pub fn subscribe(&self) -> ViewStream<V> {
        self.controller.store().subscribe().render(self.view.clone())
    }

    pub async fn set(&self, value: V::Value) -> Result<CommandResult, CoreError> {
        let command = self.view.command(value)?;
        self.controller.execute(command).await
    }
}

// ── Shared helpers ──────────────────────────────────────────────────

/// Convert a whole-number display value into a register byte.
#[allow(
    clippy::as_conversions,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub(crate) fn whole_number(value: f32) -> Result<u8, CoreError> {
    use crate::command::ValidationCode;

    if !value.is_finite() || !(0.0..=f32::from(u8::MAX)).contains(&value) {
        return Err(CoreError::validation(
            ValidationCode::OutOfRange,
            format!("{value} is out of range"),
        ));
    }
    if value.fract() != 0.0 {
        return Err(CoreError::validation(
            ValidationCode::InvalidStep,
            format!("{value} must be a whole number"),
        ));
    }
    Ok(value as u8)
}
