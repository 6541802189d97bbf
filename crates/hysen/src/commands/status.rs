//! `hysen status`: the climate summary plus every parameter view.

use serde::Serialize;
use tabled::Tabled;

use hysen_core::{
    ClimateState, ClimateView, ClockView, Controller, EntityId, NumberView, ParameterView,
    RefreshStatus, SelectView, SlotTimeView, SwitchView,
};

use crate::error::CliError;
use crate::output;

use super::Ctx;
use super::util::Describe;

#[derive(Serialize)]
struct StatusReport {
    device: String,
    entity_id: EntityId,
    host: String,
    refresh: RefreshStatus,
    climate: ClimateState,
    parameters: Vec<ParameterRow>,
}

#[derive(Serialize, Tabled)]
struct ParameterRow {
    #[tabled(rename = "Entity")]
    entity: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Available")]
    available: bool,
    #[tabled(skip)]
    state: serde_json::Value,
}

fn row<V>(view: &V, controller: &Controller) -> Result<ParameterRow, CliError>
where
    V: ParameterView,
    V::State: Describe,
{
    let state = view.render(&controller.state());
    Ok(ParameterRow {
        entity: view.key(),
        value: state.describe(),
        available: state.available(),
        state: serde_json::to_value(&state)?,
    })
}

fn parameter_rows(controller: &Controller) -> Result<Vec<ParameterRow>, CliError> {
    let mut rows = Vec::new();
    for view in NumberView::all() {
        rows.push(row(&view, controller)?);
    }
    for view in SelectView::all() {
        rows.push(row(&view, controller)?);
    }
    for view in SwitchView::all() {
        rows.push(row(&view, controller)?);
    }
    for view in SlotTimeView::all() {
        rows.push(row(&view, controller)?);
    }
    rows.push(row(&ClockView, controller)?);
    rows.sort_by(|a, b| a.entity.cmp(&b.entity));
    Ok(rows)
}

fn detail(report: &StatusReport) -> String {
    let c = &report.climate;
    let presets: Vec<String> = c.preset_modes.iter().map(ToString::to_string).collect();
    let lines = [
        format!("Device:    {} ({})", report.device, report.entity_id),
        format!("Host:      {}", report.host),
        format!(
            "Mode:      {} ({})",
            output::or_dash(c.hvac_mode),
            c.hvac_action
        ),
        format!("Current:   {}", output::temp(c.current_temperature)),
        format!(
            "Target:    {} (range {}-{})",
            output::temp(c.target_temperature),
            c.min_temp,
            c.max_temp
        ),
        format!(
            "Preset:    {} [{}]",
            output::or_dash(c.preset),
            presets.join(", ")
        ),
        format!("Power:     {}", output::or_dash(c.power)),
        format!("Sensor:    {}", output::or_dash(c.sensor)),
        format!("Valve:     {}", output::or_dash(c.valve)),
        format!("Features:  {}", c.features.names().join(", ")),
        format!("Available: {}", if c.available { "yes" } else { "no" }),
    ];
    format!(
        "{}\n\n{}",
        lines.join("\n"),
        output::render_table(&report.parameters)
    )
}

pub fn handle(controller: &Controller, ctx: &Ctx) -> Result<(), CliError> {
    let state = controller.state();
    let report = StatusReport {
        device: controller.config().name.clone(),
        entity_id: controller.entity_id(),
        host: controller.host().to_owned(),
        refresh: state.refresh.clone(),
        climate: ClimateView.render(&state),
        parameters: parameter_rows(controller)?,
    };
    let out = output::render_single(ctx.output, &report, detail)?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
