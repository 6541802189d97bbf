//! `hysen slot <weekday|weekend> <n> [--time] [--temperature]`.

use hysen_core::{Controller, NumberView, ParameterView, SlotId, SlotTimeView, parse_slot_time};

use crate::cli::{SlotArgs, SlotGroup};
use crate::error::CliError;
use crate::output;

use super::Ctx;
use super::util::{Describe, apply};

pub async fn handle(args: SlotArgs, controller: &Controller, ctx: &Ctx) -> Result<(), CliError> {
    let weekend = args.group == SlotGroup::Weekend;
    let slot = SlotId::new(args.index, weekend).ok_or_else(|| {
        let (group, max) = if weekend { ("weekend", 2) } else { ("weekday", 6) };
        CliError::invalid(
            "slot",
            format!("{group} slot must be 1-{max}, got {}", args.index),
        )
    })?;

    // Parse everything before the first write.
    let time = args.time.as_deref().map(parse_slot_time).transpose()?;

    if let Some(time) = time {
        apply(&controller.view(SlotTimeView(slot)), time, ctx).await?;
    }
    if let Some(temperature) = args.temperature {
        apply(
            &controller.view(NumberView::SlotTemperature(slot)),
            temperature,
            ctx,
        )
        .await?;
    }
    if time.is_none() && args.temperature.is_none() {
        let state = controller.state();
        let start = SlotTimeView(slot).render(&state);
        let temp = NumberView::SlotTemperature(slot).render(&state);
        let out = output::render_single(
            ctx.output,
            &serde_json::json!({
                "slot": slot,
                "time": start.time,
                "temperature": temp.value,
                "available": start.available,
            }),
            |_| format!("{slot}: {} at {}", temp.describe(), start.describe()),
        )?;
        output::print_output(&out, ctx.quiet);
    }
    Ok(())
}
