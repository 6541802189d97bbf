//! `hysen set <parameter> <value>`.

use hysen_core::{
    ClimateRequest, ClimateView, Controller, HvacMode, NumberView, Preset, SelectView, SwitchView,
};

use crate::cli::{Parameter, SetArgs};
use crate::error::CliError;

use super::Ctx;
use super::util::{apply, parse_flag, parse_number};

pub async fn handle(args: SetArgs, controller: &Controller, ctx: &Ctx) -> Result<(), CliError> {
    let SetArgs { parameter, value } = args;
    let raw = value.as_str();

    match parameter {
        Parameter::Power => {
            let request = if parse_flag("power", raw)? {
                ClimateRequest::TurnOn
            } else {
                ClimateRequest::TurnOff
            };
            apply(&controller.view(ClimateView), request, ctx).await
        }
        Parameter::Mode => {
            let mode = raw.parse::<HvacMode>().map_err(|_| {
                CliError::invalid("mode", format!("'{raw}' is not one of: off, heat, auto"))
            })?;
            apply(
                &controller.view(ClimateView),
                ClimateRequest::HvacMode(mode),
                ctx,
            )
            .await
        }
        Parameter::Temperature => {
            let temp = parse_number("temperature", raw)?;
            apply(
                &controller.view(ClimateView),
                ClimateRequest::Temperature(temp),
                ctx,
            )
            .await
        }
        Parameter::Preset => {
            let preset = raw.parse::<Preset>().map_err(|_| {
                CliError::invalid(
                    "preset",
                    format!("'{raw}' is not one of: workdays, sixdays, fullweek"),
                )
            })?;
            apply(
                &controller.view(ClimateView),
                ClimateRequest::Preset(preset),
                ctx,
            )
            .await
        }
        Parameter::KeyLock => apply(&controller.view(SelectView::KeyLock), value, ctx).await,
        Parameter::Sensor => apply(&controller.view(SelectView::SensorType), value, ctx).await,
        Parameter::Hysteresis => number(controller, NumberView::Hysteresis, raw, ctx).await,
        Parameter::Calibration => number(controller, NumberView::Calibration, raw, ctx).await,
        Parameter::MaxTemp => number(controller, NumberView::MaxTemp, raw, ctx).await,
        Parameter::MinTemp => number(controller, NumberView::MinTemp, raw, ctx).await,
        Parameter::ExternalMaxTemp => {
            number(controller, NumberView::ExternalMaxTemp, raw, ctx).await
        }
        Parameter::FrostProtection => {
            let on = parse_flag("frost-protection", raw)?;
            apply(&controller.view(SwitchView::FrostProtection), on, ctx).await
        }
        Parameter::PowerOnDefault => {
            let on = parse_flag("power-on-default", raw)?;
            apply(&controller.view(SwitchView::PowerOnDefault), on, ctx).await
        }
    }
}

async fn number(
    controller: &Controller,
    view: NumberView,
    raw: &str,
    ctx: &Ctx,
) -> Result<(), CliError> {
    let value = parse_number(&view_field(view), raw)?;
    apply(&controller.view(view), value, ctx).await
}

fn view_field(view: NumberView) -> String {
    use hysen_core::ParameterView;
    view.key().trim_start_matches("number.").to_owned()
}
