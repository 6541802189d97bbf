//! `hysen clock sync|set`.

use chrono::{Datelike, Local, Weekday};

use hysen_core::{ClockRequest, ClockView, Controller, DeviceClock, parse_slot_time};

use crate::cli::{ClockArgs, ClockCommand};
use crate::error::CliError;

use super::Ctx;
use super::util::apply;

pub async fn handle(args: ClockArgs, controller: &Controller, ctx: &Ctx) -> Result<(), CliError> {
    let request = match args.command {
        ClockCommand::Sync => ClockRequest::Sync,
        ClockCommand::Set { time, weekday } => {
            let time = parse_clock_time(&time)?;
            let weekday = match weekday {
                Some(raw) => raw.parse::<Weekday>().map_err(|_| {
                    CliError::invalid("weekday", format!("'{raw}' is not a day of the week"))
                })?,
                None => Local::now().weekday(),
            };
            ClockRequest::Set(DeviceClock::new(time, weekday))
        }
    };
    apply(&controller.view(ClockView), request, ctx).await
}

/// Like a slot time, but seconds are kept.
fn parse_clock_time(raw: &str) -> Result<chrono::NaiveTime, CliError> {
    chrono::NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S")
        .or_else(|_| parse_slot_time(raw).map_err(CliError::from))
}
