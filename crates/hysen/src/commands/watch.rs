//! `hysen watch`: stream the rendered climate view on every refresh.

use std::time::Duration;

use hysen_core::{ClimateState, ClimateView, Controller};

use crate::cli::{OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::Ctx;
use super::util::{Describe, Target};

fn line(state: &ClimateState, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(format!(
            "{}  {}",
            chrono::Local::now().format("%H:%M:%S"),
            state.describe()
        )),
        OutputFormat::Json => output::render_json_line(state),
        OutputFormat::Yaml => Ok(format!("---\n{}", output::render_yaml(state)?)),
    }
}

pub async fn handle(args: WatchArgs, target: Target, ctx: &Ctx) -> Result<(), CliError> {
    let Target {
        name,
        mut config,
        device,
    } = target;
    if let Some(secs) = args.interval {
        config.refresh_interval = Duration::from_secs(secs);
    }
    if config.refresh_interval.is_zero() {
        return Err(CliError::invalid(
            "interval",
            "polling is disabled for this device; pass --interval",
        ));
    }

    let controller = Controller::new(config, device);
    controller.connect().await?;
    tracing::info!(device = %name, "watching");

    let mut stream = controller.view(ClimateView).subscribe();
    let mut printed = 0usize;
    let mut next = Some(stream.current());

    while let Some(state) = next.take() {
        output::print_output(&line(&state, ctx.output)?, ctx.quiet);
        printed += 1;
        if args.count.is_some_and(|limit| printed >= limit) {
            break;
        }
        next = tokio::select! {
            _ = tokio::signal::ctrl_c() => None,
            changed = stream.changed() => changed,
        };
    }

    controller.disconnect().await;
    Ok(())
}
