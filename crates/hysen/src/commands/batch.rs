//! `hysen batch <mode|temperature|preset> <value> <targets...>`.
//!
//! Every configured device is registered in a `ClimateHub`; the hub routes
//! the change to the requested climate entities and reports per target.

use tabled::Tabled;

use hysen_config::Config;
use hysen_core::{BatchReport, ClimateHub, Controller, EntityId};

use crate::cli::{BatchAction, BatchArgs};
use crate::error::CliError;
use crate::output;

use super::Ctx;
use super::util::{open_target, oneshot_config, parse_number};

#[derive(Tabled)]
struct BatchRow {
    #[tabled(rename = "Entity")]
    entity: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

fn rows(report: &BatchReport) -> Vec<BatchRow> {
    let ok = report.succeeded.iter().map(|id| BatchRow {
        entity: id.to_string(),
        result: "ok".into(),
        detail: String::new(),
    });
    let failed = report.failed.iter().map(|f| BatchRow {
        entity: f.entity_id.to_string(),
        result: "failed".into(),
        detail: f.error.clone(),
    });
    let skipped = report.skipped.iter().map(|id| BatchRow {
        entity: id.to_string(),
        result: "skipped".into(),
        detail: "not a climate entity".into(),
    });
    ok.chain(failed).chain(skipped).collect()
}

/// Register every configured device. Devices that cannot be read are left
/// out, so targeting them reports "not found" rather than aborting the batch.
async fn build_hub(cfg: &Config) -> ClimateHub {
    let hub = ClimateHub::new();
    for (name, profile) in &cfg.devices {
        let target = match open_target(name, profile, cfg) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!(device = %name, error = %e, "skipping device with unreadable state");
                continue;
            }
        };
        let controller = Controller::new(oneshot_config(target.config), target.device);
        if let Err(e) = hub.register(controller).await {
            tracing::warn!(device = %name, error = %e, "device unavailable for batch");
        }
    }
    hub
}

pub async fn handle(args: BatchArgs, cfg: &Config, ctx: &Ctx) -> Result<(), CliError> {
    let targets: Vec<EntityId> = args.targets.iter().map(|t| EntityId::from(t.as_str())).collect();
    let value = args.value.as_str();
    let temperature = match args.action {
        BatchAction::Temperature => Some(parse_number("temperature", value)?),
        BatchAction::Mode | BatchAction::Preset => None,
    };

    let hub = build_hub(cfg).await;
    let result = match (args.action, temperature) {
        (BatchAction::Temperature, Some(temp)) => hub.set_temperature(targets, temp).await,
        (BatchAction::Preset, _) => hub.set_preset_mode(targets, value).await,
        _ => hub.set_hvac_mode(targets, value).await,
    };
    for id in hub.ids() {
        hub.deregister(&id).await?;
    }
    let report = result?;

    let out = output::render_single(ctx.output, &report, |r| output::render_table(&rows(r)))?;
    output::print_output(&out, ctx.quiet);

    if report.is_complete_success() {
        Ok(())
    } else {
        Err(CliError::BatchIncomplete {
            failed: report.failed.len(),
            total: report.succeeded.len() + report.failed.len(),
        })
    }
}
