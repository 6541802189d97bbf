//! Config subcommand handlers.

use std::path::Path;

use hysen_config::{Config, DeviceProfile, load_config_from, save_config_to};

use crate::cli::{ConfigArgs, ConfigCommand, InitArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

pub fn handle(
    args: ConfigArgs,
    path: &Path,
    format: Option<OutputFormat>,
    quiet: bool,
) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init(init) => init_profile(init, path, quiet),

        ConfigCommand::Show => {
            let cfg = load_config_from(path)?;
            let format = super::util::output_format(format, &cfg);
            let out = output::render_single(format, &cfg, |c| {
                toml::to_string_pretty(c).unwrap_or_default()
            })?;
            output::print_output(out.trim_end(), quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), quiet);
            Ok(())
        }
    }
}

fn init_profile(init: InitArgs, path: &Path, quiet: bool) -> Result<(), CliError> {
    let mut cfg = if path.exists() {
        load_config_from(path)?
    } else {
        Config::default()
    };

    if cfg.devices.contains_key(&init.name) && !init.force {
        return Err(CliError::ProfileExists { name: init.name });
    }

    let profile = DeviceProfile {
        mac: init.mac,
        name: init.display_name,
        sync_clock: init.sync_clock,
        sync_hour: init.sync_hour,
        state_file: init.state_file,
        ..DeviceProfile::new(init.host)
    };
    // Validate before writing anything.
    hysen_config::profile_to_controller_config(&profile, &init.name, &cfg.defaults)?;

    cfg.devices.insert(init.name.clone(), profile);
    cfg.default_device = Some(init.name.clone());
    save_config_to(&cfg, path)?;

    if !quiet {
        eprintln!("✓ Configuration written to {}", path.display());
        eprintln!("  Default device: {}", init.name);
    }
    Ok(())
}
