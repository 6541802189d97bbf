mod backend;
mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::commands::Ctx;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// `RUST_LOG` wins; otherwise `-v` raises the level. Logs go to stderr so
/// structured output on stdout stays parseable.
fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let global = cli.global;
    let config_path = global
        .config
        .clone()
        .unwrap_or_else(hysen_config::config_path);

    match cli.command {
        // Config commands don't need a device
        Command::Config(args) => {
            commands::config_cmd::handle(args, &config_path, global.output, global.quiet)
        }

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "hysen", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let cfg = hysen_config::load_config_from(&config_path)?;
            let ctx = Ctx {
                output: commands::util::output_format(global.output, &cfg),
                quiet: global.quiet,
            };

            if let Command::Batch(args) = cmd {
                if cfg.devices.is_empty() {
                    return Err(CliError::NoConfig {
                        path: config_path.display().to_string(),
                    });
                }
                return commands::batch::handle(args, &cfg, &ctx).await;
            }

            let target =
                commands::util::resolve_target(&cfg, global.device.as_deref(), &config_path)?;
            tracing::debug!(command = ?cmd, device = %target.name, "dispatching command");
            commands::dispatch(cmd, target, &ctx).await
        }
    }
}
