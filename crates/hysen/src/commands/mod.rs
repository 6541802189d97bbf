//! Command handlers, one module per subcommand.

pub mod batch;
pub mod clock;
pub mod config_cmd;
pub mod set;
pub mod slot;
pub mod status;
pub mod util;
pub mod watch;

use hysen_core::Controller;

use crate::cli::{Command, OutputFormat};
use crate::error::CliError;

use self::util::Target;

/// Options every device command needs after config resolution.
pub struct Ctx {
    pub output: OutputFormat,
    pub quiet: bool,
}

/// Route a device command. Config and completion commands are handled in
/// `main` since they never touch a device.
pub async fn dispatch(cmd: Command, target: Target, ctx: &Ctx) -> Result<(), CliError> {
    match cmd {
        Command::Watch(args) => watch::handle(args, target, ctx).await,
        cmd => {
            let Target {
                name,
                config,
                device,
            } = target;
            tracing::debug!(device = %name, "connecting");
            let controller = Controller::new(util::oneshot_config(config), device);
            controller.connect().await?;
            let result = run_oneshot(cmd, &controller, ctx).await;
            controller.disconnect().await;
            result
        }
    }
}

async fn run_oneshot(cmd: Command, controller: &Controller, ctx: &Ctx) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(controller, ctx),
        Command::Set(args) => set::handle(args, controller, ctx).await,
        Command::Slot(args) => slot::handle(args, controller, ctx).await,
        Command::Clock(args) => clock::handle(args, controller, ctx).await,
        Command::Batch(_) | Command::Watch(_) | Command::Config(_) | Command::Completions(_) => {
            Err(CliError::Internal("command routed to the wrong handler".into()))
        }
    }
}
