//! Clap derive structures for the `hysen` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hysen -- control Hysen heating thermostats
#[derive(Debug, Parser)]
#[command(
    name = "hysen",
    version,
    about = "Control Hysen heating thermostats from the command line",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "HYSEN_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Device profile to use
    #[arg(long, short = 'd', env = "HYSEN_DEVICE", global = true)]
    pub device: Option<String>,

    /// Output format (defaults to the config file's `defaults.output`)
    #[arg(long, short = 'o', env = "HYSEN_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables (default)
    Table,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the thermostat and every parameter
    #[command(alias = "st")]
    Status,

    /// Change one parameter
    Set(SetArgs),

    /// Show or change a schedule slot
    Slot(SlotArgs),

    /// Device clock operations
    Clock(ClockArgs),

    /// Apply one change to several thermostats
    Batch(BatchArgs),

    /// Print the thermostat state on every refresh
    Watch(WatchArgs),

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Set ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SetArgs {
    pub parameter: Parameter,

    /// New value (on/off for switches and power)
    #[arg(allow_hyphen_values = true)]
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Parameter {
    Power,
    /// off, heat or auto
    Mode,
    Temperature,
    /// workdays, sixdays or fullweek
    Preset,
    /// unlocked or locked
    KeyLock,
    /// internal, external or int_control_ext_limit
    Sensor,
    Hysteresis,
    Calibration,
    MaxTemp,
    MinTemp,
    ExternalMaxTemp,
    FrostProtection,
    PowerOnDefault,
}

// ── Slot ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SlotArgs {
    pub group: SlotGroup,

    /// Slot number (weekday 1-6, weekend 1-2)
    pub index: u8,

    /// Start time, HH:MM or HH:MM:SS
    #[arg(long)]
    pub time: Option<String>,

    /// Setpoint in °C
    #[arg(long)]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SlotGroup {
    Weekday,
    Weekend,
}

// ── Clock ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ClockArgs {
    #[command(subcommand)]
    pub command: ClockCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClockCommand {
    /// Copy this machine's local time to the device
    Sync,

    /// Set the device clock explicitly
    Set {
        /// Time of day, HH:MM or HH:MM:SS
        #[arg(long)]
        time: String,

        /// Day of week (mon..sun); defaults to today
        #[arg(long)]
        weekday: Option<String>,
    },
}

// ── Batch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BatchArgs {
    pub action: BatchAction,

    #[arg(allow_hyphen_values = true)]
    pub value: String,

    /// Target entity ids, e.g. climate.bathroom
    #[arg(required = true)]
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BatchAction {
    Mode,
    Temperature,
    Preset,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval in seconds (overrides the config)
    #[arg(long)]
    pub interval: Option<u64>,

    /// Stop after this many updates
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Add a device profile and make it the default
    Init(InitArgs),

    /// Print the effective configuration
    Show,

    /// Print the config file location
    Path,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Controller address on the local network
    #[arg(long)]
    pub host: String,

    /// Profile name
    #[arg(long, default_value = "default")]
    pub name: String,

    #[arg(long)]
    pub mac: Option<String>,

    /// Display name (defaults to the profile name)
    #[arg(long)]
    pub display_name: Option<String>,

    /// Correct the device clock once a day
    #[arg(long)]
    pub sync_clock: bool,

    /// Local hour for the daily clock sync
    #[arg(long, default_value = "4")]
    pub sync_hour: u32,

    /// Simulated backend state file
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Replace an existing profile of the same name
    #[arg(long)]
    pub force: bool,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    pub shell: clap_complete::Shell,
}
