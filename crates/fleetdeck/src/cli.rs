//! Clap derive structures for the `fleetdeck` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

use fleetdeck_core::PowerOp;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fleetdeck -- control a small fleet of machines from the command line
#[derive(Debug, Parser)]
#[command(
    name = "fleetdeck",
    version,
    about = "Manage a small machine fleet from the command line",
    long_about = "Control client for a fleet inventory backend.\n\n\
        Lists machines, dispatches power operations (off / reboot / wake-on-LAN),\n\
        adds and deletes inventory entries, and resolves connect targets.\n\
        Power operations try without a password first and prompt only when\n\
        the backend asks for one.",
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
    /// Backend profile to use
    #[arg(long, short = 'p', env = "FLEETDECK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, short = 'b', env = "FLEETDECK_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "FLEETDECK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "FLEETDECK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "FLEETDECK_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one identifier per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

// ── Command Tree ─────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List machines with status and aggregate counters
    List,

    /// Dispatch a power operation (prompts for a password only if asked)
    Power(PowerArgs),

    /// Remove a machine from the inventory
    Delete(DeleteArgs),

    /// Register a new machine
    Add(AddArgs),

    /// Resolve the connect target for a machine (prints a URI)
    Connect(ConnectArgs),

    /// Inspect or create the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Args)]
pub struct PowerArgs {
    /// Operation to dispatch
    #[arg(value_enum)]
    pub operation: PowerOpArg,

    /// Target machine: MAC address or unique display name
    pub machine: String,

    /// Read the password from stdin instead of prompting (scripting);
    /// a second challenge fails instead of re-prompting
    #[arg(long)]
    pub password_stdin: bool,
}

/// CLI-facing power operation names.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PowerOpArg {
    Off,
    Reboot,
    Wake,
}

impl From<PowerOpArg> for PowerOp {
    fn from(arg: PowerOpArg) -> Self {
        match arg {
            PowerOpArg::Off => PowerOp::Off,
            PowerOpArg::Reboot => PowerOp::Reboot,
            PowerOpArg::Wake => PowerOp::Wake,
        }
    }
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Target machine: MAC address or unique display name
    pub machine: String,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// MAC address
    #[arg(long)]
    pub mac: String,

    /// Host address (may be unknown)
    #[arg(long, default_value = "")]
    pub host: String,

    /// Login user for connect hints
    #[arg(long, default_value = "")]
    pub user: String,

    /// Connect method (SSH, WinRM, API, ...)
    #[arg(long, default_value = "SSH")]
    pub method: String,

    /// Machine kind: physical machines are wake-on-LAN eligible
    #[arg(long, value_enum, default_value = "virtual")]
    pub kind: MachineKindArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MachineKindArg {
    Physical,
    Virtual,
}

impl MachineKindArg {
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Physical => "physical",
            Self::Virtual => "virtual",
        }
    }
}

#[derive(Debug, Args)]
pub struct ConnectArgs {
    /// Target machine: MAC address or unique display name
    pub machine: String,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved configuration
    Show,
    /// Print the config file path
    Path,
    /// Write a starter config file with one profile
    Init(ConfigInitArgs),
}

#[derive(Debug, Args)]
pub struct ConfigInitArgs {
    /// Backend URL for the new profile
    #[arg(long)]
    pub backend: String,

    /// Profile name
    #[arg(long, default_value = "default")]
    pub name: String,

    /// Inventory poll interval in seconds
    #[arg(long, default_value = "5")]
    pub poll_interval: u64,
}
