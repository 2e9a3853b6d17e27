//! Command handlers, one module per command family.

pub mod config_cmd;
pub mod connect;
pub mod machines;
pub mod power;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a parsed command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::List => machines::list(global).await,
        Command::Power(args) => power::handle(&args, global).await,
        Command::Delete(args) => machines::delete(&args, global).await,
        Command::Add(args) => machines::add(&args, global).await,
        Command::Connect(args) => connect::handle(&args, global).await,
        Command::Config(cmd) => config_cmd::handle(&cmd, global),
    }
}
