//! Connect command handler.
//!
//! No backend request is made: the target URI is resolved locally and
//! printed, so scripts can pipe it straight into `open`/`xdg-open`.

use fleetdeck_core::{Controller, connect_target};

use crate::cli::{ConnectArgs, GlobalOpts};
use crate::config::resolve_controller_config;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: &ConnectArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = resolve_controller_config(global)?;
    let query = args.machine.clone();

    let target = Controller::oneshot(config, |ctrl| async move {
        ctrl.refresh().await?;
        let machine = ctrl.store().resolve(&query)?;
        connect_target(&machine, ctrl.client())
    })
    .await?;

    output::print_output(target.as_str(), global.quiet);
    Ok(())
}
