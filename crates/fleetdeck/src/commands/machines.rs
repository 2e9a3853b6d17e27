//! Inventory command handlers: list, add, delete.

use owo_colors::OwoColorize;
use tabled::Tabled;

use fleetdeck_core::{AddMachineRequest, Controller, MachineCard, project_fleet};

use crate::cli::{AddArgs, DeleteArgs, GlobalOpts, OutputFormat};
use crate::config::resolve_controller_config;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct MachineRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Kind")]
    kind: String,
}

fn to_row(card: &MachineCard, color: bool) -> MachineRow {
    let dot = if card.running { "●" } else { "○" };
    let status = if color {
        if card.running {
            format!("{} {}", dot.green(), card.status)
        } else {
            format!("{} {}", dot.red(), card.status)
        }
    } else {
        format!("{dot} {}", card.status)
    };

    MachineRow {
        name: card.name.clone(),
        status,
        mac: card.identity.to_string(),
        address: card.address.clone(),
        user: card.login_user.clone(),
        method: card.method.clone(),
        kind: card.kind.to_string(),
    }
}

// ── Handlers ────────────────────────────────────────────────────────

/// `fleetdeck list` — fetch the inventory and render cards + counters.
pub async fn list(global: &GlobalOpts) -> Result<(), CliError> {
    let config = resolve_controller_config(global)?;

    let view = Controller::oneshot(config, |ctrl| async move {
        ctrl.refresh().await?;
        Ok(project_fleet(&ctrl.machines_snapshot()))
    })
    .await?;

    let color = output::should_color(&global.color);
    let rendered = output::render_list(
        &global.output,
        &view.cards,
        |card| to_row(card, color),
        |card| card.identity.to_string(),
    );
    output::print_output(&rendered, global.quiet);

    // The aggregate counters accompany the table view only; structured
    // formats carry the cards and the counters are derivable.
    if matches!(global.output, OutputFormat::Table) && !global.quiet {
        println!(
            "{} machines · {} running · {} stopped",
            view.summary.total, view.summary.running, view.summary.stopped
        );
    }

    Ok(())
}

/// `fleetdeck add` — register a new machine and trigger a refresh.
pub async fn add(args: &AddArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let request = AddMachineRequest {
        vm_name: args.name.clone(),
        host_ip: args.host.clone(),
        mac: args.mac.clone(),
        method: args.method.clone(),
        user: args.user.clone(),
        kind: args.kind.as_wire().into(),
    };

    let config = resolve_controller_config(global)?;
    let name = args.name.clone();

    Controller::oneshot(config, |ctrl| async move { ctrl.add_machine(request).await }).await?;

    if !global.quiet {
        if output::should_color(&global.color) {
            println!("{} Added {name}", "✓".green());
        } else {
            println!("Added {name}");
        }
    }
    Ok(())
}

/// `fleetdeck delete` — confirmation-gated inventory removal.
///
/// Backend failures are logged only, never surfaced — the next list shows
/// whether the machine is gone.
pub async fn delete(args: &DeleteArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = resolve_controller_config(global)?;

    // Resolve first so the confirmation names the actual target.
    let query = args.machine.clone();
    let machine = Controller::oneshot(config.clone(), |ctrl| async move {
        ctrl.refresh().await?;
        ctrl.store().resolve(&query)
    })
    .await?;

    if !global.yes {
        let prompt = format!(
            "Delete {} ({})? This cannot be undone.",
            machine.display_name, machine.identity
        );
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| CliError::Internal(e.to_string()))?;
        if !confirmed {
            return Err(CliError::Cancelled);
        }
    }

    let identity = machine.identity.clone();
    Controller::oneshot(config, |ctrl| async move {
        ctrl.delete_machine(&identity).await;
        Ok(())
    })
    .await?;

    if !global.quiet {
        println!("Delete requested for {}", machine.display_name);
    }
    Ok(())
}
