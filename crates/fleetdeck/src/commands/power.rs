//! Power command handler — the CLI face of the two-phase authentication
//! protocol.
//!
//! The unauthenticated attempt goes out first; only a 401 challenge makes
//! the CLI prompt. Interactive runs can retry a wrong password forever
//! (the backend gives no distinct wrong-password signal), `--password-stdin`
//! gets exactly one shot.

use owo_colors::OwoColorize;
use secrecy::SecretString;

use fleetdeck_core::{Controller, PowerOp, PowerProgress};

use crate::cli::{GlobalOpts, PowerArgs};
use crate::config::resolve_controller_config;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: &PowerArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let operation: PowerOp = args.operation.into();
    let config = resolve_controller_config(global)?;

    // The help text for a failed non-interactive auth echoes the CLI
    // operation name, not the wire token.
    let op_name = format!("{:?}", args.operation).to_lowercase();

    let controller = Controller::new(config)?;
    controller.connect().await;
    let result = run_power(
        &controller,
        &args.machine,
        operation,
        &op_name,
        args.password_stdin,
    )
    .await;
    controller.shutdown().await;

    let message = result?;
    if !global.quiet {
        if output::should_color(&global.color) {
            println!("{} {message}", "✓".green());
        } else {
            println!("{message}");
        }
    }
    Ok(())
}

/// Drive one power operation to a terminal state.
async fn run_power(
    controller: &Controller,
    query: &str,
    operation: PowerOp,
    op_name: &str,
    password_stdin: bool,
) -> Result<String, CliError> {
    controller.refresh().await?;
    let machine = controller.store().resolve(query)?;

    let mut progress = controller
        .begin_power(machine.identity.clone(), operation)
        .await?;
    let mut stdin_used = false;

    loop {
        match progress {
            PowerProgress::Completed { message } => return Ok(message),

            PowerProgress::Challenge { token, machine: target } => {
                // Prompt names the target from the last-fetched list.
                let label = target.as_ref().map_or_else(
                    || machine.identity.to_string(),
                    |m| {
                        format!(
                            "{} ({})",
                            m.display_name,
                            m.host_address.as_deref().unwrap_or("-")
                        )
                    },
                );

                let password = if password_stdin {
                    if stdin_used {
                        // Non-interactive callers can't loop on a second
                        // challenge; abandon the pending action.
                        controller.cancel_power(token);
                        return Err(CliError::AuthRequired {
                            operation: op_name.to_owned(),
                            machine: machine.identity.to_string(),
                        });
                    }
                    stdin_used = true;
                    read_password_from_stdin()?
                } else {
                    let entered =
                        rpassword::prompt_password(format!("Password for {label}: "))?;
                    if entered.is_empty() {
                        // Empty submit = cancel: clear the pending action,
                        // make no backend call.
                        controller.cancel_power(token);
                        return Err(CliError::Cancelled);
                    }
                    SecretString::from(entered)
                };

                progress = controller.resume_power(token, password).await?;
            }

            PowerProgress::Superseded => {
                return Err(CliError::Internal(
                    "power action was superseded mid-flight".into(),
                ));
            }
        }
    }
}

fn read_password_from_stdin() -> Result<SecretString, CliError> {
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let trimmed = line.trim_end_matches(['\r', '\n']).to_owned();
    Ok(SecretString::from(trimmed))
}
