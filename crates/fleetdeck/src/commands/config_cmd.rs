//! Config command handlers: show, path, init.

use crate::cli::{ConfigCommand, ConfigInitArgs, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(cmd: &ConfigCommand, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
        ConfigCommand::Show => show(global),
        ConfigCommand::Init(args) => init(args, global),
    }
}

fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();

    let rendered = match global.output {
        OutputFormat::Json => output::render_json_pretty(&cfg),
        OutputFormat::JsonCompact => output::render_json_compact(&cfg),
        // TOML is the config's native shape; table and plain both show it.
        OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&cfg)
            .map_err(|e| CliError::Internal(format!("config serialization failed: {e}")))?,
    };
    output::print_output(&rendered, global.quiet);
    Ok(())
}

fn init(args: &ConfigInitArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_path();
    if path.exists() && !global.yes {
        return Err(CliError::Validation {
            field: "config".into(),
            reason: format!(
                "{} already exists — pass --yes to overwrite",
                path.display()
            ),
        });
    }

    // Reject an invalid URL before writing it anywhere.
    args.backend
        .parse::<url::Url>()
        .map_err(|_| CliError::Validation {
            field: "backend".into(),
            reason: format!("invalid URL: {}", args.backend),
        })?;

    let mut cfg = config::Config::default();
    cfg.default_profile = Some(args.name.clone());
    cfg.profiles.insert(
        args.name.clone(),
        config::Profile {
            backend: args.backend.clone(),
            poll_interval_secs: args.poll_interval,
            timeout_secs: global.timeout,
            insecure: global.insecure,
        },
    );

    config::save_config(&cfg)?;
    if !global.quiet {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
