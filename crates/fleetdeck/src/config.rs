//! CLI configuration — thin wrapper around `fleetdeck_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--backend, --timeout, etc.).

use std::time::Duration;

use fleetdeck_core::ControllerConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use fleetdeck_config::{Config, Profile, config_path, load_config_or_default, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `ControllerConfig` from the config file, profile, and CLI
/// overrides. Flags beat profile values; a bare `--backend` works with no
/// config file at all.
pub fn resolve_controller_config(global: &GlobalOpts) -> Result<ControllerConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);
    let profile = cfg.profiles.get(&profile_name);

    // An explicitly requested profile must exist.
    if global.profile.is_some() && profile.is_none() {
        let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
        available.sort_unstable();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: available.join(", "),
        });
    }

    // 1. Backend URL (flag > env > profile)
    let url_str = global
        .backend
        .as_deref()
        .or(profile.map(|p| p.backend.as_str()))
        .ok_or_else(|| CliError::NoConfig {
            path: config_path().display().to_string(),
        })?;
    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "backend".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    // 2. TLS / timeout (flag overrides profile)
    let accept_invalid_certs = global.insecure || profile.is_some_and(|p| p.insecure);
    let timeout = Duration::from_secs(global.timeout);

    Ok(ControllerConfig {
        url,
        // One-shot CLI invocations never poll on a timer.
        poll_interval_secs: 0,
        timeout,
        accept_invalid_certs,
    })
}
