// Reconciliation config discovery
// Loaded from --config, else ~/.config/ledgercheck/config.toml, else defaults

use std::fs;
use std::path::{Path, PathBuf};

use ledgercheck_recon::ReconConfig;

use crate::exit_codes::{EXIT_CONFIG, EXIT_USAGE};
use crate::CliError;

/// Per-user config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ledgercheck").join("config.toml"))
}

/// An explicit path always wins; the per-user file is used only if present.
pub fn resolve_config_path(explicit: Option<&Path>, user_default: Option<PathBuf>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => user_default.filter(|path| path.is_file()),
    }
}

/// Load the config in effect for this run.
pub fn load_config(explicit: Option<&Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = resolve_config_path(explicit, default_config_path()) else {
        log::debug!("no config file; using built-in defaults");
        return Ok(ReconConfig::default());
    };

    let contents = fs::read_to_string(&path).map_err(|e| {
        CliError::usage(format!("cannot read config {}: {e}", path.display()))
    })?;
    let config = ReconConfig::from_toml(&contents).map_err(|e| CliError {
        code: EXIT_CONFIG,
        message: format!("{}: {e}", path.display()),
        hint: None,
    })?;
    log::debug!("loaded config from {}", path.display());
    Ok(config)
}
