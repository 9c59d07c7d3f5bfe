//! Centralized path resolution for gauge
//!
//! # Environment Variables
//!
//! - `GAUGE_CONFIG_DIR` - Override config directory (e.g., `~/dotfiles/gauge`)
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `GAUGE_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/gauge` (if set)
//! 3. Platform default:
//!    - Windows: `%APPDATA%\gauge`
//!    - macOS/Linux: `~/.config/gauge`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "GAUGE_CONFIG_DIR";

/// Name of the config file inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Get the gauge config directory path
pub fn config_dir() -> Result<PathBuf> {
    // 1. Check environment variable override
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    // 2. Check XDG_CONFIG_HOME
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join("gauge");
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    // 3. Platform default
    #[cfg(windows)]
    {
        if let Some(app_data) = dirs::config_dir() {
            let path = app_data.join("gauge");
            log::debug!("Using Windows config dir: {}", path.display());
            return Ok(path);
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join("gauge");
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Default config file path
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde() {
        let expanded = expand("~/dashboards");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with("dashboards"));
    }

    #[test]
    fn test_expand_plain_path_unchanged() {
        assert_eq!(expand("/etc/gauge"), PathBuf::from("/etc/gauge"));
    }

    #[test]
    fn test_config_file_name() {
        let file = config_file().unwrap();
        assert!(file.ends_with(CONFIG_FILE));
    }
}
