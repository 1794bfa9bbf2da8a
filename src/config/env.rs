//! Environment variable configuration.
//!
//! All runtime configuration comes from the environment:
//! - `WARDEN_DISCORD_TOKEN` (or `DISCORD_TOKEN`) - Discord bot token
//! - `WARDEN_SETTINGS_DIR` - directory holding per-guild settings files

use std::env;
use std::path::PathBuf;

/// Environment variable prefix for all config values.
const ENV_PREFIX: &str = "WARDEN";

/// Get the Discord bot token from the environment.
///
/// Checks `WARDEN_DISCORD_TOKEN` first, then falls back to the
/// conventional `DISCORD_TOKEN`.
pub fn get_discord_token() -> Option<String> {
    env::var(format!("{}_DISCORD_TOKEN", ENV_PREFIX))
        .or_else(|_| env::var("DISCORD_TOKEN"))
        .ok()
        .filter(|token| !token.is_empty())
}

/// Get the directory for per-guild settings files.
///
/// Checks `WARDEN_SETTINGS_DIR`, otherwise the current directory.
pub fn get_settings_dir() -> PathBuf {
    env::var(format!("{}_SETTINGS_DIR", ENV_PREFIX))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_prefix() {
        assert_eq!(ENV_PREFIX, "WARDEN");
    }

    #[test]
    fn test_settings_dir_default_and_override() {
        env::remove_var("WARDEN_SETTINGS_DIR");
        assert_eq!(get_settings_dir(), PathBuf::from("."));

        env::set_var("WARDEN_SETTINGS_DIR", "/var/lib/warden");
        assert_eq!(get_settings_dir(), PathBuf::from("/var/lib/warden"));
        env::remove_var("WARDEN_SETTINGS_DIR");
    }
}
