//! Per-guild settings persistence and in-memory registry.
//!
//! Each guild's settings live in their own `settings_<guildId>.json`
//! file. Loading is forgiving: a missing or corrupt file yields empty
//! settings so one guild's bad state never affects another. Saving is
//! explicit and happens after every mutation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serenity::model::id::GuildId;
use tracing::{info, warn};

use crate::common::error::{SettingsError, SettingsResult};
use crate::settings::types::GuildSettings;

/// Build the settings file path for a guild.
pub fn settings_path(dir: &Path, guild_id: GuildId) -> PathBuf {
    dir.join(format!("settings_{}.json", guild_id))
}

/// Load a guild's settings from disk.
///
/// Failures are logged and recovered by returning empty settings; they
/// are never surfaced to chat.
pub async fn load_settings(dir: &Path, guild_id: GuildId) -> GuildSettings {
    match try_load(dir, guild_id).await {
        Ok(settings) => {
            info!("Settings loaded successfully for guild {}", guild_id);
            settings
        }
        Err(e) => {
            warn!("Failed to load settings for guild {}: {}", guild_id, e);
            GuildSettings::default()
        }
    }
}

async fn try_load(dir: &Path, guild_id: GuildId) -> SettingsResult<GuildSettings> {
    let path = settings_path(dir, guild_id);
    let raw = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
    serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Write a guild's settings to disk as pretty-printed JSON.
pub async fn save_settings(
    dir: &Path,
    guild_id: GuildId,
    settings: &GuildSettings,
) -> SettingsResult<()> {
    let path = settings_path(dir, guild_id);
    let json =
        serde_json::to_string_pretty(settings).map_err(|source| SettingsError::Serialize {
            path: path.display().to_string(),
            source,
        })?;
    tokio::fs::write(&path, json)
        .await
        .map_err(|source| SettingsError::Write {
            path: path.display().to_string(),
            source,
        })
}

/// Process-wide settings registry, keyed by guild id.
///
/// Mutated only by command handlers; the forwarder reads snapshots and
/// never writes back.
#[derive(Debug)]
pub struct SettingsStore {
    dir: PathBuf,
    guilds: HashMap<GuildId, GuildSettings>,
}

impl SettingsStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            guilds: HashMap::new(),
        }
    }

    /// Directory holding the per-guild settings files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Replace a guild's in-memory settings (used after load).
    pub fn insert(&mut self, guild_id: GuildId, settings: GuildSettings) {
        self.guilds.insert(guild_id, settings);
    }

    /// Mutable settings for a guild, created empty on first use.
    pub fn guild_mut(&mut self, guild_id: GuildId) -> &mut GuildSettings {
        self.guilds.entry(guild_id).or_default()
    }

    /// Cloned settings for lock-free reads (empty if the guild is unknown).
    pub fn snapshot(&self, guild_id: GuildId) -> GuildSettings {
        self.guilds.get(&guild_id).cloned().unwrap_or_default()
    }
}
