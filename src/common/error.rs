//! Error types for the application.

use thiserror::Error;

/// Errors produced by routing-table commands.
///
/// The `Display` text of each variant is what gets sent back to the
/// originating channel as a plain-text reply.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoutingError {
    #[error("Channel {name} not found.")]
    ChannelNotFound { name: String },

    #[error("Channel {channel} not being monitored for {username}.")]
    NotMonitored { username: String, channel: String },

    #[error("No settings found for {username}.")]
    NoSettings { username: String },
}

/// Settings persistence errors.
///
/// Load failures are recovered locally (the guild starts with empty
/// settings) and never reach chat.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize settings for '{path}': {source}")]
    Serialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write settings file '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for routing operations.
pub type RoutingResult<T> = std::result::Result<T, RoutingError>;

/// Result type alias for settings operations.
pub type SettingsResult<T> = std::result::Result<T, SettingsError>;
