//! Runtime configuration.

pub mod env;

pub use env::{get_discord_token, get_settings_dir};
