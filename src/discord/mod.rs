//! Discord integration: client, event handling, and admin commands.

pub mod client;
pub mod commands;
pub mod handler;

pub use client::build_client;
pub use handler::{BotState, WardenHandler};
