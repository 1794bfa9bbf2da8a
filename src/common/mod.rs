//! Common utilities and types shared across the application.

pub mod error;

pub use error::{RoutingError, RoutingResult, SettingsError, SettingsResult};
