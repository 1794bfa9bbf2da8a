//! Per-user channel routing rules.

pub mod table;

pub use table::{add_monitor, remove_monitor, set_target, status, ChannelIndex, RuleStatus};
