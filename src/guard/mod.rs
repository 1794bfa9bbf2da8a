//! Mention guarding: name resolution and message evaluation.

pub mod mention;
pub mod resolver;

pub use mention::{evaluate, GuardVerdict};
pub use resolver::{rebuild_map, resolve_mentioned, NameMap, NameResolver};
