//! Message forwarding.

pub mod plan;

pub use plan::{plan, EmbedView, ForwardPost, MessageView};
