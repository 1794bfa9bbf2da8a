//! Mention guard: deletes messages that ping protected usernames.

use serenity::model::id::UserId;

use crate::guard::resolver::{resolve_mentioned, NameMap};
use crate::settings::GuildSettings;

/// Outcome of evaluating one message against the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardVerdict {
    /// Whether the message must be deleted.
    pub delete: bool,
    /// Notice to post in the channel after deletion.
    pub notice: Option<String>,
}

impl GuardVerdict {
    fn pass() -> Self {
        Self {
            delete: false,
            notice: None,
        }
    }
}

/// Decide whether a message mentioning `mentioned` users may stand.
///
/// A mention is forbidden when any username resolving to a mentioned id
/// matches the do-not-mention list case-insensitively. Replies are
/// exempt so users can quote-reply without tripping the guard. The
/// verdict carries a notice naming the author; actually deleting the
/// message (and coping with a failed delete) is the caller's job.
pub fn evaluate(
    author_name: &str,
    mentioned: &[UserId],
    is_reply: bool,
    settings: &GuildSettings,
    name_map: &NameMap,
) -> GuardVerdict {
    if mentioned.is_empty() || is_reply {
        return GuardVerdict::pass();
    }

    let forbidden = resolve_mentioned(name_map, mentioned)
        .iter()
        .any(|username| settings.is_do_not_mention(&username.to_lowercase()));

    if !forbidden {
        return GuardVerdict::pass();
    }

    GuardVerdict {
        delete: true,
        notice: Some(format!(
            "A message from {} was deleted for mentioning a user on the do not mention list.",
            author_name
        )),
    }
}
