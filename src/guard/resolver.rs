//! Username to user-id resolution.
//!
//! Maintains a volatile per-guild map from lower-cased username to user
//! id, derived from the guild member directory. The map only covers
//! usernames currently on the do-not-mention list and is rebuilt
//! wholesale on every list change; it is a disposable cache and lookups
//! against it may be partial.

use std::collections::HashMap;

use serenity::http::Http;
use serenity::model::id::{GuildId, UserId};
use tracing::{error, info, warn};

/// Lower-cased username -> user id, for one guild.
pub type NameMap = HashMap<String, UserId>;

/// Per-guild name maps. Never persisted.
#[derive(Debug, Default)]
pub struct NameResolver {
    maps: HashMap<GuildId, NameMap>,
}

impl NameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cloned map for lock-free evaluation (empty if none built yet).
    pub fn snapshot(&self, guild_id: GuildId) -> NameMap {
        self.maps.get(&guild_id).cloned().unwrap_or_default()
    }

    /// Replace a guild's map with a freshly built one.
    ///
    /// Full replacement, never an incremental patch, so entries for
    /// removed usernames cannot linger. Last write wins.
    pub fn replace(&mut self, guild_id: GuildId, map: NameMap) {
        info!(
            "Name map for guild {} rebuilt with {} entries",
            guild_id,
            map.len()
        );
        self.maps.insert(guild_id, map);
    }
}

/// Build a fresh name map by looking up each listed username in the
/// guild member directory.
///
/// One search per username, capped at a single match. A miss or a failed
/// lookup is logged and the entry omitted; the map may come back
/// incomplete. Runs without any state lock held so concurrent guard
/// evaluations are never serialized behind it.
pub async fn rebuild_map(http: &Http, guild_id: GuildId, usernames: &[String]) -> NameMap {
    let mut map = NameMap::new();

    for username in usernames {
        match guild_id.search_members(http, username, Some(1)).await {
            Ok(members) => match members.first() {
                Some(member) => {
                    map.insert(username.clone(), member.user.id);
                }
                None => {
                    warn!("User not found: {}", username);
                }
            },
            Err(e) => {
                error!("Error fetching user {}: {}", username, e);
            }
        }
    }

    map
}

/// Every username in the map whose stored id equals one of the mentioned
/// ids.
///
/// A single id can map from multiple distinct spellings when directory
/// lookups were ambiguous; all of them are returned.
pub fn resolve_mentioned(map: &NameMap, mentioned: &[UserId]) -> Vec<String> {
    map.iter()
        .filter(|(_, id)| mentioned.contains(id))
        .map(|(username, _)| username.clone())
        .collect()
}
