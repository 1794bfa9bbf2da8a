//! Routing-table mutations and status reads.
//!
//! Channel names arrive as plain text from commands and are resolved
//! against a snapshot of the guild channel directory. Mutations operate
//! on in-memory settings; the caller persists after a successful change.

use serenity::model::id::ChannelId;

use crate::common::error::{RoutingError, RoutingResult};
use crate::settings::GuildSettings;

/// Snapshot of a guild's channel directory: (id, name) pairs.
///
/// Built from the cache before evaluating a command so no cache guard is
/// held across suspension points.
#[derive(Debug, Clone, Default)]
pub struct ChannelIndex {
    entries: Vec<(ChannelId, String)>,
}

impl ChannelIndex {
    pub fn from_pairs(entries: Vec<(ChannelId, String)>) -> Self {
        Self { entries }
    }

    /// Resolve a channel name to its id. Exact match, first hit.
    pub fn resolve(&self, name: &str) -> Option<ChannelId> {
        self.entries
            .iter()
            .find(|(_, channel_name)| channel_name == name)
            .map(|(id, _)| *id)
    }

    /// Name of a channel id, if the channel still exists.
    pub fn name_of(&self, id: ChannelId) -> Option<&str> {
        self.entries
            .iter()
            .find(|(channel_id, _)| *channel_id == id)
            .map(|(_, name)| name.as_str())
    }

    /// Whether the channel id exists in the directory.
    pub fn contains(&self, id: ChannelId) -> bool {
        self.entries.iter().any(|(channel_id, _)| *channel_id == id)
    }
}

/// Start monitoring a channel for a username.
///
/// Creates the rule lazily. Repeated adds for the same channel are kept
/// as-is; the list is not deduplicated.
pub fn add_monitor(
    settings: &mut GuildSettings,
    index: &ChannelIndex,
    username: &str,
    channel_name: &str,
) -> RoutingResult<ChannelId> {
    let channel_id = index
        .resolve(channel_name)
        .ok_or_else(|| RoutingError::ChannelNotFound {
            name: channel_name.to_string(),
        })?;

    settings.rule_mut(username).monitored_channels.push(channel_id);
    Ok(channel_id)
}

/// Stop monitoring a channel for a username.
///
/// Removes the first matching entry only, so duplicate adds unwind one
/// at a time.
pub fn remove_monitor(
    settings: &mut GuildSettings,
    index: &ChannelIndex,
    username: &str,
    channel_name: &str,
) -> RoutingResult<ChannelId> {
    let channel_id = index
        .resolve(channel_name)
        .ok_or_else(|| RoutingError::ChannelNotFound {
            name: channel_name.to_string(),
        })?;

    let not_monitored = || RoutingError::NotMonitored {
        username: username.to_string(),
        channel: channel_name.to_string(),
    };

    let rule = settings
        .user_rules
        .get_mut(username)
        .ok_or_else(not_monitored)?;
    let position = rule
        .monitored_channels
        .iter()
        .position(|id| *id == channel_id)
        .ok_or_else(not_monitored)?;

    rule.monitored_channels.remove(position);
    Ok(channel_id)
}

/// Set or replace the forwarding target channel for a username.
pub fn set_target(
    settings: &mut GuildSettings,
    index: &ChannelIndex,
    username: &str,
    channel_name: &str,
) -> RoutingResult<ChannelId> {
    let channel_id = index
        .resolve(channel_name)
        .ok_or_else(|| RoutingError::ChannelNotFound {
            name: channel_name.to_string(),
        })?;

    settings.rule_mut(username).target_channel = Some(channel_id);
    Ok(channel_id)
}

/// Display form of a username's rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleStatus {
    pub monitored_channels: Vec<String>,
    pub target_channel: Option<String>,
}

/// Read a username's rule back as channel names.
///
/// Channels that no longer resolve are shown by raw id.
pub fn status(
    settings: &GuildSettings,
    index: &ChannelIndex,
    username: &str,
) -> RoutingResult<RuleStatus> {
    let rule = settings
        .user_rules
        .get(username)
        .ok_or_else(|| RoutingError::NoSettings {
            username: username.to_string(),
        })?;

    let monitored_channels = rule
        .monitored_channels
        .iter()
        .map(|id| {
            index
                .name_of(*id)
                .map(str::to_string)
                .unwrap_or_else(|| id.to_string())
        })
        .collect();
    let target_channel = rule.target_channel.map(|id| {
        index
            .name_of(id)
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string())
    });

    Ok(RuleStatus {
        monitored_channels,
        target_channel,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_index() -> ChannelIndex {
        ChannelIndex::from_pairs(vec![
            (ChannelId::new(100), "general".to_string()),
            (ChannelId::new(200), "log".to_string()),
        ])
    }

    #[test]
    fn test_resolve_is_exact_match() {
        let index = test_index();
        assert_eq!(index.resolve("general"), Some(ChannelId::new(100)));
        assert_eq!(index.resolve("General"), None);
        assert_eq!(index.resolve("gener"), None);
    }

    #[test]
    fn test_add_monitor_unknown_channel() {
        let mut settings = GuildSettings::default();
        let err = add_monitor(&mut settings, &test_index(), "alice", "nope").unwrap_err();
        assert_eq!(
            err,
            RoutingError::ChannelNotFound {
                name: "nope".to_string()
            }
        );
        assert!(settings.user_rules.is_empty());
    }

    #[test]
    fn test_add_remove_sequence_nets_out() {
        let mut settings = GuildSettings::default();
        let index = test_index();

        add_monitor(&mut settings, &index, "alice", "general").unwrap();
        add_monitor(&mut settings, &index, "alice", "log").unwrap();
        remove_monitor(&mut settings, &index, "alice", "general").unwrap();

        let rule = &settings.user_rules["alice"];
        assert_eq!(rule.monitored_channels, vec![ChannelId::new(200)]);
    }

    #[test]
    fn test_duplicate_adds_are_preserved() {
        let mut settings = GuildSettings::default();
        let index = test_index();

        add_monitor(&mut settings, &index, "alice", "general").unwrap();
        add_monitor(&mut settings, &index, "alice", "general").unwrap();

        let rule = &settings.user_rules["alice"];
        assert_eq!(rule.monitored_channels.len(), 2);

        // Removal unwinds one duplicate at a time.
        remove_monitor(&mut settings, &index, "alice", "general").unwrap();
        assert_eq!(settings.user_rules["alice"].monitored_channels.len(), 1);
    }

    #[test]
    fn test_remove_absent_reports_not_monitored() {
        let mut settings = GuildSettings::default();
        let index = test_index();

        let err = remove_monitor(&mut settings, &index, "alice", "general").unwrap_err();
        assert_eq!(
            err,
            RoutingError::NotMonitored {
                username: "alice".to_string(),
                channel: "general".to_string()
            }
        );

        // Same when the rule exists but the channel entry does not.
        add_monitor(&mut settings, &index, "alice", "log").unwrap();
        let err = remove_monitor(&mut settings, &index, "alice", "general").unwrap_err();
        assert!(matches!(err, RoutingError::NotMonitored { .. }));
    }

    #[test]
    fn test_set_target_overwrites() {
        let mut settings = GuildSettings::default();
        let index = test_index();

        set_target(&mut settings, &index, "alice", "general").unwrap();
        set_target(&mut settings, &index, "alice", "log").unwrap();

        assert_eq!(
            settings.user_rules["alice"].target_channel,
            Some(ChannelId::new(200))
        );
    }

    #[test]
    fn test_status_resolves_names() {
        let mut settings = GuildSettings::default();
        let index = test_index();

        add_monitor(&mut settings, &index, "alice", "general").unwrap();
        set_target(&mut settings, &index, "alice", "log").unwrap();

        let report = status(&settings, &index, "alice").unwrap();
        assert_eq!(report.monitored_channels, vec!["general".to_string()]);
        assert_eq!(report.target_channel, Some("log".to_string()));
    }

    #[test]
    fn test_status_unknown_user() {
        let settings = GuildSettings::default();
        let err = status(&settings, &test_index(), "ghost").unwrap_err();
        assert_eq!(
            err,
            RoutingError::NoSettings {
                username: "ghost".to_string()
            }
        );
    }

    #[test]
    fn test_status_falls_back_to_raw_id() {
        let mut settings = GuildSettings::default();
        settings
            .rule_mut("alice")
            .monitored_channels
            .push(ChannelId::new(999));

        let report = status(&settings, &test_index(), "alice").unwrap();
        assert_eq!(report.monitored_channels, vec!["999".to_string()]);
    }
}
