//! Per-guild settings data model.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serenity::model::id::ChannelId;

/// Settings for a single guild.
///
/// `do_not_mention_list` and `user_rules` are unrelated namespaces: one
/// guards mentions, the other routes messages. A username may appear in
/// both independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuildSettings {
    /// Lower-cased usernames that must not be mentioned.
    pub do_not_mention_list: Vec<String>,
    /// Forwarding rules keyed by account name (case-sensitive).
    pub user_rules: HashMap<String, UserRule>,
}

/// Forwarding rule for one username.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRule {
    /// Source channels watched for this username's messages.
    ///
    /// Repeated adds are kept as-is; entries are not deduplicated.
    pub monitored_channels: Vec<ChannelId>,
    /// Destination channel for forwarded posts.
    pub target_channel: Option<ChannelId>,
}

impl GuildSettings {
    /// Whether a lower-cased username is on the do-not-mention list.
    pub fn is_do_not_mention(&self, username_lower: &str) -> bool {
        self.do_not_mention_list
            .iter()
            .any(|entry| entry == username_lower)
    }

    /// Add a username to the do-not-mention list.
    ///
    /// The name is lower-cased before insertion. Returns `false` when the
    /// name was already present (the list is left untouched).
    pub fn add_do_not_mention(&mut self, username: &str) -> bool {
        let lower = username.to_lowercase();
        if self.is_do_not_mention(&lower) {
            return false;
        }
        self.do_not_mention_list.push(lower);
        true
    }

    /// Remove a username from the do-not-mention list.
    ///
    /// Returns `false` when the name was not present.
    pub fn remove_do_not_mention(&mut self, username: &str) -> bool {
        let lower = username.to_lowercase();
        match self.do_not_mention_list.iter().position(|e| *e == lower) {
            Some(index) => {
                self.do_not_mention_list.remove(index);
                true
            }
            None => false,
        }
    }

    /// Get the rule for a username, creating an empty one if absent.
    pub fn rule_mut(&mut self, username: &str) -> &mut UserRule {
        self.user_rules.entry(username.to_string()).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_settings() -> GuildSettings {
        let mut settings = GuildSettings::default();
        settings.add_do_not_mention("Alice");
        settings.add_do_not_mention("bob");
        let rule = settings.rule_mut("carol");
        rule.monitored_channels.push(ChannelId::new(100));
        rule.monitored_channels.push(ChannelId::new(200));
        rule.target_channel = Some(ChannelId::new(300));
        settings
    }

    #[test]
    fn test_add_lowercases_and_rejects_duplicates() {
        let mut settings = GuildSettings::default();
        assert!(settings.add_do_not_mention("Alice"));
        assert!(settings.is_do_not_mention("alice"));
        assert!(!settings.add_do_not_mention("ALICE"));
        assert_eq!(settings.do_not_mention_list.len(), 1);
    }

    #[test]
    fn test_add_then_remove_restores_list() {
        let mut settings = sample_settings();
        let before = settings.do_not_mention_list.clone();
        assert!(settings.add_do_not_mention("dave"));
        assert!(settings.remove_do_not_mention("Dave"));
        assert_eq!(settings.do_not_mention_list, before);
    }

    #[test]
    fn test_remove_absent_is_reported() {
        let mut settings = GuildSettings::default();
        assert!(!settings.remove_do_not_mention("ghost"));
    }

    #[test]
    fn test_rule_mut_creates_lazily() {
        let mut settings = GuildSettings::default();
        assert!(settings.user_rules.is_empty());
        settings.rule_mut("carol").target_channel = Some(ChannelId::new(1));
        assert_eq!(settings.user_rules.len(), 1);
    }

    #[test]
    fn test_json_round_trip() {
        let settings = sample_settings();
        let json = serde_json::to_string_pretty(&settings).unwrap();
        let reloaded: GuildSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, reloaded);
    }

    #[test]
    fn test_json_field_names() {
        let settings = sample_settings();
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("doNotMentionList"));
        assert!(json.contains("userRules"));
        assert!(json.contains("monitoredChannels"));
        assert!(json.contains("targetChannel"));
    }

    #[test]
    fn test_missing_fields_default() {
        let settings: GuildSettings = serde_json::from_str("{}").unwrap();
        assert!(settings.do_not_mention_list.is_empty());
        assert!(settings.user_rules.is_empty());

        let rule: UserRule = serde_json::from_str("{}").unwrap();
        assert!(rule.monitored_channels.is_empty());
        assert!(rule.target_channel.is_none());
    }
}
