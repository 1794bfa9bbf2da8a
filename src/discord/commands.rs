//! Admin text commands (!addmonitor, !settarget, etc).
//!
//! Commands are matched on the first whitespace-delimited token of a
//! message, case-sensitively. Anything unrecognized falls through to the
//! guard-then-forward path.

use serenity::model::channel::Message;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use tracing::{debug, error, info};

use crate::discord::handler::{channel_index, BotState};
use crate::guard::rebuild_map;
use crate::routing;
use crate::settings::save_settings;

/// A parsed admin command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    AddDoNotMention { username: String },
    RemoveDoNotMention { username: String },
    AddMonitor { username: String, channel: String },
    RemoveMonitor { username: String, channel: String },
    SetTarget { username: String, channel: String },
    Status { username: String },
}

const HELP_TEXT: &str = r#"**Bot Commands**
`!help` - Displays this help message.
`!addDoNotMention <username>` - Add a user to the do not mention list.
`!removeDoNotMention <username>` - Remove a user from the do not mention list.
`!addmonitor <username> <channel-name>` - Start monitoring messages in a channel for a user.
`!removemonitor <username> <channel-name>` - Stop monitoring messages in a channel for a user.
`!settarget <username> <channel-name>` - Set the target channel for forwarding a user's messages.
`!status <username>` - Show monitored channels and target channel for a user."#;

/// Parse a message into a command.
///
/// `None` means the message is not a command at all. `Err` carries a
/// usage string for a recognized token with missing arguments.
pub fn parse(content: &str) -> Option<Result<Command, &'static str>> {
    let mut parts = content.split_whitespace();
    let token = parts.next()?;
    let mut arg = || parts.next().map(str::to_string);

    match token {
        "!help" => Some(Ok(Command::Help)),
        "!addDoNotMention" => Some(match arg() {
            Some(username) => Ok(Command::AddDoNotMention { username }),
            None => Err("Usage: !addDoNotMention <username>"),
        }),
        "!removeDoNotMention" => Some(match arg() {
            Some(username) => Ok(Command::RemoveDoNotMention { username }),
            None => Err("Usage: !removeDoNotMention <username>"),
        }),
        "!addmonitor" => Some(match (arg(), arg()) {
            (Some(username), Some(channel)) => Ok(Command::AddMonitor { username, channel }),
            _ => Err("Usage: !addmonitor <username> <channel-name>"),
        }),
        "!removemonitor" => Some(match (arg(), arg()) {
            (Some(username), Some(channel)) => Ok(Command::RemoveMonitor { username, channel }),
            _ => Err("Usage: !removemonitor <username> <channel-name>"),
        }),
        "!settarget" => Some(match (arg(), arg()) {
            (Some(username), Some(channel)) => Ok(Command::SetTarget { username, channel }),
            _ => Err("Usage: !settarget <username> <channel-name>"),
        }),
        "!status" => Some(match arg() {
            Some(username) => Ok(Command::Status { username }),
            None => Err("Usage: !status <username>"),
        }),
        _ => None,
    }
}

/// Executes admin commands against the shared bot state.
pub struct CommandHandler;

impl CommandHandler {
    pub fn new() -> Self {
        Self
    }

    /// Parse and execute a command from a guild message.
    ///
    /// Returns `true` if the message was a command (including a
    /// recognized command with bad arguments), `false` otherwise.
    pub async fn handle_command(
        &self,
        ctx: &Context,
        msg: &Message,
        guild_id: GuildId,
        content: &str,
    ) -> anyhow::Result<bool> {
        let command = match parse(content) {
            None => return Ok(false),
            Some(Err(usage)) => {
                msg.channel_id.say(&ctx.http, usage).await?;
                return Ok(true);
            }
            Some(Ok(command)) => command,
        };

        debug!("Processing command {:?} from {}", command, msg.author.name);

        match command {
            Command::Help => {
                msg.channel_id.say(&ctx.http, HELP_TEXT).await?;
            }
            Command::AddDoNotMention { username } => {
                self.handle_add_do_not_mention(ctx, msg, guild_id, &username)
                    .await?;
            }
            Command::RemoveDoNotMention { username } => {
                self.handle_remove_do_not_mention(ctx, msg, guild_id, &username)
                    .await?;
            }
            Command::AddMonitor { username, channel } => {
                self.handle_add_monitor(ctx, msg, guild_id, &username, &channel)
                    .await?;
            }
            Command::RemoveMonitor { username, channel } => {
                self.handle_remove_monitor(ctx, msg, guild_id, &username, &channel)
                    .await?;
            }
            Command::SetTarget { username, channel } => {
                self.handle_set_target(ctx, msg, guild_id, &username, &channel)
                    .await?;
            }
            Command::Status { username } => {
                self.handle_status(ctx, msg, guild_id, &username).await?;
            }
        }

        Ok(true)
    }

    /// Handle !addDoNotMention.
    async fn handle_add_do_not_mention(
        &self,
        ctx: &Context,
        msg: &Message,
        guild_id: GuildId,
        username: &str,
    ) -> anyhow::Result<()> {
        let state = bot_state(ctx).await?;

        let (added, list) = {
            let mut state = state.write().await;
            let settings = state.settings.guild_mut(guild_id);
            let added = settings.add_do_not_mention(username);
            (added, settings.do_not_mention_list.clone())
        };

        if added {
            info!(
                "Added {} to do-not-mention list for guild {}",
                username, guild_id
            );
            self.rebuild_and_persist(ctx, guild_id, &list).await;
            msg.channel_id
                .say(
                    &ctx.http,
                    format!("{} added to the do not mention list.", username),
                )
                .await?;
        } else {
            msg.channel_id
                .say(
                    &ctx.http,
                    format!("{} is already in the do not mention list.", username),
                )
                .await?;
        }

        self.display_do_not_mention_list(ctx, msg, &list).await
    }

    /// Handle !removeDoNotMention.
    async fn handle_remove_do_not_mention(
        &self,
        ctx: &Context,
        msg: &Message,
        guild_id: GuildId,
        username: &str,
    ) -> anyhow::Result<()> {
        let state = bot_state(ctx).await?;

        let (removed, list) = {
            let mut state = state.write().await;
            let settings = state.settings.guild_mut(guild_id);
            let removed = settings.remove_do_not_mention(username);
            (removed, settings.do_not_mention_list.clone())
        };

        if removed {
            info!(
                "Removed {} from do-not-mention list for guild {}",
                username, guild_id
            );
            self.rebuild_and_persist(ctx, guild_id, &list).await;
            msg.channel_id
                .say(
                    &ctx.http,
                    format!("{} removed from the do not mention list.", username),
                )
                .await?;
        } else {
            msg.channel_id
                .say(
                    &ctx.http,
                    format!("{} is not in the do not mention list.", username),
                )
                .await?;
        }

        self.display_do_not_mention_list(ctx, msg, &list).await
    }

    /// Handle !addmonitor.
    async fn handle_add_monitor(
        &self,
        ctx: &Context,
        msg: &Message,
        guild_id: GuildId,
        username: &str,
        channel: &str,
    ) -> anyhow::Result<()> {
        let index = channel_index(ctx, guild_id);
        let state = bot_state(ctx).await?;

        let result = {
            let mut state = state.write().await;
            routing::add_monitor(state.settings.guild_mut(guild_id), &index, username, channel)
        };

        match result {
            Ok(_) => {
                self.persist(ctx, guild_id).await;
                msg.channel_id
                    .say(
                        &ctx.http,
                        format!("Now monitoring {} for {}.", channel, username),
                    )
                    .await?;
            }
            Err(e) => {
                msg.channel_id.say(&ctx.http, e.to_string()).await?;
            }
        }

        Ok(())
    }

    /// Handle !removemonitor.
    async fn handle_remove_monitor(
        &self,
        ctx: &Context,
        msg: &Message,
        guild_id: GuildId,
        username: &str,
        channel: &str,
    ) -> anyhow::Result<()> {
        let index = channel_index(ctx, guild_id);
        let state = bot_state(ctx).await?;

        let result = {
            let mut state = state.write().await;
            routing::remove_monitor(state.settings.guild_mut(guild_id), &index, username, channel)
        };

        match result {
            Ok(_) => {
                self.persist(ctx, guild_id).await;
                msg.channel_id
                    .say(
                        &ctx.http,
                        format!("Stopped monitoring {} for {}.", channel, username),
                    )
                    .await?;
            }
            Err(e) => {
                msg.channel_id.say(&ctx.http, e.to_string()).await?;
            }
        }

        Ok(())
    }

    /// Handle !settarget.
    async fn handle_set_target(
        &self,
        ctx: &Context,
        msg: &Message,
        guild_id: GuildId,
        username: &str,
        channel: &str,
    ) -> anyhow::Result<()> {
        let index = channel_index(ctx, guild_id);
        let state = bot_state(ctx).await?;

        let result = {
            let mut state = state.write().await;
            routing::set_target(state.settings.guild_mut(guild_id), &index, username, channel)
        };

        match result {
            Ok(_) => {
                self.persist(ctx, guild_id).await;
                msg.channel_id
                    .say(
                        &ctx.http,
                        format!("Target channel for {} set to {}.", username, channel),
                    )
                    .await?;
            }
            Err(e) => {
                msg.channel_id.say(&ctx.http, e.to_string()).await?;
            }
        }

        Ok(())
    }

    /// Handle !status.
    async fn handle_status(
        &self,
        ctx: &Context,
        msg: &Message,
        guild_id: GuildId,
        username: &str,
    ) -> anyhow::Result<()> {
        let index = channel_index(ctx, guild_id);
        let state = bot_state(ctx).await?;

        let report = {
            let state = state.read().await;
            let settings = state.settings.snapshot(guild_id);
            routing::status(&settings, &index, username)
        };

        match report {
            Ok(report) => {
                let monitored = if report.monitored_channels.is_empty() {
                    "None".to_string()
                } else {
                    report.monitored_channels.join(", ")
                };
                let target = report.target_channel.unwrap_or_else(|| "None".to_string());
                msg.channel_id
                    .say(
                        &ctx.http,
                        format!(
                            "**Bot Status for {}**\n**Monitored Channels:** {}\n**Target Channel:** {}",
                            username, monitored, target
                        ),
                    )
                    .await?;
            }
            Err(e) => {
                msg.channel_id.say(&ctx.http, e.to_string()).await?;
            }
        }

        Ok(())
    }

    /// Rebuild the guild's name map from the given list and swap it in,
    /// then persist the mutated settings.
    ///
    /// The member lookups run without any state lock held so concurrent
    /// guard evaluations are never blocked; the finished map replaces the
    /// old one in a short write section (last write wins).
    async fn rebuild_and_persist(&self, ctx: &Context, guild_id: GuildId, list: &[String]) {
        let map = rebuild_map(&ctx.http, guild_id, list).await;

        match bot_state(ctx).await {
            Ok(state) => {
                state.write().await.resolver.replace(guild_id, map);
            }
            Err(e) => error!("Failed to swap in name map for guild {}: {}", guild_id, e),
        }

        self.persist(ctx, guild_id).await;
    }

    /// Write the guild's current settings to disk, logging failures.
    async fn persist(&self, ctx: &Context, guild_id: GuildId) {
        let snapshot = match bot_state(ctx).await {
            Ok(state) => {
                let state = state.read().await;
                Some((state.settings.dir().to_path_buf(), state.settings.snapshot(guild_id)))
            }
            Err(_) => None,
        };

        if let Some((dir, settings)) = snapshot {
            if let Err(e) = save_settings(&dir, guild_id, &settings).await {
                error!("Failed to save settings for guild {}: {}", guild_id, e);
            }
        }
    }

    /// Echo the current do-not-mention list back to the channel.
    async fn display_do_not_mention_list(
        &self,
        ctx: &Context,
        msg: &Message,
        list: &[String],
    ) -> anyhow::Result<()> {
        msg.channel_id
            .say(
                &ctx.http,
                format!("Current do not mention list: {}", list.join(", ")),
            )
            .await?;
        Ok(())
    }
}

/// Fetch the shared bot state out of the serenity type map.
async fn bot_state(
    ctx: &Context,
) -> anyhow::Result<std::sync::Arc<RwLock<BotState>>> {
    let data = ctx.data.read().await;
    data.get::<BotState>()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("bot state not initialized"))
}
