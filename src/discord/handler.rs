//! Discord message event handling.
//!
//! Routes each inbound guild message through command dispatch, then the
//! mention guard, then the forwarder. State lives in serenity's type map
//! so every event handler invocation sees the same registry.

use std::sync::Arc;

use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::guild::Guild;
use serenity::model::id::{GuildId, UserId};
use serenity::prelude::*;
use tracing::{debug, error, info};

use crate::discord::commands::CommandHandler;
use crate::forward::{plan, EmbedView, MessageView};
use crate::guard;
use crate::guard::NameResolver;
use crate::routing::ChannelIndex;
use crate::settings::{load_settings, SettingsStore};

/// Process-wide bot state: settings registry plus name resolver.
///
/// Mutated only by command handlers and guild loads; the forwarder reads
/// snapshots and never writes back.
pub struct BotState {
    pub settings: SettingsStore,
    pub resolver: NameResolver,
}

impl TypeMapKey for BotState {
    type Value = Arc<RwLock<BotState>>;
}

/// Discord event handler.
pub struct WardenHandler {
    command_handler: CommandHandler,
}

impl WardenHandler {
    pub fn new() -> Self {
        Self {
            command_handler: CommandHandler::new(),
        }
    }
}

/// Snapshot the guild's channel directory out of the cache.
///
/// Taken before any suspension point so no cache guard is held across
/// awaits.
pub fn channel_index(ctx: &Context, guild_id: GuildId) -> ChannelIndex {
    let pairs = ctx
        .cache
        .guild(guild_id)
        .map(|guild| {
            guild
                .channels
                .values()
                .map(|channel| (channel.id, channel.name.clone()))
                .collect()
        })
        .unwrap_or_default();
    ChannelIndex::from_pairs(pairs)
}

/// Project a serenity message into the planner's view of it.
fn build_view(msg: &Message, guild_id: GuildId) -> MessageView {
    let display_name = msg
        .member
        .as_ref()
        .and_then(|member| member.nick.clone())
        .unwrap_or_else(|| msg.author.name.clone());

    MessageView {
        guild_id,
        channel_id: msg.channel_id,
        message_id: msg.id,
        author_name: msg.author.name.clone(),
        display_name,
        content: msg.content.clone(),
        attachment_urls: msg
            .attachments
            .iter()
            .map(|attachment| attachment.url.clone())
            .collect(),
        embeds: msg
            .embeds
            .iter()
            .map(|embed| EmbedView {
                kind: embed.kind.clone(),
                url: embed.url.clone(),
                thumbnail_url: embed.thumbnail.as_ref().map(|t| t.url.clone()),
                image_url: embed.image.as_ref().map(|i| i.url.clone()),
                video_url: embed.video.as_ref().map(|v| v.url.clone()),
            })
            .collect(),
    }
}

#[async_trait]
impl EventHandler for WardenHandler {
    async fn message(&self, ctx: Context, msg: Message) {
        // Ignore bots, including ourselves.
        if msg.author.bot {
            return;
        }
        if msg.author.id == ctx.cache.current_user().id {
            return;
        }

        // Only guild messages are guarded or forwarded.
        let Some(guild_id) = msg.guild_id else {
            return;
        };

        // Recognized commands short-circuit everything else.
        match self
            .command_handler
            .handle_command(&ctx, &msg, guild_id, &msg.content)
            .await
        {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => {
                error!("Command handler error: {}", e);
                return;
            }
        }

        // Snapshot state for lock-free evaluation. A rebuild racing this
        // read may leave us on the previous map; that window is accepted.
        let (settings, name_map) = {
            let data = ctx.data.read().await;
            let Some(state) = data.get::<BotState>() else {
                return;
            };
            let state = state.read().await;
            (
                state.settings.snapshot(guild_id),
                state.resolver.snapshot(guild_id),
            )
        };

        // Mention guard runs before forwarding.
        let mentioned: Vec<UserId> = msg.mentions.iter().map(|user| user.id).collect();
        let verdict = guard::evaluate(
            &msg.author.name,
            &mentioned,
            msg.message_reference.is_some(),
            &settings,
            &name_map,
        );

        if verdict.delete {
            if let Err(e) = msg.delete(&ctx.http).await {
                error!(
                    "Failed to delete message {} in guild {}: {}",
                    msg.id, guild_id, e
                );
                return;
            }
            info!(
                "Deleted message from {} in guild {} for a forbidden mention",
                msg.author.name, guild_id
            );
            if let Some(notice) = verdict.notice {
                if let Err(e) = msg.channel_id.say(&ctx.http, notice).await {
                    error!("Failed to send deletion notice: {}", e);
                }
            }
            return;
        }

        // Forward per routing rules.
        let index = channel_index(&ctx, guild_id);
        let view = build_view(&msg, guild_id);
        let posts = plan(&view, &settings, |id| index.contains(id));

        if posts.is_empty() {
            debug!(
                "No forwarding rule matched message from {} in guild {}",
                msg.author.name, guild_id
            );
            return;
        }

        for post in posts {
            match post.channel_id.say(&ctx.http, &post.content).await {
                Ok(_) => {
                    info!(
                        "Forwarded message from {} to channel {}",
                        view.display_name, post.channel_id
                    );
                }
                Err(e) => {
                    error!(
                        "Failed to forward message to channel {}: {}",
                        post.channel_id, e
                    );
                }
            }
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("Discord bot connected as {}", ready.user.name);
    }

    async fn guild_create(&self, ctx: Context, guild: Guild, _is_new: Option<bool>) {
        info!(
            "Received guild data for '{}' ({} channels)",
            guild.name,
            guild.channels.len()
        );

        let state = {
            let data = ctx.data.read().await;
            data.get::<BotState>().cloned()
        };
        let Some(state) = state else {
            return;
        };

        let dir = state.read().await.settings.dir().to_path_buf();
        let settings = load_settings(&dir, guild.id).await;
        let list = settings.do_not_mention_list.clone();
        state.write().await.settings.insert(guild.id, settings);

        // Prime the name map from the persisted list so the guard works
        // immediately after a restart.
        if !list.is_empty() {
            let map = guard::rebuild_map(&ctx.http, guild.id, &list).await;
            state.write().await.resolver.replace(guild.id, map);
        }
    }
}
