//! Discord bot client setup.
//!
//! Builds the serenity client with the gateway intents the bot needs and
//! seeds the shared state into the type map.

use std::path::PathBuf;
use std::sync::Arc;

use serenity::prelude::*;
use serenity::Client;

use crate::discord::handler::{BotState, WardenHandler};
use crate::guard::NameResolver;
use crate::settings::SettingsStore;

/// Build the Discord client.
///
/// `settings_dir` is where per-guild settings files live; guild settings
/// themselves are loaded as guilds become available.
pub async fn build_client(token: String, settings_dir: PathBuf) -> anyhow::Result<Client> {
    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    let client = Client::builder(&token, intents)
        .event_handler(WardenHandler::new())
        .await?;

    let state = BotState {
        settings: SettingsStore::new(settings_dir),
        resolver: NameResolver::new(),
    };

    {
        let mut data = client.data.write().await;
        data.insert::<BotState>(Arc::new(RwLock::new(state)));
    }

    Ok(client)
}
