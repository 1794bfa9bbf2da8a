//! Forward planning.
//!
//! Turns one inbound message plus a guild's routing rules into the list
//! of posts to publish in target channels. Planning is pure: it never
//! touches settings or the network, so the handler can read a settings
//! snapshot, plan, and then send.

use serenity::model::id::{ChannelId, GuildId, MessageId};

use crate::settings::GuildSettings;

/// Hosts whose embeds count as animated GIFs. A message carrying one of
/// these suppresses its redundant text forward.
const GIF_HOSTS: &[&str] = &["tenor.com", "giphy.com"];

/// Everything the planner needs to know about one message.
#[derive(Debug, Clone)]
pub struct MessageView {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    /// Account name, matched against rule keys.
    pub author_name: String,
    /// Guild display name, falling back to the account name.
    pub display_name: String,
    pub content: String,
    pub attachment_urls: Vec<String>,
    pub embeds: Vec<EmbedView>,
}

/// The embed fields the planner cares about.
#[derive(Debug, Clone, Default)]
pub struct EmbedView {
    /// Embed type as reported by the platform ("image", "video", ...).
    pub kind: Option<String>,
    /// The embed's own URL (the linked page).
    pub url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
}

impl MessageView {
    /// Stable permalink identifying guild, channel, and message.
    pub fn permalink(&self) -> String {
        format!(
            "https://discord.com/channels/{}/{}/{}",
            self.guild_id, self.channel_id, self.message_id
        )
    }
}

impl EmbedView {
    /// Whether the embed is image-like or carries video.
    fn is_media(&self) -> bool {
        self.kind.as_deref() == Some("image") || self.video_url.is_some()
    }

    /// Display URL preference: thumbnail, then image, then video.
    fn display_url(&self) -> &str {
        self.thumbnail_url
            .as_deref()
            .or(self.image_url.as_deref())
            .or(self.video_url.as_deref())
            .unwrap_or("")
    }
}

/// One forwarded post, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardPost {
    pub channel_id: ChannelId,
    pub content: String,
}

fn is_gif_host(url: &str) -> bool {
    GIF_HOSTS.iter().any(|host| url.contains(host))
}

/// Plan the forwarded posts for a message.
///
/// For every rule whose key equals the author's account name, with the
/// message's channel monitored and the target channel still existing:
/// each media embed and each attachment becomes its own post, and
/// non-empty text becomes one more post unless a gif-carrying embed
/// already stands in for it.
pub fn plan(
    view: &MessageView,
    settings: &GuildSettings,
    channel_exists: impl Fn(ChannelId) -> bool,
) -> Vec<ForwardPost> {
    let mut posts = Vec::new();

    for (username, rule) in &settings.user_rules {
        if *username != view.author_name {
            continue;
        }
        if !rule.monitored_channels.contains(&view.channel_id) {
            continue;
        }
        let Some(target) = rule.target_channel else {
            continue;
        };
        if !channel_exists(target) {
            continue;
        }

        let link = view.permalink();
        let mut gif = false;

        for embed in view.embeds.iter().filter(|e| e.is_media()) {
            let mut content_url = embed.display_url().to_string();
            if let Some(url) = embed.url.as_deref() {
                if is_gif_host(url) {
                    content_url = url.to_string();
                    gif = true;
                }
            }
            posts.push(ForwardPost {
                channel_id: target,
                content: format!(
                    "[Message from {}:]({}) {}",
                    view.display_name, link, content_url
                ),
            });
        }

        for attachment_url in &view.attachment_urls {
            posts.push(ForwardPost {
                channel_id: target,
                content: format!(
                    "[\"Attachment from {}:\"]({}) {}",
                    view.display_name, link, attachment_url
                ),
            });
        }

        if !view.content.is_empty() && !gif {
            posts.push(ForwardPost {
                channel_id: target,
                content: format!(
                    "[Message from {}:]({}) \"{}\"",
                    view.display_name, link, view.content
                ),
            });
        }
    }

    posts
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: u64 = 100;
    const TARGET: u64 = 200;

    fn alice_view(content: &str) -> MessageView {
        MessageView {
            guild_id: GuildId::new(1),
            channel_id: ChannelId::new(SOURCE),
            message_id: MessageId::new(5555),
            author_name: "alice".to_string(),
            display_name: "Alice the Brave".to_string(),
            content: content.to_string(),
            attachment_urls: Vec::new(),
            embeds: Vec::new(),
        }
    }

    fn alice_settings() -> GuildSettings {
        let mut settings = GuildSettings::default();
        let rule = settings.rule_mut("alice");
        rule.monitored_channels.push(ChannelId::new(SOURCE));
        rule.target_channel = Some(ChannelId::new(TARGET));
        settings
    }

    fn gif_embed() -> EmbedView {
        EmbedView {
            kind: Some("image".to_string()),
            url: Some("https://tenor.com/view/wave-123".to_string()),
            thumbnail_url: Some("https://media.tenor.com/thumb.gif".to_string()),
            ..EmbedView::default()
        }
    }

    #[test]
    fn test_text_only_message_forwards_once() {
        let posts = plan(&alice_view("hello"), &alice_settings(), |_| true);

        assert_eq!(posts.len(), 1);
        let post = &posts[0];
        assert_eq!(post.channel_id, ChannelId::new(TARGET));
        assert_eq!(
            post.content,
            "[Message from Alice the Brave:](https://discord.com/channels/1/100/5555) \"hello\""
        );
    }

    #[test]
    fn test_attachments_do_not_suppress_text() {
        let mut view = alice_view("hello");
        view.attachment_urls = vec![
            "https://cdn.example/a.png".to_string(),
            "https://cdn.example/b.png".to_string(),
        ];

        let posts = plan(&view, &alice_settings(), |_| true);

        // One post per attachment plus the text post.
        assert_eq!(posts.len(), 3);
        assert!(posts[0]
            .content
            .starts_with("[\"Attachment from Alice the Brave:\"]"));
        assert!(posts[0].content.ends_with("https://cdn.example/a.png"));
        assert!(posts[1].content.ends_with("https://cdn.example/b.png"));
        assert!(posts[2].content.ends_with("\"hello\""));
    }

    #[test]
    fn test_gif_embed_suppresses_text() {
        let mut view = alice_view("look at this");
        view.embeds = vec![gif_embed()];
        view.attachment_urls = vec!["https://cdn.example/a.png".to_string()];

        let posts = plan(&view, &alice_settings(), |_| true);

        // The embed post carries the gif page URL, not the thumbnail.
        assert_eq!(posts.len(), 2);
        assert!(posts[0]
            .content
            .ends_with("https://tenor.com/view/wave-123"));
        assert!(posts
            .iter()
            .all(|post| !post.content.contains("look at this")));
    }

    #[test]
    fn test_embed_url_preference_order() {
        let embed = EmbedView {
            kind: Some("image".to_string()),
            image_url: Some("https://img.example/full.png".to_string()),
            video_url: Some("https://img.example/clip.mp4".to_string()),
            ..EmbedView::default()
        };
        assert_eq!(embed.display_url(), "https://img.example/full.png");

        let video_only = EmbedView {
            video_url: Some("https://img.example/clip.mp4".to_string()),
            ..EmbedView::default()
        };
        assert!(video_only.is_media());
        assert_eq!(video_only.display_url(), "https://img.example/clip.mp4");
    }

    #[test]
    fn test_non_media_embed_is_skipped() {
        let mut view = alice_view("an article");
        view.embeds = vec![EmbedView {
            kind: Some("link".to_string()),
            url: Some("https://blog.example/post".to_string()),
            ..EmbedView::default()
        }];

        let posts = plan(&view, &alice_settings(), |_| true);
        assert_eq!(posts.len(), 1);
        assert!(posts[0].content.ends_with("\"an article\""));
    }

    #[test]
    fn test_unmonitored_channel_does_not_forward() {
        let mut view = alice_view("hello");
        view.channel_id = ChannelId::new(999);
        assert!(plan(&view, &alice_settings(), |_| true).is_empty());
    }

    #[test]
    fn test_other_author_does_not_forward() {
        let mut view = alice_view("hello");
        view.author_name = "bob".to_string();
        assert!(plan(&view, &alice_settings(), |_| true).is_empty());
    }

    #[test]
    fn test_missing_target_does_not_forward() {
        let mut settings = alice_settings();
        settings.rule_mut("alice").target_channel = None;
        assert!(plan(&alice_view("hello"), &settings, |_| true).is_empty());
    }

    #[test]
    fn test_vanished_target_does_not_forward() {
        assert!(plan(&alice_view("hello"), &alice_settings(), |_| false).is_empty());
    }

    #[test]
    fn test_empty_text_produces_no_text_post() {
        let mut view = alice_view("");
        view.attachment_urls = vec!["https://cdn.example/a.png".to_string()];

        let posts = plan(&view, &alice_settings(), |_| true);
        assert_eq!(posts.len(), 1);
    }
}
