// discord.rs
use crate::error::Error;
use crate::services::{ChannelStore, PermissionStore};
use crate::types::{Caller, Capability, Conversation, ConversationId};
use async_trait::async_trait;
use poise::serenity_prelude::{Cache, Channel, ChannelId, GuildId, Http, Permissions};
use std::sync::Arc;

/// Channel and permission lookups served from serenity's HTTP client and cache.
pub struct SerenityHost {
    http: Arc<Http>,
    cache: Arc<Cache>,
}

impl SerenityHost {
    pub fn new(http: Arc<Http>, cache: Arc<Cache>) -> Self {
        Self { http, cache }
    }
}

pub fn required_permission(capability: Capability) -> Permissions {
    match capability {
        Capability::EmbedLinks => Permissions::EMBED_LINKS,
        Capability::AttachFiles => Permissions::ATTACH_FILES,
    }
}

/// Resolved channel permissions of the member behind an interaction.
/// Interactions outside guilds carry none.
pub fn caller_from(permissions: Option<Permissions>) -> Caller {
    match permissions {
        Some(permissions) => Caller {
            embed_links: permissions.contains(required_permission(Capability::EmbedLinks)),
            attach_files: permissions.contains(required_permission(Capability::AttachFiles)),
        },
        None => Caller::unrestricted(),
    }
}

#[async_trait]
impl ChannelStore for SerenityHost {
    async fn get_conversation(&self, id: ConversationId) -> Result<Conversation, Error> {
        let channel = self.http.get_channel(ChannelId::new(id.get())).await?;

        Ok(match channel {
            Channel::Guild(channel) => Conversation {
                id,
                guild_id: Some(channel.guild_id.get()),
                rate_limit_per_user: channel.rate_limit_per_user.map_or(0, |r| u64::from(r)),
            },
            _ => Conversation {
                id,
                guild_id: None,
                rate_limit_per_user: 0,
            },
        })
    }
}

impl PermissionStore for SerenityHost {
    fn can(&self, capability: Capability, conversation: &Conversation) -> Result<bool, Error> {
        let Some(guild_id) = conversation.guild_id else {
            return Ok(true);
        };

        let bot_id = self.cache.current_user().id;
        let guild = self.cache.guild(GuildId::new(guild_id))
            .ok_or_else(|| Error::Unknown(format!("Guild {} is not cached", guild_id)))?;
        let channel_id = ChannelId::new(conversation.id.get());
        // Threads inherit the permissions of their parent channel.
        let channel = guild.channels.get(&channel_id)
            .or_else(|| {
                guild.threads.iter()
                    .find(|thread| thread.id == channel_id)
                    .and_then(|thread| thread.parent_id)
                    .and_then(|parent| guild.channels.get(&parent))
            })
            .ok_or_else(|| Error::Unknown(format!("Channel {} is not cached", conversation.id)))?;
        let member = guild.members.get(&bot_id)
            .ok_or_else(|| Error::Unknown("Bot member is not cached".to_string()))?;

        let permissions = guild.user_permissions_in(channel, member);
        Ok(permissions.contains(required_permission(capability)))
    }
}
