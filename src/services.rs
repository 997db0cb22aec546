// services.rs

use crate::error::Error;
use crate::types::{
    Capability, Conversation, ConversationId, ImageUrl, NamedFile, Notice, OutgoingMessage,
    PendingReply, UploadOutcome,
};
use async_trait::async_trait;

#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Asks the provider for a fresh random image.
    async fn fetch_random_image_url(&self) -> Result<ImageUrl, Error>;

    /// Downloads the image behind `url` into memory.
    async fn download(&self, url: &ImageUrl) -> Result<Vec<u8>, Error>;
}

#[async_trait]
pub trait ChannelStore: Send + Sync {
    async fn get_conversation(&self, id: ConversationId) -> Result<Conversation, Error>;
}

pub trait PermissionStore: Send + Sync {
    fn can(&self, capability: Capability, conversation: &Conversation) -> Result<bool, Error>;
}

pub trait CooldownStore: Send + Sync {
    /// Milliseconds until `id` accepts another message. Zero means sending is allowed.
    fn estimate_cooldown_ms(&self, id: ConversationId) -> u64;

    fn set_cooldown_ms(&self, id: ConversationId, cooldown_ms: u64);
}

pub trait PendingReplyStore: Send + Sync {
    fn get_pending_reply(&self, id: ConversationId) -> Option<PendingReply>;

    fn clear_pending_reply(&self, id: ConversationId);
}

#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn submit(&self, id: ConversationId, message: &OutgoingMessage) -> Result<(), Error>;
}

#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn upload(&self, id: ConversationId, file: NamedFile) -> UploadOutcome;
}

/// Fire-and-forget user feedback.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: Notice);
}
