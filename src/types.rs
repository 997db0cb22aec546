// src/types.rs
use crate::utils::nonce_now;
use poise::serenity_prelude::ChannelId;
use serde::Deserialize;
use std::fmt;

pub const UPLOAD_FILENAME: &str = "goose.jpg";
pub const UPLOAD_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationId(pub u64);

impl ConversationId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<ChannelId> for ConversationId {
    fn from(id: ChannelId) -> Self {
        Self(id.get())
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the coordinator needs to know about a destination channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: ConversationId,
    pub guild_id: Option<u64>,
    /// Slowmode interval in seconds, 0 when disabled.
    pub rate_limit_per_user: u64,
}

impl Conversation {
    pub fn guild_present(&self) -> bool {
        self.guild_id.is_some()
    }

    pub fn cooldown_ms(&self) -> u64 {
        self.rate_limit_per_user * 1000
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    pub message_id: u64,
    pub channel_id: u64,
    pub guild_id: Option<u64>,
    pub mention_author: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrl(String);

impl ImageUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ImageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    pub id: String,
    pub filename: String,
    pub uploaded_filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub content: String,
    pub nonce: String,
    pub attachments: Vec<AttachmentRef>,
    pub message_reference: Option<PendingReply>,
}

impl OutgoingMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            nonce: nonce_now(),
            attachments: Vec::new(),
            message_reference: None,
        }
    }

    pub fn link(url: ImageUrl, reply: Option<PendingReply>) -> Self {
        Self {
            message_reference: reply,
            ..Self::text(url.into_string())
        }
    }

    pub fn attachment(file: UploadedFile, reply: Option<PendingReply>) -> Self {
        Self {
            attachments: vec![AttachmentRef {
                id: "0".to_string(),
                filename: file.filename,
                uploaded_filename: file.uploaded_filename,
            }],
            message_reference: reply,
            ..Self::text("")
        }
    }
}

/// A file the upload transport has finished transferring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub uploaded_filename: String,
}

#[derive(Debug, Clone)]
pub struct NamedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl NamedFile {
    pub fn goose_jpeg(bytes: Vec<u8>) -> Self {
        Self {
            name: UPLOAD_FILENAME.to_string(),
            content_type: UPLOAD_CONTENT_TYPE.to_string(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Completed(UploadedFile),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    EmbedLinks,
    AttachFiles,
}

impl Capability {
    pub fn denial_notice(self) -> &'static str {
        match self {
            Capability::EmbedLinks => "Missing required permissions to embed links",
            Capability::AttachFiles => "Missing required permissions to upload files",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::EmbedLinks => f.write_str("EMBED_LINKS"),
            Capability::AttachFiles => f.write_str("ATTACH_FILES"),
        }
    }
}

/// Capabilities the member who triggered a send holds in the target channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub embed_links: bool,
    pub attach_files: bool,
}

impl Caller {
    /// A caller whose permissions are not known (direct messages).
    pub fn unrestricted() -> Self {
        Self { embed_links: true, attach_files: true }
    }

    pub fn allows(self, capability: Capability) -> bool {
        match capability {
            Capability::EmbedLinks => self.embed_links,
            Capability::AttachFiles => self.attach_files,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Message,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

impl Notice {
    pub fn message(text: impl Into<String>) -> Self {
        Self { severity: Severity::Message, text: text.into() }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self { severity: Severity::Failure, text: text.into() }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendMode {
    #[default]
    Link,
    Attachment,
}

impl SendMode {
    pub fn other(self) -> Self {
        match self {
            SendMode::Link => SendMode::Attachment,
            SendMode::Attachment => SendMode::Link,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SendMode::Link => "link",
            SendMode::Attachment => "attachment",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "link" => Some(SendMode::Link),
            "attachment" => Some(SendMode::Attachment),
            _ => None,
        }
    }
}

/// Terminal state of one send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Blocked,
    Denied,
    Complete,
    Failed,
}
