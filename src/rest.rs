// rest.rs

use crate::error::Error;
use crate::services::{MessageTransport, UploadTransport};
use crate::types::{ConversationId, NamedFile, OutgoingMessage, UploadOutcome, UploadedFile};
use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Message posts carrying a nonce and pre-uploaded attachments, plus the
/// cloud attachment upload flow.
pub struct DiscordRest {
    client: Client,
    base_url: String,
    token: String,
}

#[derive(Serialize)]
struct MessagePayload<'a> {
    content: &'a str,
    nonce: &'a str,
    attachments: Vec<AttachmentPayload<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_reference: Option<MessageReferencePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed_mentions: Option<AllowedMentionsPayload>,
}

#[derive(Serialize)]
struct AttachmentPayload<'a> {
    id: &'a str,
    filename: &'a str,
    uploaded_filename: &'a str,
}

#[derive(Serialize)]
struct MessageReferencePayload {
    message_id: String,
    channel_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    guild_id: Option<String>,
    fail_if_not_exists: bool,
}

#[derive(Serialize)]
struct AllowedMentionsPayload {
    parse: [&'static str; 3],
    replied_user: bool,
}

#[derive(Serialize)]
struct UploadSlotRequest<'a> {
    files: [UploadSlotFile<'a>; 1],
}

#[derive(Serialize)]
struct UploadSlotFile<'a> {
    id: &'a str,
    filename: &'a str,
    file_size: usize,
}

#[derive(Deserialize)]
struct UploadSlotResponse {
    attachments: Vec<UploadSlot>,
}

#[derive(Deserialize)]
struct UploadSlot {
    upload_url: String,
    upload_filename: String,
}

impl DiscordRest {
    pub fn new(client: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.token)
    }

    async fn check(response: Response) -> Result<Response, Error> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Upload(format!("HTTP {status}: {body}")))
    }

    async fn request_upload_slot(&self, id: ConversationId, file: &NamedFile) -> Result<UploadSlot, Error> {
        let url = format!("{}/channels/{}/attachments", self.base_url, id);
        let request = UploadSlotRequest {
            files: [UploadSlotFile {
                id: "0",
                filename: &file.name,
                file_size: file.bytes.len(),
            }],
        };

        let response = self.client.post(&url)
            .header(header::AUTHORIZATION, self.authorization())
            .json(&request)
            .send()
            .await?;

        let body = Self::check(response).await?.text().await?;
        let slots: UploadSlotResponse = serde_json::from_str(&body)?;
        slots.attachments
            .into_iter()
            .next()
            .ok_or_else(|| Error::MalformedResponse("no upload slot returned".to_string()))
    }

    async fn transfer(&self, slot: &UploadSlot, file: NamedFile) -> Result<(), Error> {
        let response = self.client.put(&slot.upload_url)
            .header(header::CONTENT_TYPE, file.content_type)
            .body(file.bytes)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

fn message_payload(message: &OutgoingMessage) -> MessagePayload<'_> {
    let reply = message.message_reference.as_ref();

    MessagePayload {
        content: &message.content,
        nonce: &message.nonce,
        attachments: message.attachments
            .iter()
            .map(|a| AttachmentPayload {
                id: &a.id,
                filename: &a.filename,
                uploaded_filename: &a.uploaded_filename,
            })
            .collect(),
        message_reference: reply.map(|r| MessageReferencePayload {
            message_id: r.message_id.to_string(),
            channel_id: r.channel_id.to_string(),
            guild_id: r.guild_id.map(|g| g.to_string()),
            fail_if_not_exists: false,
        }),
        allowed_mentions: reply.map(|r| AllowedMentionsPayload {
            parse: ["users", "roles", "everyone"],
            replied_user: r.mention_author,
        }),
    }
}

#[async_trait]
impl MessageTransport for DiscordRest {
    async fn submit(&self, id: ConversationId, message: &OutgoingMessage) -> Result<(), Error> {
        let url = format!("{}/channels/{}/messages", self.base_url, id);

        let response = self.client.post(&url)
            .header(header::AUTHORIZATION, self.authorization())
            .json(&message_payload(message))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Unknown(format!("message post failed: HTTP {status}: {body}")));
        }

        debug!(channel_id = %id, nonce = %message.nonce, "Message posted");
        Ok(())
    }
}

#[async_trait]
impl UploadTransport for DiscordRest {
    async fn upload(&self, id: ConversationId, file: NamedFile) -> UploadOutcome {
        let filename = file.name.clone();

        let slot = match self.request_upload_slot(id, &file).await {
            Ok(slot) => slot,
            Err(e) => return UploadOutcome::Failed(e.to_string()),
        };

        match self.transfer(&slot, file).await {
            Ok(()) => UploadOutcome::Completed(UploadedFile {
                filename,
                uploaded_filename: slot.upload_filename,
            }),
            Err(e) => UploadOutcome::Failed(e.to_string()),
        }
    }
}
