// coordinator.rs
use crate::error::Error;
use crate::services::{
    ChannelStore, CooldownStore, ImageProvider, MessageTransport, Notifier, PendingReplyStore,
    PermissionStore, UploadTransport,
};
use crate::types::{
    Caller, Capability, Conversation, ConversationId, ImageUrl, NamedFile, Notice, OutgoingMessage,
    PendingReply, SendMode, SendOutcome, UploadOutcome,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const FETCH_FAILED_NOTICE: &str = "Failed to fetch a Goose image";
pub const LINK_FAILED_NOTICE: &str = "Failed to send Goose image";
pub const UPLOAD_FAILED_NOTICE: &str = "Failed to upload Goose image";
pub const UPLOADING_NOTICE: &str = "Uploading image, this may take a few seconds.";
pub const UPLOAD_FALLBACK_MESSAGE: &str = "Failed to upload Goose image :(";

/// Host services the coordinator is wired to.
pub struct Collaborators {
    pub images: Arc<dyn ImageProvider>,
    pub channels: Arc<dyn ChannelStore>,
    pub permissions: Arc<dyn PermissionStore>,
    pub cooldowns: Arc<dyn CooldownStore>,
    pub replies: Arc<dyn PendingReplyStore>,
    pub messages: Arc<dyn MessageTransport>,
    pub uploads: Arc<dyn UploadTransport>,
}

/// Decides whether an image may be posted into a channel and posts it,
/// either as a link or as an uploaded attachment.
///
/// Every attempt is independent. Nothing here returns an error: failures
/// end up as a [`SendOutcome`] plus whatever notices were emitted.
pub struct ImagePostCoordinator {
    images: Arc<dyn ImageProvider>,
    channels: Arc<dyn ChannelStore>,
    permissions: Arc<dyn PermissionStore>,
    cooldowns: Arc<dyn CooldownStore>,
    replies: Arc<dyn PendingReplyStore>,
    messages: Arc<dyn MessageTransport>,
    uploads: Arc<dyn UploadTransport>,
}

impl ImagePostCoordinator {
    pub fn new(collaborators: Collaborators) -> Self {
        let Collaborators { images, channels, permissions, cooldowns, replies, messages, uploads } = collaborators;
        Self { images, channels, permissions, cooldowns, replies, messages, uploads }
    }

    /// Fetches a fresh image and sends it with `mode`.
    pub async fn post_random_image(
        &self,
        mode: SendMode,
        caller: Caller,
        notifier: &dyn Notifier,
        conversation: ConversationId,
    ) -> SendOutcome {
        let url = match self.images.fetch_random_image_url().await {
            Ok(url) => url,
            Err(e) => {
                error!(channel_id = %conversation, error = %e, "Failed to fetch Goose image url");
                notifier.notify(Notice::failure(FETCH_FAILED_NOTICE)).await;
                return SendOutcome::Failed;
            }
        };

        match mode {
            SendMode::Link => self.send_as_link(notifier, caller, conversation, url).await,
            SendMode::Attachment => self.send_as_upload(notifier, caller, url, conversation).await,
        }
    }

    pub async fn send_as_link(
        &self,
        notifier: &dyn Notifier,
        caller: Caller,
        conversation: ConversationId,
        url: ImageUrl,
    ) -> SendOutcome {
        let reply = self.consume_pending_reply(conversation);

        match self.try_send_link(conversation, caller, url, reply).await {
            Ok(outcome) => outcome,
            Err(Error::PermissionDenied(capability)) => {
                info!(channel_id = %conversation, %capability, "Goose link denied");
                notifier.notify(Notice::failure(capability.denial_notice())).await;
                SendOutcome::Denied
            }
            Err(e) => {
                error!(channel_id = %conversation, error = %e, "Failed to send Goose link");
                notifier.notify(Notice::failure(LINK_FAILED_NOTICE)).await;
                SendOutcome::Failed
            }
        }
    }

    async fn try_send_link(
        &self,
        conversation: ConversationId,
        caller: Caller,
        url: ImageUrl,
        reply: Option<PendingReply>,
    ) -> Result<SendOutcome, Error> {
        if self.is_rate_limited(conversation) {
            return Ok(SendOutcome::Blocked);
        }

        let channel = self.channels.get_conversation(conversation).await?;
        self.ensure_permitted(&channel, caller, Capability::EmbedLinks)?;

        self.messages.submit(conversation, &OutgoingMessage::link(url, reply)).await?;
        self.publish_cooldown(&channel);

        Ok(SendOutcome::Complete)
    }

    pub async fn send_as_upload(
        &self,
        notifier: &dyn Notifier,
        caller: Caller,
        url: ImageUrl,
        conversation: ConversationId,
    ) -> SendOutcome {
        let reply = self.consume_pending_reply(conversation);

        match self.try_send_upload(notifier, conversation, caller, url, reply).await {
            Ok(outcome) => outcome,
            Err(Error::PermissionDenied(capability)) => {
                info!(channel_id = %conversation, %capability, "Goose upload denied");
                notifier.notify(Notice::failure(capability.denial_notice())).await;
                SendOutcome::Denied
            }
            Err(e) => {
                // The upload never started; tell the channel instead of dropping silently.
                error!(channel_id = %conversation, error = %e, "Failed to upload Goose image");
                let fallback = OutgoingMessage::text(UPLOAD_FALLBACK_MESSAGE);
                if let Err(e) = self.messages.submit(conversation, &fallback).await {
                    error!(channel_id = %conversation, error = %e, "Failed to send upload fallback message");
                }
                SendOutcome::Failed
            }
        }
    }

    async fn try_send_upload(
        &self,
        notifier: &dyn Notifier,
        conversation: ConversationId,
        caller: Caller,
        url: ImageUrl,
        reply: Option<PendingReply>,
    ) -> Result<SendOutcome, Error> {
        if self.is_rate_limited(conversation) {
            return Ok(SendOutcome::Blocked);
        }

        let channel = self.channels.get_conversation(conversation).await?;
        self.ensure_permitted(&channel, caller, Capability::AttachFiles)?;

        notifier.notify(Notice::message(UPLOADING_NOTICE)).await;
        let bytes = self.images.download(&url).await?;
        let file = NamedFile::goose_jpeg(bytes);

        match self.uploads.upload(conversation, file).await {
            UploadOutcome::Completed(uploaded) => {
                debug!(channel_id = %conversation, uploaded_filename = %uploaded.uploaded_filename, "Upload complete");
                let message = OutgoingMessage::attachment(uploaded, reply);
                if let Err(e) = self.messages.submit(conversation, &message).await {
                    error!(channel_id = %conversation, error = %e, "Failed to post uploaded Goose image");
                    notifier.notify(Notice::failure(LINK_FAILED_NOTICE)).await;
                    return Ok(SendOutcome::Failed);
                }
                self.publish_cooldown(&channel);
                Ok(SendOutcome::Complete)
            }
            UploadOutcome::Failed(reason) => {
                warn!(channel_id = %conversation, %reason, "Goose upload failed");
                notifier.notify(Notice::failure(UPLOAD_FAILED_NOTICE)).await;
                Ok(SendOutcome::Failed)
            }
        }
    }

    fn consume_pending_reply(&self, conversation: ConversationId) -> Option<PendingReply> {
        let reply = self.replies.get_pending_reply(conversation);
        if reply.is_some() {
            self.replies.clear_pending_reply(conversation);
        }
        reply
    }

    fn is_rate_limited(&self, conversation: ConversationId) -> bool {
        let remaining = self.cooldowns.estimate_cooldown_ms(conversation);
        if remaining > 0 {
            debug!(channel_id = %conversation, remaining_ms = remaining, "Slowmode active, dropping send");
        }
        remaining > 0
    }

    /// Both the invoking member and the bot must hold `capability` in guild channels.
    fn ensure_permitted(&self, channel: &Conversation, caller: Caller, capability: Capability) -> Result<(), Error> {
        if !channel.guild_present() {
            return Ok(());
        }
        if !caller.allows(capability) || !self.permissions.can(capability, channel)? {
            return Err(Error::PermissionDenied(capability));
        }
        Ok(())
    }

    fn publish_cooldown(&self, channel: &Conversation) {
        self.cooldowns.set_cooldown_ms(channel.id, channel.cooldown_ms());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Severity, UploadedFile};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const CHANNEL: ConversationId = ConversationId(42);

    struct FakeImages {
        url: Option<&'static str>,
        download_fails: bool,
        downloads: AtomicUsize,
    }

    #[async_trait]
    impl ImageProvider for FakeImages {
        async fn fetch_random_image_url(&self) -> Result<ImageUrl, Error> {
            self.url
                .map(ImageUrl::new)
                .ok_or_else(|| Error::MalformedResponse("no url".to_string()))
        }

        async fn download(&self, _url: &ImageUrl) -> Result<Vec<u8>, Error> {
            self.downloads.fetch_add(1, Ordering::SeqCst);
            if self.download_fails {
                return Err(network_error());
            }
            Ok(vec![0xFF, 0xD8])
        }
    }

    /// A real reqwest failure: the request cannot even be built.
    fn network_error() -> Error {
        match reqwest::Client::new().get("http://[::1").build() {
            Ok(_) => Error::Unknown("expected an invalid url".to_string()),
            Err(e) => Error::Network(e),
        }
    }

    struct FakeChannels {
        conversation: Conversation,
        fail: bool,
    }

    #[async_trait]
    impl ChannelStore for FakeChannels {
        async fn get_conversation(&self, _id: ConversationId) -> Result<Conversation, Error> {
            if self.fail {
                return Err(network_error());
            }
            Ok(self.conversation.clone())
        }
    }

    struct FakePermissions {
        embed_links: bool,
        attach_files: bool,
        fail: bool,
        checks: AtomicUsize,
    }

    impl PermissionStore for FakePermissions {
        fn can(&self, capability: Capability, _conversation: &Conversation) -> Result<bool, Error> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Unknown("Guild 1 is not cached".to_string()));
            }
            Ok(match capability {
                Capability::EmbedLinks => self.embed_links,
                Capability::AttachFiles => self.attach_files,
            })
        }
    }

    struct FakeCooldowns {
        remaining_ms: u64,
        published: Mutex<Vec<(ConversationId, u64)>>,
    }

    impl CooldownStore for FakeCooldowns {
        fn estimate_cooldown_ms(&self, _id: ConversationId) -> u64 {
            self.remaining_ms
        }

        fn set_cooldown_ms(&self, id: ConversationId, cooldown_ms: u64) {
            self.published.lock().unwrap().push((id, cooldown_ms));
        }
    }

    #[derive(Default)]
    struct FakeReplies {
        reply: Mutex<Option<PendingReply>>,
        clears: AtomicUsize,
    }

    impl PendingReplyStore for FakeReplies {
        fn get_pending_reply(&self, _id: ConversationId) -> Option<PendingReply> {
            self.reply.lock().unwrap().clone()
        }

        fn clear_pending_reply(&self, _id: ConversationId) {
            self.clears.fetch_add(1, Ordering::SeqCst);
            *self.reply.lock().unwrap() = None;
        }
    }

    #[derive(Default)]
    struct FakeMessages {
        fail: bool,
        sent: Mutex<Vec<(ConversationId, OutgoingMessage)>>,
    }

    #[async_trait]
    impl MessageTransport for FakeMessages {
        async fn submit(&self, id: ConversationId, message: &OutgoingMessage) -> Result<(), Error> {
            if self.fail {
                return Err(Error::Unknown("500".to_string()));
            }
            self.sent.lock().unwrap().push((id, message.clone()));
            Ok(())
        }
    }

    struct FakeUploads {
        outcome: UploadOutcome,
        files: Mutex<Vec<NamedFile>>,
    }

    #[async_trait]
    impl UploadTransport for FakeUploads {
        async fn upload(&self, _id: ConversationId, file: NamedFile) -> UploadOutcome {
            self.files.lock().unwrap().push(file);
            self.outcome.clone()
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        notices: Mutex<Vec<Notice>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, notice: Notice) {
            self.notices.lock().unwrap().push(notice);
        }
    }

    impl RecordingNotifier {
        fn failures(&self) -> Vec<String> {
            self.notices
                .lock()
                .unwrap()
                .iter()
                .filter(|n| n.severity == Severity::Failure)
                .map(|n| n.text.clone())
                .collect()
        }
    }

    struct Harness {
        images: Arc<FakeImages>,
        permissions: Arc<FakePermissions>,
        cooldowns: Arc<FakeCooldowns>,
        replies: Arc<FakeReplies>,
        messages: Arc<FakeMessages>,
        uploads: Arc<FakeUploads>,
        notifier: RecordingNotifier,
        coordinator: ImagePostCoordinator,
    }

    struct Setup {
        guild_id: Option<u64>,
        remaining_ms: u64,
        embed_links: bool,
        attach_files: bool,
        download_fails: bool,
        channel_fails: bool,
        permissions_fail: bool,
        messages_fail: bool,
        upload: UploadOutcome,
        reply: Option<PendingReply>,
        url: Option<&'static str>,
    }

    impl Default for Setup {
        fn default() -> Self {
            Self {
                guild_id: Some(1),
                remaining_ms: 0,
                embed_links: true,
                attach_files: true,
                download_fails: false,
                channel_fails: false,
                permissions_fail: false,
                messages_fail: false,
                upload: UploadOutcome::Completed(UploadedFile {
                    filename: "goose.jpg".to_string(),
                    uploaded_filename: "a1b2c3/goose.jpg".to_string(),
                }),
                reply: None,
                url: Some("https://img/x.jpg"),
            }
        }
    }

    fn harness(setup: Setup) -> Harness {
        let images = Arc::new(FakeImages {
            url: setup.url,
            download_fails: setup.download_fails,
            downloads: AtomicUsize::new(0),
        });
        let channels = Arc::new(FakeChannels {
            conversation: Conversation {
                id: CHANNEL,
                guild_id: setup.guild_id,
                rate_limit_per_user: 5,
            },
            fail: setup.channel_fails,
        });
        let permissions = Arc::new(FakePermissions {
            embed_links: setup.embed_links,
            attach_files: setup.attach_files,
            fail: setup.permissions_fail,
            checks: AtomicUsize::new(0),
        });
        let cooldowns = Arc::new(FakeCooldowns {
            remaining_ms: setup.remaining_ms,
            published: Mutex::new(Vec::new()),
        });
        let replies = Arc::new(FakeReplies {
            reply: Mutex::new(setup.reply),
            ..Default::default()
        });
        let messages = Arc::new(FakeMessages {
            fail: setup.messages_fail,
            ..Default::default()
        });
        let uploads = Arc::new(FakeUploads {
            outcome: setup.upload,
            files: Mutex::new(Vec::new()),
        });

        let coordinator = ImagePostCoordinator::new(Collaborators {
            images: images.clone(),
            channels,
            permissions: permissions.clone(),
            cooldowns: cooldowns.clone(),
            replies: replies.clone(),
            messages: messages.clone(),
            uploads: uploads.clone(),
        });

        Harness {
            images,
            permissions,
            cooldowns,
            replies,
            messages,
            uploads,
            notifier: RecordingNotifier::default(),
            coordinator,
        }
    }

    fn url() -> ImageUrl {
        ImageUrl::new("https://img/x.jpg")
    }

    fn reply() -> PendingReply {
        PendingReply {
            message_id: 900,
            channel_id: CHANNEL.get(),
            guild_id: Some(1),
            mention_author: false,
        }
    }

    #[tokio::test]
    async fn link_send_posts_url_and_publishes_slowmode() {
        let h = harness(Setup::default());

        let outcome = h.coordinator.send_as_link(&h.notifier, Caller::unrestricted(), CHANNEL, url()).await;

        assert_eq!(outcome, SendOutcome::Complete);
        let sent = h.messages.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, CHANNEL);
        assert_eq!(sent[0].1.content, "https://img/x.jpg");
        assert!(sent[0].1.attachments.is_empty());
        assert!(sent[0].1.message_reference.is_none());
        assert_eq!(*h.cooldowns.published.lock().unwrap(), vec![(CHANNEL, 5000)]);
        assert!(h.notifier.notices.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn active_cooldown_drops_both_paths_silently() {
        let h = harness(Setup { remaining_ms: 1200, ..Default::default() });

        assert_eq!(h.coordinator.send_as_link(&h.notifier, Caller::unrestricted(), CHANNEL, url()).await, SendOutcome::Blocked);
        assert_eq!(h.coordinator.send_as_upload(&h.notifier, Caller::unrestricted(), url(), CHANNEL).await, SendOutcome::Blocked);

        assert!(h.messages.sent.lock().unwrap().is_empty());
        assert!(h.uploads.files.lock().unwrap().is_empty());
        assert!(h.cooldowns.published.lock().unwrap().is_empty());
        assert!(h.notifier.notices.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_embed_permission_denies_link() {
        let h = harness(Setup { embed_links: false, ..Default::default() });

        let outcome = h.coordinator.send_as_link(&h.notifier, Caller::unrestricted(), CHANNEL, url()).await;

        assert_eq!(outcome, SendOutcome::Denied);
        assert!(h.messages.sent.lock().unwrap().is_empty());
        assert_eq!(h.notifier.failures(), vec!["Missing required permissions to embed links"]);
    }

    #[tokio::test]
    async fn missing_attach_permission_denies_upload() {
        let h = harness(Setup { attach_files: false, ..Default::default() });

        let outcome = h.coordinator.send_as_upload(&h.notifier, Caller::unrestricted(), url(), CHANNEL).await;

        assert_eq!(outcome, SendOutcome::Denied);
        assert!(h.uploads.files.lock().unwrap().is_empty());
        assert_eq!(h.images.downloads.load(Ordering::SeqCst), 0);
        assert!(h.messages.sent.lock().unwrap().is_empty());
        assert_eq!(h.notifier.failures(), vec!["Missing required permissions to upload files"]);
    }

    #[tokio::test]
    async fn direct_messages_skip_permission_checks() {
        let h = harness(Setup {
            guild_id: None,
            embed_links: false,
            attach_files: false,
            ..Default::default()
        });

        assert_eq!(h.coordinator.send_as_link(&h.notifier, Caller::unrestricted(), CHANNEL, url()).await, SendOutcome::Complete);
        assert_eq!(h.permissions.checks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn pending_reply_is_consumed_by_link_send() {
        let h = harness(Setup { reply: Some(reply()), ..Default::default() });

        h.coordinator.send_as_link(&h.notifier, Caller::unrestricted(), CHANNEL, url()).await;

        assert_eq!(h.replies.clears.load(Ordering::SeqCst), 1);
        let sent = h.messages.sent.lock().unwrap();
        assert_eq!(sent[0].1.message_reference, Some(reply()));
    }

    #[tokio::test]
    async fn pending_reply_is_consumed_by_upload_send() {
        let h = harness(Setup { reply: Some(reply()), ..Default::default() });

        h.coordinator.send_as_upload(&h.notifier, Caller::unrestricted(), url(), CHANNEL).await;

        assert_eq!(h.replies.clears.load(Ordering::SeqCst), 1);
        let sent = h.messages.sent.lock().unwrap();
        assert_eq!(sent[0].1.message_reference, Some(reply()));
    }

    #[tokio::test]
    async fn pending_reply_is_cleared_even_when_blocked() {
        let h = harness(Setup {
            reply: Some(reply()),
            remaining_ms: 10,
            ..Default::default()
        });

        h.coordinator.send_as_link(&h.notifier, Caller::unrestricted(), CHANNEL, url()).await;

        assert_eq!(h.replies.clears.load(Ordering::SeqCst), 1);
        assert!(h.replies.reply.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn no_pending_reply_means_no_clear() {
        let h = harness(Setup::default());

        h.coordinator.send_as_link(&h.notifier, Caller::unrestricted(), CHANNEL, url()).await;

        assert_eq!(h.replies.clears.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn upload_posts_attachment_with_server_filename() {
        let h = harness(Setup::default());

        let outcome = h.coordinator.send_as_upload(&h.notifier, Caller::unrestricted(), url(), CHANNEL).await;

        assert_eq!(outcome, SendOutcome::Complete);
        let files = h.uploads.files.lock().unwrap();
        assert_eq!(files[0].name, "goose.jpg");
        assert_eq!(files[0].content_type, "image/jpeg");
        assert_eq!(files[0].bytes, vec![0xFF, 0xD8]);

        let sent = h.messages.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.content, "");
        assert_eq!(sent[0].1.attachments.len(), 1);
        assert_eq!(sent[0].1.attachments[0].filename, "goose.jpg");
        assert_eq!(sent[0].1.attachments[0].uploaded_filename, "a1b2c3/goose.jpg");
        assert_eq!(*h.cooldowns.published.lock().unwrap(), vec![(CHANNEL, 5000)]);

        let notices = h.notifier.notices.lock().unwrap();
        assert_eq!(*notices, vec![Notice::message(UPLOADING_NOTICE)]);
    }

    #[tokio::test]
    async fn download_failure_sends_fallback_text() {
        let h = harness(Setup { download_fails: true, ..Default::default() });

        let outcome = h.coordinator.send_as_upload(&h.notifier, Caller::unrestricted(), url(), CHANNEL).await;

        assert_eq!(outcome, SendOutcome::Failed);
        assert!(h.uploads.files.lock().unwrap().is_empty());
        let sent = h.messages.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.content, "Failed to upload Goose image :(");
        assert!(sent[0].1.attachments.is_empty());
        assert!(h.cooldowns.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn upload_transport_error_emits_notice_without_retry() {
        let h = harness(Setup {
            upload: UploadOutcome::Failed("413 Payload Too Large".to_string()),
            ..Default::default()
        });

        let outcome = h.coordinator.send_as_upload(&h.notifier, Caller::unrestricted(), url(), CHANNEL).await;

        assert_eq!(outcome, SendOutcome::Failed);
        assert_eq!(h.uploads.files.lock().unwrap().len(), 1);
        assert!(h.messages.sent.lock().unwrap().is_empty());
        assert_eq!(h.notifier.failures(), vec!["Failed to upload Goose image"]);
    }

    #[tokio::test]
    async fn link_transport_failure_is_reported_and_keeps_cooldown() {
        let h = harness(Setup { messages_fail: true, ..Default::default() });

        let outcome = h.coordinator.send_as_link(&h.notifier, Caller::unrestricted(), CHANNEL, url()).await;

        assert_eq!(outcome, SendOutcome::Failed);
        assert!(h.cooldowns.published.lock().unwrap().is_empty());
        assert_eq!(h.notifier.failures(), vec!["Failed to send Goose image"]);
    }

    #[tokio::test]
    async fn post_random_image_uses_fetched_url() {
        let h = harness(Setup::default());

        let outcome = h.coordinator.post_random_image(SendMode::Link, Caller::unrestricted(), &h.notifier, CHANNEL).await;

        assert_eq!(outcome, SendOutcome::Complete);
        assert_eq!(h.messages.sent.lock().unwrap()[0].1.content, "https://img/x.jpg");
    }

    #[tokio::test]
    async fn post_random_image_routes_attachment_mode_to_upload() {
        let h = harness(Setup::default());

        h.coordinator.post_random_image(SendMode::Attachment, Caller::unrestricted(), &h.notifier, CHANNEL).await;

        assert_eq!(h.uploads.files.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_sends_nothing() {
        let h = harness(Setup { url: None, ..Default::default() });

        let outcome = h.coordinator.post_random_image(SendMode::Link, Caller::unrestricted(), &h.notifier, CHANNEL).await;

        assert_eq!(outcome, SendOutcome::Failed);
        assert!(h.messages.sent.lock().unwrap().is_empty());
        assert_eq!(h.notifier.failures(), vec![FETCH_FAILED_NOTICE]);
    }

    fn assert_link_failed_generically(h: &Harness) {
        assert!(h.messages.sent.lock().unwrap().is_empty());
        assert!(h.cooldowns.published.lock().unwrap().is_empty());
        assert_eq!(h.notifier.failures(), vec![LINK_FAILED_NOTICE]);
        assert_eq!(h.notifier.notices.lock().unwrap().len(), 1);
    }

    fn assert_only_fallback_sent(h: &Harness) {
        assert!(h.uploads.files.lock().unwrap().is_empty());
        assert_eq!(h.images.downloads.load(Ordering::SeqCst), 0);
        let sent = h.messages.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.content, UPLOAD_FALLBACK_MESSAGE);
        assert!(sent[0].1.attachments.is_empty());
        assert!(h.cooldowns.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn channel_lookup_failure_on_link_path_is_a_generic_failure() {
        let h = harness(Setup { channel_fails: true, ..Default::default() });

        let outcome = h.coordinator.send_as_link(&h.notifier, Caller::unrestricted(), CHANNEL, url()).await;

        assert_eq!(outcome, SendOutcome::Failed);
        assert_link_failed_generically(&h);
    }

    #[tokio::test]
    async fn permission_lookup_failure_on_link_path_is_a_generic_failure() {
        let h = harness(Setup { permissions_fail: true, ..Default::default() });

        let outcome = h.coordinator.send_as_link(&h.notifier, Caller::unrestricted(), CHANNEL, url()).await;

        assert_eq!(outcome, SendOutcome::Failed);
        assert_link_failed_generically(&h);
    }

    #[tokio::test]
    async fn channel_lookup_failure_on_upload_path_sends_fallback_text() {
        let h = harness(Setup { channel_fails: true, ..Default::default() });

        let outcome = h.coordinator.send_as_upload(&h.notifier, Caller::unrestricted(), url(), CHANNEL).await;

        assert_eq!(outcome, SendOutcome::Failed);
        assert_only_fallback_sent(&h);
    }

    #[tokio::test]
    async fn permission_lookup_failure_on_upload_path_sends_fallback_text() {
        let h = harness(Setup { permissions_fail: true, ..Default::default() });

        let outcome = h.coordinator.send_as_upload(&h.notifier, Caller::unrestricted(), url(), CHANNEL).await;

        assert_eq!(outcome, SendOutcome::Failed);
        assert_only_fallback_sent(&h);
        assert!(h.notifier.notices.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn caller_without_embed_links_is_denied() {
        let h = harness(Setup::default());
        let caller = Caller { embed_links: false, attach_files: true };

        let outcome = h.coordinator.send_as_link(&h.notifier, caller, CHANNEL, url()).await;

        assert_eq!(outcome, SendOutcome::Denied);
        assert!(h.messages.sent.lock().unwrap().is_empty());
        assert_eq!(h.notifier.failures(), vec!["Missing required permissions to embed links"]);
    }

    #[tokio::test]
    async fn caller_without_attach_files_is_denied() {
        let h = harness(Setup::default());
        let caller = Caller { embed_links: true, attach_files: false };

        let outcome = h.coordinator.send_as_upload(&h.notifier, caller, url(), CHANNEL).await;

        assert_eq!(outcome, SendOutcome::Denied);
        assert!(h.uploads.files.lock().unwrap().is_empty());
        assert!(h.messages.sent.lock().unwrap().is_empty());
        assert_eq!(h.notifier.failures(), vec!["Missing required permissions to upload files"]);
    }

    #[tokio::test]
    async fn caller_permissions_do_not_apply_in_direct_messages() {
        let h = harness(Setup { guild_id: None, ..Default::default() });
        let caller = Caller { embed_links: false, attach_files: false };

        let outcome = h.coordinator.send_as_link(&h.notifier, caller, CHANNEL, url()).await;

        assert_eq!(outcome, SendOutcome::Complete);
    }

    #[test]
    fn download_failures_are_network_errors() {
        assert!(matches!(network_error(), Error::Network(_)));
    }
}
