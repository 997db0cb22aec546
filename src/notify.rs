// notify.rs
use crate::error::Error;
use crate::services::Notifier;
use crate::types::{Notice, Severity};
use crate::Data;
use async_trait::async_trait;
use poise::serenity_prelude::{
    ComponentInteraction, CreateInteractionResponseFollowup, EditInteractionResponse, Http,
};
use poise::CreateReply;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type Context<'a> = poise::Context<'a, Data, Error>;

pub fn render(notice: &Notice) -> String {
    match notice.severity {
        Severity::Message => notice.text.clone(),
        Severity::Failure => format!("⚠️ {}", notice.text),
    }
}

/// The deferred "thinking" placeholder is only left for notices to fill;
/// a silent attempt must not leave it behind.
pub fn should_delete_placeholder(notices_sent: usize) -> bool {
    notices_sent == 0
}

/// Shows notices as ephemeral replies to a deferred slash command.
pub struct CommandNotifier<'a> {
    ctx: Context<'a>,
    sent: AtomicUsize,
}

impl<'a> CommandNotifier<'a> {
    pub fn new(ctx: Context<'a>) -> Self {
        Self { ctx, sent: AtomicUsize::new(0) }
    }

    /// Removes the "thinking" placeholder when the attempt stayed silent.
    pub async fn finish(&self) -> Result<(), Error> {
        if !should_delete_placeholder(self.sent.load(Ordering::SeqCst)) {
            return Ok(());
        }
        if let poise::Context::Application(app) = self.ctx {
            app.interaction.delete_response(self.ctx.http()).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for CommandNotifier<'_> {
    async fn notify(&self, notice: Notice) {
        self.sent.fetch_add(1, Ordering::SeqCst);
        let reply = CreateReply::default().content(render(&notice)).ephemeral(true);
        if let Err(e) = self.ctx.send(reply).await {
            tracing::warn!(error = %e, "Failed to show notice");
        }
    }
}

/// Shows notices on a deferred button interaction: the first one replaces the
/// placeholder, later ones become ephemeral followups.
pub struct InteractionNotifier {
    http: Arc<Http>,
    interaction: ComponentInteraction,
    sent: AtomicUsize,
}

impl InteractionNotifier {
    pub fn new(http: Arc<Http>, interaction: ComponentInteraction) -> Self {
        Self { http, interaction, sent: AtomicUsize::new(0) }
    }

    pub async fn finish(&self) -> Result<(), Error> {
        if should_delete_placeholder(self.sent.load(Ordering::SeqCst)) {
            self.interaction.delete_response(&self.http).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for InteractionNotifier {
    async fn notify(&self, notice: Notice) {
        let content = render(&notice);
        let result = if self.sent.fetch_add(1, Ordering::SeqCst) == 0 {
            self.interaction
                .edit_response(self.http.as_ref(), EditInteractionResponse::new().content(content))
                .await
        } else {
            self.interaction
                .create_followup(
                    self.http.as_ref(),
                    CreateInteractionResponseFollowup::new().content(content).ephemeral(true),
                )
                .await
        };

        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to show notice");
        }
    }
}
