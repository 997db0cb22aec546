// commands/send_goose.rs
use crate::error::Error;
use crate::notify::CommandNotifier;
use crate::types::SendMode;
use crate::Data;

type Context<'a> = poise::Context<'a, Data, Error>;

#[derive(poise::ChoiceParameter, Clone, Copy)]
pub enum ModeChoice {
    #[name = "link"]
    Link,
    #[name = "attachment"]
    Attachment,
}

impl From<ModeChoice> for SendMode {
    fn from(choice: ModeChoice) -> Self {
        match choice {
            ModeChoice::Link => SendMode::Link,
            ModeChoice::Attachment => SendMode::Attachment,
        }
    }
}

/// Post a random goose into this channel
#[poise::command(slash_command, category = "Fun")]
pub async fn sendgoose(
    ctx: Context<'_>,
    #[description = "Send as a link or as an uploaded attachment"] mode: Option<ModeChoice>,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let mode = mode.map(SendMode::from).unwrap_or(ctx.data().config.send_method);
    let notifier = CommandNotifier::new(ctx);
    let outcome = ctx.data().coordinator
        .post_random_image(mode, super::invoking_caller(ctx), &notifier, ctx.channel_id().into())
        .await;

    tracing::info!(channel_id = %ctx.channel_id(), mode = mode.as_str(), ?outcome, "sendgoose finished");
    notifier.finish().await
}
