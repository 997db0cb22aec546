// commands/reply_with_goose.rs
use crate::error::Error;
use crate::notify::CommandNotifier;
use crate::types::{ConversationId, PendingReply};
use crate::Data;
use poise::serenity_prelude::Message;

type Context<'a> = poise::Context<'a, Data, Error>;

/// Reply to a message with a random goose
#[poise::command(context_menu_command = "Reply with Goose", category = "Fun")]
pub async fn replywithgoose(ctx: Context<'_>, message: Message) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let conversation = ConversationId::from(message.channel_id);
    ctx.data().replies.set_pending_reply(conversation, PendingReply {
        message_id: message.id.get(),
        channel_id: message.channel_id.get(),
        guild_id: ctx.guild_id().map(|g| g.get()),
        mention_author: true,
    });

    let notifier = CommandNotifier::new(ctx);
    let outcome = ctx.data().coordinator
        .post_random_image(ctx.data().config.send_method, super::invoking_caller(ctx), &notifier, conversation)
        .await;

    tracing::info!(channel_id = %conversation, message_id = %message.id, ?outcome, "Goose reply finished");
    notifier.finish().await
}
