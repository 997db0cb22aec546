use crate::discord::caller_from;
use crate::error::Error;
use crate::notify::InteractionNotifier;
use crate::types::SendMode;
use crate::Data;
use poise::serenity_prelude::{
    ButtonStyle, ComponentInteraction, Context as SerenityContext, CreateActionRow, CreateButton,
    CreateMessage, EditMessage, MessageId,
};
use poise::CreateReply;

type Context<'a> = poise::Context<'a, Data, Error>;

const BUTTON_PREFIX: &str = "goose_button:";

pub fn custom_id(mode: SendMode) -> String {
    format!("{}{}", BUTTON_PREFIX, mode.as_str())
}

pub fn parse_custom_id(custom_id: &str) -> Option<SendMode> {
    custom_id.strip_prefix(BUTTON_PREFIX).and_then(SendMode::parse)
}

/// Primary button sends with the configured mode, the secondary one with the other.
pub fn button_row(primary: SendMode) -> CreateActionRow {
    let secondary = primary.other();
    CreateActionRow::Buttons(vec![
        CreateButton::new(custom_id(primary))
            .label("Click for Goose")
            .emoji('🪿')
            .style(ButtonStyle::Primary),
        CreateButton::new(custom_id(secondary))
            .label(format!("Goose as {}", secondary.as_str()))
            .style(ButtonStyle::Secondary),
    ])
}

#[poise::command(
    slash_command,
    subcommands("add", "remove"),
    guild_only,
    default_member_permissions = "MANAGE_MESSAGES"
)]
pub async fn goosebutton(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Post a Goose button panel in this channel
#[poise::command(slash_command)]
pub async fn add(ctx: Context<'_>) -> Result<(), Error> {
    let primary = ctx.data().config.send_method;

    let message = ctx.channel_id()
        .send_message(ctx.http(), CreateMessage::new().content("Honk?").components(vec![button_row(primary)]))
        .await?;

    ctx.send(CreateReply::default()
        .content(format!("Goose button added (message {}).", message.id))
        .ephemeral(true))
        .await?;

    Ok(())
}

/// Remove a Goose button panel from this channel
#[poise::command(slash_command)]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "ID of the Goose button message"] message_id: MessageId,
) -> Result<(), Error> {
    ctx.channel_id()
        .edit_message(ctx.http(), message_id, EditMessage::new().components(vec![]))
        .await?;

    ctx.send(CreateReply::default().content("Goose button removed.").ephemeral(true)).await?;

    Ok(())
}

pub async fn handle_goose_button(
    ctx: &SerenityContext,
    interaction: &ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let Some(mode) = parse_custom_id(&interaction.data.custom_id) else {
        return Ok(());
    };

    interaction.defer_ephemeral(ctx).await?;

    let caller = caller_from(interaction.member.as_ref().and_then(|member| member.permissions));
    let notifier = InteractionNotifier::new(ctx.http.clone(), interaction.clone());
    let outcome = data.coordinator
        .post_random_image(mode, caller, &notifier, interaction.channel_id.into())
        .await;

    tracing::info!(
        channel_id = %interaction.channel_id,
        user_id = %interaction.user.id,
        mode = mode.as_str(),
        ?outcome,
        "Goose button handled"
    );
    notifier.finish().await
}
