// events.rs
use crate::commands::handle_goose_button;
use crate::error::Error;
use crate::Data;
use poise::serenity_prelude::{Context, FullEvent, Interaction};
use poise::FrameworkContext;

pub async fn handle_event(
    ctx: &Context,
    event: &FullEvent,
    _framework: FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot } => {
            tracing::info!("{} is connected to {} guilds", data_about_bot.user.name, data_about_bot.guilds.len());
        }
        FullEvent::InteractionCreate { interaction: Interaction::Component(component) } => {
            handle_goose_button(ctx, component, data).await?;
        }
        _ => {}
    }
    Ok(())
}
