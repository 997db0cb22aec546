// commands/goose.rs
use crate::error::Error;
use crate::Data;

type Context<'a> = poise::Context<'a, Data, Error>;

/// Get a random goose image link
#[poise::command(slash_command, category = "Fun")]
pub async fn goose(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;

    let url = ctx.data().images.fetch_random_image_url().await?;
    ctx.say(url.into_string()).await?;

    Ok(())
}
