// main.rs
mod commands;
mod config;
mod coordinator;
mod discord;
mod error;
mod events;
mod fetcher;
mod notify;
mod rest;
mod services;
mod state;
mod types;
mod utils;

use crate::config::Config;
use crate::coordinator::{Collaborators, ImagePostCoordinator};
use crate::discord::SerenityHost;
use crate::error::Error;
use crate::fetcher::NekosClient;
use crate::rest::DiscordRest;
use crate::services::ImageProvider;
use crate::state::{PendingReplies, SlowmodeTracker};
use poise::serenity_prelude as serenity;
use serenity::GatewayIntents;
use std::sync::Arc;
use tracing::Level;

#[derive(Clone)]
pub struct Data {
    pub config: Arc<Config>,
    pub images: Arc<dyn ImageProvider>,
    pub replies: Arc<PendingReplies>,
    pub coordinator: Arc<ImagePostCoordinator>,
}

fn build_data(config: Config, ctx: &serenity::Context) -> Data {
    let client = reqwest::Client::new();
    let images: Arc<dyn ImageProvider> = Arc::new(NekosClient::new(client.clone(), config.image_api_url.clone()));
    let host = Arc::new(SerenityHost::new(ctx.http.clone(), ctx.cache.clone()));
    let rest = Arc::new(DiscordRest::new(client, config.discord_api_url.clone(), config.bot_token.clone()));
    let replies = Arc::new(PendingReplies::new());

    let coordinator = ImagePostCoordinator::new(Collaborators {
        images: images.clone(),
        channels: host.clone(),
        permissions: host,
        cooldowns: Arc::new(SlowmodeTracker::new()),
        replies: replies.clone(),
        messages: rest.clone(),
        uploads: rest,
    });

    Data {
        config: Arc::new(config),
        images,
        replies,
        coordinator: Arc::new(coordinator),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let config = Config::load().await?;
    let token = config.bot_token.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::get_commands(),
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::handle_event(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!("Registered {} commands", framework.options().commands.len());
                Ok(build_data(config, ctx))
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&token, GatewayIntents::non_privileged())
        .framework(framework)
        .await?;

    client.start_autosharded().await.map_err(Error::from)
}
