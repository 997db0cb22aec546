// config.rs
use crate::types::SendMode;
use serde::Deserialize;
use tokio::io::AsyncReadExt;

pub const DEFAULT_IMAGE_API_URL: &str = "https://nekos.life/api/v2/img/goose";
pub const DEFAULT_DISCORD_API_URL: &str = "https://discord.com/api/v10";

#[derive(Clone, Deserialize)]
pub struct Config {
    pub bot_token: String,
    #[serde(default = "default_image_api_url")]
    pub image_api_url: String,
    #[serde(default = "default_discord_api_url")]
    pub discord_api_url: String,
    /// Mode used by the primary button and by `/sendgoose` without a mode.
    #[serde(default)]
    pub send_method: SendMode,
}

fn default_image_api_url() -> String {
    DEFAULT_IMAGE_API_URL.to_string()
}

fn default_discord_api_url() -> String {
    DEFAULT_DISCORD_API_URL.to_string()
}

impl Config {
    pub async fn load() -> Result<Self, crate::error::Error> {
        let mut file = tokio::fs::File::open("config.toml").await?;
        let mut contents = String::new();
        AsyncReadExt::read_to_string(&mut file, &mut contents).await?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, crate::error::Error> {
        toml::from_str(contents).map_err(Into::into)
    }
}
