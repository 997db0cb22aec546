// fetcher.rs
use crate::error::Error;
use crate::services::ImageProvider;
use crate::types::ImageUrl;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Deserialize)]
struct ImagePayload {
    url: Option<String>,
}

/// Random image source backed by a nekos.life style endpoint returning `{"url": ...}`.
pub struct NekosClient {
    client: reqwest::Client,
    endpoint: String,
}

impl NekosClient {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

pub fn parse_image_payload(body: &str) -> Result<ImageUrl, Error> {
    let payload: ImagePayload = serde_json::from_str(body)?;
    payload
        .url
        .map(ImageUrl::new)
        .ok_or_else(|| Error::MalformedResponse("response has no url field".to_string()))
}

#[async_trait]
impl ImageProvider for NekosClient {
    async fn fetch_random_image_url(&self) -> Result<ImageUrl, Error> {
        let body = self.client.get(&self.endpoint)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let url = parse_image_payload(&body)?;
        tracing::debug!(url = %url, "Fetched random image url");
        Ok(url)
    }

    async fn download(&self, url: &ImageUrl) -> Result<Vec<u8>, Error> {
        let bytes = self.client.get(url.as_str())
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        Ok(bytes.to_vec())
    }
}
