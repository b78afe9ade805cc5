//! remove.bg-style background removal.

use crate::http;
use async_trait::async_trait;
use reqwest::{Client, multipart};
use std::time::Duration;
use tessera_error::TesseraResult;
use tessera_interface::BackgroundRemover;
use tessera_rate_limit::ModelSettings;

const SERVICE: &str = "removebg";

/// Environment variable holding the API key.
pub const REMOVEBG_API_KEY: &str = "REMOVEBG_API_KEY";

/// Background remover posting images to a remove.bg-compatible endpoint.
///
/// Returns a PNG with transparency.
#[derive(Debug, Clone)]
pub struct RemoveBgClient {
    client: Client,
    api_key: String,
    url: String,
}

impl RemoveBgClient {
    /// Client configured from `settings`, reading the key from `REMOVEBG_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError` if the key is missing or the HTTP client
    /// cannot be built.
    #[tracing::instrument(skip_all)]
    pub fn from_settings(settings: &ModelSettings) -> TesseraResult<Self> {
        let api_key = http::credential(SERVICE, REMOVEBG_API_KEY)?;
        Self::with_api_key(api_key, settings)
    }

    /// Client with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError` if the HTTP client cannot be built.
    pub fn with_api_key(api_key: String, settings: &ModelSettings) -> TesseraResult<Self> {
        let client = http::client(
            SERVICE,
            Duration::from_secs(*settings.request_timeout_secs()),
        )?;
        Ok(Self {
            client,
            api_key,
            url: settings.removebg_url().clone(),
        })
    }
}

#[async_trait]
impl BackgroundRemover for RemoveBgClient {
    #[tracing::instrument(skip(self, image), fields(bytes = image.len()))]
    async fn remove_background(&self, image: &[u8]) -> TesseraResult<Vec<u8>> {
        let part = multipart::Part::bytes(image.to_vec())
            .file_name("image.png")
            .mime_str("image/png")
            .map_err(|e| http::invalid(SERVICE, format!("Invalid upload part: {}", e)))?;
        let form = multipart::Form::new()
            .part("image_file", part)
            .text("size", "auto")
            .text("format", "png");

        let response = self
            .client
            .post(&self.url)
            .header("X-Api-Key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| http::transport(SERVICE, e))?;
        let response = http::check(SERVICE, response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| http::transport(SERVICE, e))?;
        tracing::debug!(bytes = bytes.len(), "Background removed");
        Ok(bytes.to_vec())
    }
}
