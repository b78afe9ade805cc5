//! Plain HTTP image download.

use crate::http;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tessera_error::TesseraResult;
use tessera_interface::ImageFetcher;
use tessera_rate_limit::ModelSettings;

const SERVICE: &str = "image_fetch";

/// Downloads source images over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    /// Fetcher using the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError` if the HTTP client cannot be built.
    pub fn from_settings(settings: &ModelSettings) -> TesseraResult<Self> {
        let client = http::client(
            SERVICE,
            Duration::from_secs(*settings.request_timeout_secs()),
        )?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self, url: &str) -> TesseraResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| http::transport(SERVICE, e))?;
        let response = http::check(SERVICE, response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| http::transport(SERVICE, e))?;
        if bytes.is_empty() {
            return Err(http::invalid(SERVICE, format!("Empty image at {}", url)).into());
        }
        Ok(bytes.to_vec())
    }
}
