//! Image generators: fetch, compose, post-process, upload.

use super::{ImageServices, inputs};
use async_trait::async_trait;
use serde_json::Value;
use tessera_core::TokenLedger;
use tessera_error::{ConfigError, TesseraResult};
use tessera_interface::{Capability, ComposeParams, Generator, GeneratorRequest, OutputMode};
use tessera_rate_limit::retry_transient;

const MAX_CLUSTER_IMAGES: usize = 8;

impl ImageServices {
    async fn fetch(&self, url: &str) -> TesseraResult<Vec<u8>> {
        retry_transient(&self.backoff, "fetch_image", || self.fetcher.fetch(url)).await
    }

    async fn fetch_all(&self, urls: &[String]) -> TesseraResult<Vec<Vec<u8>>> {
        let mut images = Vec::with_capacity(urls.len());
        for url in urls {
            images.push(self.fetch(url).await?);
        }
        Ok(images)
    }

    async fn compose(&self, images: &[Vec<u8>], params: &ComposeParams) -> TesseraResult<Vec<u8>> {
        retry_transient(&self.backoff, "compose_image", || {
            self.images.compose(images, params)
        })
        .await
    }

    /// Background removal and trimming (each on by default), then upload.
    async fn finish(
        &self,
        image: Vec<u8>,
        request: &GeneratorRequest,
        filename: &str,
    ) -> TesseraResult<String> {
        let image = if request.option_flag(inputs::REMOVE_BG, true) {
            retry_transient(&self.backoff, "remove_background", || {
                self.remover.remove_background(&image)
            })
            .await?
        } else {
            image
        };
        let image = if request.option_flag(inputs::CROP, true) {
            retry_transient(&self.backoff, "trim_image", || self.images.trim(&image)).await?
        } else {
            image
        };
        let url = retry_transient(&self.backoff, "upload_media", || {
            self.uploader.upload(&image, filename)
        })
        .await?;
        tracing::debug!(url = %url, bytes = image.len(), "Image uploaded");
        Ok(url)
    }
}

fn product_urls(request: &GeneratorRequest) -> Result<Vec<String>, ConfigError> {
    match inputs::string_list(request, inputs::PRODUCT_IMAGE_URLS)? {
        Some(urls) if !urls.is_empty() => Ok(urls),
        _ => Err(ConfigError::new("No product_image_urls provided")),
    }
}

fn compose_params(request: &GeneratorRequest, default_aspect: &str) -> Result<ComposeParams, ConfigError> {
    ComposeParams::builder()
        .aspect_ratio(request.input_str(inputs::ASPECT_RATIO).unwrap_or(default_aspect))
        .is_people_mode(inputs::flag(request, inputs::IS_PEOPLE_MODE, false))
        .build()
        .map_err(|e| ConfigError::new(format!("Invalid compose parameters: {}", e)))
}

/// One image composed from 1-8 product images, shared by every creative.
#[derive(Clone)]
pub struct ClusterImageGenerator {
    services: ImageServices,
}

impl ClusterImageGenerator {
    /// Registry identifier.
    pub const NAME: &'static str = "image.cluster";

    /// Generator over `services`.
    pub fn new(services: &ImageServices) -> Self {
        Self {
            services: services.clone(),
        }
    }
}

#[async_trait]
impl Generator for ClusterImageGenerator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn capability(&self) -> Capability {
        Capability::Image
    }

    #[tracing::instrument(skip_all, fields(generator = Self::NAME))]
    async fn generate(
        &self,
        request: &GeneratorRequest,
        _ledger: &mut TokenLedger,
    ) -> TesseraResult<Vec<Value>> {
        let urls = product_urls(request)?;
        if urls.len() > MAX_CLUSTER_IMAGES {
            return Err(ConfigError::new(format!(
                "Expected 1-{} product_image_urls, got {}",
                MAX_CLUSTER_IMAGES,
                urls.len()
            ))
            .into());
        }
        let params = compose_params(request, "16:9")?;

        tracing::info!(images = urls.len(), aspect_ratio = %params.aspect_ratio(), "Composing cluster image");
        let sources = self.services.fetch_all(&urls).await?;
        let composed = self.services.compose(&sources, &params).await?;
        let url = self.services.finish(composed, request, "cluster.png").await?;

        Ok(vec![Value::String(url); request.count()])
    }
}

/// One cleaned product image picked by `input_index`.
#[derive(Clone)]
pub struct ProductImageGenerator {
    services: ImageServices,
}

impl ProductImageGenerator {
    /// Registry identifier.
    pub const NAME: &'static str = "image.product";

    /// Generator over `services`.
    pub fn new(services: &ImageServices) -> Self {
        Self {
            services: services.clone(),
        }
    }
}

#[async_trait]
impl Generator for ProductImageGenerator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn capability(&self) -> Capability {
        Capability::Image
    }

    #[tracing::instrument(skip_all, fields(generator = Self::NAME))]
    async fn generate(
        &self,
        request: &GeneratorRequest,
        _ledger: &mut TokenLedger,
    ) -> TesseraResult<Vec<Value>> {
        let index = inputs::index(request, inputs::INPUT_INDEX)?
            .ok_or_else(|| ConfigError::new("input_index required for image.product"))?;
        let urls = product_urls(request)?;
        let url = urls.get(index).ok_or_else(|| {
            ConfigError::new(format!(
                "input_index {} out of range (have {} URLs)",
                index,
                urls.len()
            ))
        })?;
        let params = compose_params(request, "1:1")?;

        tracing::info!(index, total = urls.len(), "Processing product image");
        let source = self.services.fetch(url).await?;
        let cleaned = self.services.compose(&[source], &params).await?;
        let hosted = self
            .services
            .finish(cleaned, request, &format!("product-{}.png", index + 1))
            .await?;

        Ok(vec![Value::String(hosted); request.count()])
    }
}

/// Every product image cleaned and uploaded, as a pool in input order.
#[derive(Clone)]
pub struct ProductPoolGenerator {
    services: ImageServices,
}

impl ProductPoolGenerator {
    /// Registry identifier.
    pub const NAME: &'static str = "image.products";

    /// Generator over `services`.
    pub fn new(services: &ImageServices) -> Self {
        Self {
            services: services.clone(),
        }
    }
}

#[async_trait]
impl Generator for ProductPoolGenerator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn capability(&self) -> Capability {
        Capability::Image
    }

    fn output_mode(&self) -> OutputMode {
        OutputMode::Pool
    }

    #[tracing::instrument(skip_all, fields(generator = Self::NAME))]
    async fn generate(
        &self,
        request: &GeneratorRequest,
        _ledger: &mut TokenLedger,
    ) -> TesseraResult<Vec<Value>> {
        let urls = product_urls(request)?;
        let params = compose_params(request, "1:1")?;

        let mut pool = Vec::with_capacity(urls.len());
        for (i, url) in urls.iter().enumerate() {
            tracing::debug!(index = i, total = urls.len(), "Processing pool image");
            let source = self.services.fetch(url).await?;
            let cleaned = self.services.compose(&[source], &params).await?;
            let hosted = self
                .services
                .finish(cleaned, request, &format!("product-{}.png", i + 1))
                .await?;
            pool.push(Value::String(hosted));
        }
        Ok(pool)
    }
}
