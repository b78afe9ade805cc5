//! Trait definitions for external collaborators.

use crate::ComposeParams;
use async_trait::async_trait;
use tessera_core::{JobId, PollReport, PropertyMap, TextCompletion};
use tessera_error::TesseraResult;

/// Language model used by the staged text pipeline.
///
/// Failures carry the retryable/fatal distinction through
/// [`TesseraError::is_retryable`](tessera_error::TesseraError::is_retryable).
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Complete `user_message` under `system_prompt`.
    async fn call(&self, system_prompt: &str, user_message: &str) -> TesseraResult<TextCompletion>;

    /// Model identifier (e.g., "gpt-4.1").
    fn model_name(&self) -> &str;
}

/// Template render service.
#[async_trait]
pub trait RenderBackend: Send + Sync {
    /// Queue a render of `template_id` with `properties`, returning the job id.
    async fn submit(&self, template_id: &str, properties: &PropertyMap) -> TesseraResult<JobId>;

    /// Report the current state of a job.
    async fn poll(&self, job_id: &str) -> TesseraResult<PollReport>;
}

/// Image composition and trimming.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Compose one image from the given source images.
    async fn compose(&self, images: &[Vec<u8>], params: &ComposeParams) -> TesseraResult<Vec<u8>>;

    /// Crop away transparent borders.
    async fn trim(&self, image: &[u8]) -> TesseraResult<Vec<u8>>;
}

/// Background removal service.
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    /// Return the image with its background made transparent.
    async fn remove_background(&self, image: &[u8]) -> TesseraResult<Vec<u8>>;
}

/// Media hosting used to hand images to the render service.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// Upload image bytes and return the hosted URL.
    async fn upload(&self, image: &[u8], filename: &str) -> TesseraResult<String>;
}

/// Downloads source images.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch the bytes behind `url`.
    async fn fetch(&self, url: &str) -> TesseraResult<Vec<u8>>;
}
