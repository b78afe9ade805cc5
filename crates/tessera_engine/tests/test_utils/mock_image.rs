//! Mock image collaborators for testing.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tessera_error::{TesseraResult, UpstreamError};
use tessera_interface::{BackgroundRemover, ComposeParams, ImageBackend, ImageFetcher, MediaUploader};

#[derive(Debug, Default)]
struct State {
    calls: Vec<String>,
    uploads: usize,
    rate_limited_fetches: usize,
    rate_limited_trims: usize,
}

/// Fetcher, compositor, background remover and uploader in one.
///
/// Bytes are the UTF-8 of a description so tests can inspect what reached
/// the uploader.
#[derive(Debug, Clone, Default)]
pub struct MockImageServices {
    state: Arc<Mutex<State>>,
}

impl MockImageServices {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first `n` fetches are rate limited.
    pub fn rate_limited_fetches(self, n: usize) -> Self {
        self.state.lock().unwrap().rate_limited_fetches = n;
        self
    }

    /// The first `n` trims are rate limited.
    pub fn rate_limited_trims(self, n: usize) -> Self {
        self.state.lock().unwrap().rate_limited_trims = n;
        self
    }

    /// Operation log, e.g. `fetch:https://...`, `compose:2:16:9`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls whose log entry starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn log(&self, entry: String) {
        self.state.lock().unwrap().calls.push(entry);
    }
}

#[async_trait]
impl ImageFetcher for MockImageServices {
    async fn fetch(&self, url: &str) -> TesseraResult<Vec<u8>> {
        {
            let mut state = self.state.lock().unwrap();
            if state.rate_limited_fetches > 0 {
                state.rate_limited_fetches -= 1;
                state.calls.push(format!("fetch-limited:{}", url));
                return Err(UpstreamError::rate_limited("mock-fetch", "slow down").into());
            }
        }
        self.log(format!("fetch:{}", url));
        Ok(url.as_bytes().to_vec())
    }
}

#[async_trait]
impl ImageBackend for MockImageServices {
    async fn compose(&self, images: &[Vec<u8>], params: &ComposeParams) -> TesseraResult<Vec<u8>> {
        self.log(format!(
            "compose:{}:{}:{}",
            images.len(),
            params.aspect_ratio(),
            params.is_people_mode()
        ));
        Ok(images.concat())
    }

    async fn trim(&self, image: &[u8]) -> TesseraResult<Vec<u8>> {
        {
            let mut state = self.state.lock().unwrap();
            if state.rate_limited_trims > 0 {
                state.rate_limited_trims -= 1;
                state.calls.push("trim-limited".to_string());
                return Err(UpstreamError::rate_limited("mock-trim", "slow down").into());
            }
        }
        self.log("trim".to_string());
        Ok(image.to_vec())
    }
}

#[async_trait]
impl BackgroundRemover for MockImageServices {
    async fn remove_background(&self, image: &[u8]) -> TesseraResult<Vec<u8>> {
        self.log("remove_bg".to_string());
        Ok(image.to_vec())
    }
}

#[async_trait]
impl MediaUploader for MockImageServices {
    async fn upload(&self, _image: &[u8], filename: &str) -> TesseraResult<String> {
        let n = {
            let mut state = self.state.lock().unwrap();
            state.uploads += 1;
            state.calls.push(format!("upload:{}", filename));
            state.uploads
        };
        Ok(format!("https://media.test/{}/{}", n, filename))
    }
}
