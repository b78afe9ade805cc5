//! Adapters for the Tessera collaborators.
//!
//! Each adapter implements one or more traits from `tessera_interface`:
//!
//! | Adapter | Traits | Credential |
//! |---|---|---|
//! | [`OpenAiTextClient`] | `TextBackend` | `OPENAI_API_KEY` |
//! | [`PlacidClient`] | `RenderBackend`, `MediaUploader` | `PLACID_API_TOKEN` |
//! | [`RemoveBgClient`] | `BackgroundRemover` | `REMOVEBG_API_KEY` |
//! | [`HttpImageFetcher`] | `ImageFetcher` | none |
//! | [`LocalCompositor`] | `ImageBackend` | none (in-process) |
//!
//! HTTP 429 maps to a retryable rate-limit error carrying any `Retry-After`
//! hint; every other non-success status is a fatal HTTP error. The adapters
//! never retry on their own.
//!
//! HTTP adapters report their service in errors; images the compositor
//! cannot decode surface as invalid-response errors from `compositor`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod compositor;
mod fetcher;
mod http;
mod openai;
mod placid;
mod removebg;

pub use compositor::{CANVAS_LONG_EDGE, LocalCompositor};
pub use fetcher::HttpImageFetcher;
pub use openai::{OPENAI_API_KEY, OpenAiTextClient};
pub use placid::{PLACID_API_TOKEN, PlacidClient};
pub use removebg::{REMOVEBG_API_KEY, RemoveBgClient};
