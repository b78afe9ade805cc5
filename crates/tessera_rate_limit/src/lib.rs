//! Retry budgets, backoff schedules and layered settings.
//!
//! Transient upstream failures (rate limits) are retried at the point where
//! they occur, on an explicit [`BackoffPolicy`]. Everything tunable lives in
//! [`TesseraConfig`], loaded with this precedence (later wins):
//!
//! 1. bundled `tessera.toml` defaults
//! 2. `~/.config/tessera/tessera.toml`
//! 3. `./tessera.toml`
//! 4. `TESSERA_<SECTION>__<KEY>` environment variables

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backoff;
mod config;
mod detector;

pub use backoff::{BackoffPolicy, retry_transient};
pub use config::{BackoffSettings, ModelSettings, PipelineSettings, RenderSettings, TesseraConfig};
pub use detector::retry_after_from_headers;
