//! Text generators.

use super::{TextServices, inputs};
use async_trait::async_trait;
use serde_json::{Value, json};
use tessera_core::TokenLedger;
use tessera_error::{ConfigError, TesseraResult};
use tessera_interface::{Capability, Generator, GeneratorRequest};
use tessera_pipeline::{ProductContext, ProductLookup, StagedTextPipeline};

/// Header text: the topic name in upper case, identical for every creative.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderGenerator;

impl HeaderGenerator {
    /// Registry identifier.
    pub const NAME: &'static str = "text.header";
}

#[async_trait]
impl Generator for HeaderGenerator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn capability(&self) -> Capability {
        Capability::Text
    }

    async fn generate(
        &self,
        request: &GeneratorRequest,
        _ledger: &mut TokenLedger,
    ) -> TesseraResult<Vec<Value>> {
        let header = request.topic().name().to_uppercase();
        Ok(vec![Value::String(header); request.count()])
    }
}

/// Main text lines.
///
/// Uses the `main_lines` input when given; otherwise runs the staged text
/// pipeline in plain mode. Product context comes from `product_names`, or
/// failing that from names looked up behind `product_urls`. A failed lookup
/// leaves the pipeline without product context.
#[derive(Debug, Clone)]
pub struct MainTextGenerator {
    pipeline: StagedTextPipeline,
    products: ProductLookup,
}

impl MainTextGenerator {
    /// Registry identifier.
    pub const NAME: &'static str = "text.main_text";

    /// Generator running its pipeline over `services`.
    pub fn new(services: &TextServices) -> Self {
        Self {
            pipeline: services.pipeline(),
            products: services.product_lookup(),
        }
    }

    async fn product_context(
        &self,
        request: &GeneratorRequest,
        ledger: &mut TokenLedger,
    ) -> Result<Option<ProductContext>, ConfigError> {
        let context = match inputs::string_list(request, inputs::PRODUCT_NAMES)? {
            Some(names) => Some(ProductContext::new(names)),
            None => match inputs::string_list(request, inputs::PRODUCT_URLS)? {
                Some(urls) => self.products.context(&urls, ledger).await,
                None => None,
            },
        };
        let share = *self.pipeline.settings().product_context_share();
        Ok(context.map(|context| context.with_share(share)))
    }
}

#[async_trait]
impl Generator for MainTextGenerator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn capability(&self) -> Capability {
        Capability::Text
    }

    #[tracing::instrument(skip(self, request, ledger), fields(count = request.count()))]
    async fn generate(
        &self,
        request: &GeneratorRequest,
        ledger: &mut TokenLedger,
    ) -> TesseraResult<Vec<Value>> {
        let count = request.count();

        if let Some(lines) = inputs::string_list(request, inputs::MAIN_LINES)? {
            if lines.len() < count {
                return Err(ConfigError::new(format!(
                    "main_lines has {} lines, {} needed",
                    lines.len(),
                    count
                ))
                .into());
            }
            tracing::debug!(provided = lines.len(), "Using provided main lines");
            return Ok(lines.into_iter().take(count).map(Value::String).collect());
        }

        let products = self.product_context(request, ledger).await?;
        let output = self
            .pipeline
            .run_plain(request.topic(), products.as_ref(), count, ledger)
            .await?;
        Ok(output
            .into_rows()
            .into_iter()
            .map(|row| Value::String(row.into_text()))
            .collect())
    }
}

/// Header and main text pairs from the staged pipeline in paired mode.
///
/// Each value is an object `{"header": …, "main_text": …}`; slots pick one
/// part with their `field`.
#[derive(Debug, Clone)]
pub struct PairedCopyGenerator {
    pipeline: StagedTextPipeline,
}

impl PairedCopyGenerator {
    /// Registry identifier.
    pub const NAME: &'static str = "text.paired_copy";

    /// Generator running its pipeline over `services`.
    pub fn new(services: &TextServices) -> Self {
        Self {
            pipeline: services.pipeline(),
        }
    }
}

#[async_trait]
impl Generator for PairedCopyGenerator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn capability(&self) -> Capability {
        Capability::Text
    }

    #[tracing::instrument(skip(self, request, ledger), fields(count = request.count()))]
    async fn generate(
        &self,
        request: &GeneratorRequest,
        ledger: &mut TokenLedger,
    ) -> TesseraResult<Vec<Value>> {
        let output = self
            .pipeline
            .run_paired(request.topic(), request.count(), ledger)
            .await?;
        Ok(output
            .rows()
            .iter()
            .map(|row| json!({"header": row.header(), "main_text": row.main_text()}))
            .collect())
    }
}
