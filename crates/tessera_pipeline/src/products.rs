//! Product names looked up from product page URLs.

use crate::ProductContext;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tessera_core::TokenLedger;
use tessera_interface::TextBackend;
use tessera_rate_limit::{BackoffPolicy, retry_transient};

const PRODUCT_PROMPT: &str = include_str!("../prompts/product_names.txt");

/// A product page and its cleaned-up name.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct Product {
    /// Page the name was taken from (may be empty)
    url: String,
    /// Cleaned product name
    name: String,
}

#[derive(Debug, Deserialize)]
struct ProductEntry {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Extract products from a model answer.
///
/// Takes the outermost `[` ... `]` span, so prose around the array is
/// ignored. Names are trimmed; empty names and case-insensitive repeats are
/// dropped. Returns `None` when no array is present or it does not parse.
///
/// # Examples
///
/// ```
/// use tessera_pipeline::parse_products;
///
/// let answer = r#"Here you go: [{"url": "a", "name": "Arc Lamp"}, {"name": "arc lamp "}]"#;
/// let products = parse_products(answer).unwrap();
/// assert_eq!(products.len(), 1);
/// assert_eq!(products[0].name(), "Arc Lamp");
/// ```
pub fn parse_products(answer: &str) -> Option<Vec<Product>> {
    let start = answer.find('[')?;
    let end = answer.rfind(']')?;
    if end < start {
        return None;
    }

    let entries: Vec<ProductEntry> = match serde_json::from_str(&answer[start..=end]) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(error = %e, "Product answer is not a JSON array of products");
            return None;
        }
    };

    let mut seen = HashSet::new();
    let products = entries
        .into_iter()
        .filter_map(|entry| {
            let name = entry.name.as_deref().map(str::trim).unwrap_or_default();
            if name.is_empty() || !seen.insert(name.to_lowercase()) {
                return None;
            }
            Some(Product {
                url: entry.url.unwrap_or_default(),
                name: name.to_string(),
            })
        })
        .collect();
    Some(products)
}

/// Turns product page URLs into clean product names through the text backend.
///
/// Lookup failures never fail the caller: they are logged and yield no
/// products, so text generation proceeds without product context.
#[derive(Clone)]
pub struct ProductLookup {
    backend: Arc<dyn TextBackend>,
    backoff: BackoffPolicy,
}

impl std::fmt::Debug for ProductLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductLookup")
            .field("model", &self.backend.model_name())
            .field("backoff", &self.backoff)
            .finish()
    }
}

impl ProductLookup {
    /// Lookup with the default backoff policy.
    pub fn new(backend: Arc<dyn TextBackend>) -> Self {
        Self {
            backend,
            backoff: BackoffPolicy::default(),
        }
    }

    /// Use a different backoff policy for transient backend failures.
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Products named on the pages behind `urls`, possibly none.
    #[tracing::instrument(skip_all, fields(urls = urls.len(), found = tracing::field::Empty))]
    pub async fn fetch_products(&self, urls: &[String], ledger: &mut TokenLedger) -> Vec<Product> {
        if urls.is_empty() {
            return Vec::new();
        }

        let list = urls
            .iter()
            .map(|url| format!("- {}", url))
            .collect::<Vec<_>>()
            .join("\n");
        let message = format!("Fetch product names from these Amazon URLs:\n{}", list);

        let completion = match retry_transient(&self.backoff, "product_lookup", || {
            self.backend.call(PRODUCT_PROMPT, &message)
        })
        .await
        {
            Ok(completion) => completion,
            Err(e) => {
                tracing::warn!(error = %e, "Product lookup failed, continuing without products");
                return Vec::new();
            }
        };
        ledger.record(completion.usage());

        let products = parse_products(completion.text()).unwrap_or_else(|| {
            tracing::warn!("No product array in lookup answer");
            Vec::new()
        });
        tracing::Span::current().record("found", products.len());
        tracing::info!(found = products.len(), "Product lookup complete");
        products
    }

    /// Product context for the creator stage, or `None` when nothing was found.
    pub async fn context(&self, urls: &[String], ledger: &mut TokenLedger) -> Option<ProductContext> {
        let products = self.fetch_products(urls, ledger).await;
        if products.is_empty() {
            return None;
        }
        Some(ProductContext::new(
            products.into_iter().map(|p| p.name).collect(),
        ))
    }
}
