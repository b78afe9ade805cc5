//! Source resolution: turn each slot source into values for a whole batch.

use crate::{GeneratorRegistry, Services};
use serde_json::Value;
use std::collections::HashMap;
use tessera_core::{GenerationContext, JsonMap, Slot, SourceValues, TemplateConfig, TokenLedger};
use tessera_error::{BuilderError, ConfigError, TesseraResult};
use tessera_interface::{Generator, GeneratorRequest, OutputMode};

/// Resolved values keyed by source identifier.
pub type ResolvedSources = HashMap<String, SourceValues>;

/// Resolves slot sources against static pools and the generator registry.
///
/// `style.<field>` and `cta.<field>` read the template's static pools; every
/// other source names a registered generator.
#[derive(Clone, Copy)]
pub struct SourceResolver<'a> {
    registry: &'a GeneratorRegistry,
    services: &'a Services,
}

impl<'a> SourceResolver<'a> {
    /// Resolver over `registry`, building generators from `services`.
    pub fn new(registry: &'a GeneratorRegistry, services: &'a Services) -> Self {
        Self { registry, services }
    }

    /// Resolve every distinct source of `config` once, in first-reference order.
    ///
    /// # Errors
    ///
    /// Fails on the first source that cannot be resolved.
    #[tracing::instrument(skip_all, fields(template = %config.name(), count = *context.count()))]
    pub async fn resolve_all(
        &self,
        config: &TemplateConfig,
        context: &GenerationContext,
        ledger: &mut TokenLedger,
    ) -> TesseraResult<ResolvedSources> {
        let mut resolved = ResolvedSources::new();
        for source in config.sources() {
            let values = self.resolve(source, config, context, ledger).await?;
            tracing::debug!(source, mode = values.mode(), values = values.len(), "Source resolved");
            resolved.insert(source.to_string(), values);
        }
        tracing::info!(sources = resolved.len(), "All sources resolved");
        Ok(resolved)
    }

    /// Resolve a single source for the whole batch.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for unknown sources, missing pools or fields, and
    /// generators returning the wrong number of values. Generator failures
    /// propagate unchanged.
    #[tracing::instrument(skip(self, config, context, ledger), fields(count = *context.count()))]
    pub async fn resolve(
        &self,
        source: &str,
        config: &TemplateConfig,
        context: &GenerationContext,
        ledger: &mut TokenLedger,
    ) -> TesseraResult<SourceValues> {
        let count = *context.count();
        if let Some((family, field)) = source.split_once('.') {
            if let Some(pool) = config.pool(family) {
                return Ok(cycle_pool(source, family, field, pool, count)?);
            }
        }

        let generator = self.registry.create(source, self.services)?;
        let slots: Vec<&Slot> = config.slots_for_source(source).collect();
        if slots.is_empty() {
            return Err(ConfigError::new(format!(
                "No slot in '{}' references source '{}'",
                config.name(),
                source
            ))
            .into());
        }

        if slots.iter().any(|slot| *slot.batch()) {
            tracing::debug!("Batch call");
            let values = call(generator.as_ref(), context, &merged_overlay(&slots), count, ledger).await?;
            if values.len() != count {
                return Err(ConfigError::new(format!(
                    "Generator '{}' returned {} values in batch mode, expected {}",
                    source,
                    values.len(),
                    count
                ))
                .into());
            }
            return Ok(SourceValues::PerCreative(values));
        }

        if generator.output_mode() == OutputMode::Pool {
            tracing::debug!("Pool call");
            let values = call(generator.as_ref(), context, &merged_overlay(&slots), count, ledger).await?;
            if values.is_empty() {
                return Err(ConfigError::new(format!(
                    "Generator '{}' returned an empty pool",
                    source
                ))
                .into());
            }
            return Ok(SourceValues::Pool(values));
        }

        let mut broadcast = HashMap::with_capacity(slots.len());
        for slot in slots {
            let mut values = call(generator.as_ref(), context, slot.config(), 1, ledger).await?;
            if values.len() != 1 {
                return Err(ConfigError::new(format!(
                    "Generator '{}' returned {} values for slot '{}', expected 1",
                    source,
                    values.len(),
                    slot.name()
                ))
                .into());
            }
            broadcast.insert(slot.name().clone(), values.remove(0));
        }
        Ok(SourceValues::Broadcast(broadcast))
    }
}

async fn call(
    generator: &dyn Generator,
    context: &GenerationContext,
    overlay: &JsonMap,
    count: usize,
    ledger: &mut TokenLedger,
) -> TesseraResult<Vec<Value>> {
    let request = GeneratorRequest::builder()
        .topic(context.topic().clone())
        .inputs(context.inputs_with(overlay))
        .options(context.options().clone())
        .count(count)
        .build()
        .map_err(|e| BuilderError::from(e.to_string()))?;
    generator.generate(&request, ledger).await
}

/// Overlays of every slot, later slots winning on key collisions.
fn merged_overlay(slots: &[&Slot]) -> JsonMap {
    let mut merged = JsonMap::new();
    for slot in slots {
        for (key, value) in slot.config() {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

fn cycle_pool(
    source: &str,
    family: &str,
    field: &str,
    pool: &[JsonMap],
    count: usize,
) -> Result<SourceValues, ConfigError> {
    if pool.is_empty() {
        return Err(ConfigError::new(format!(
            "Source '{}' needs a non-empty {} pool",
            source, family
        )));
    }
    let column = pool
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            entry.get(field).cloned().ok_or_else(|| {
                ConfigError::new(format!("{} pool entry {} has no field '{}'", family, i, field))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let values = (0..count).map(|i| column[i % column.len()].clone()).collect();
    Ok(SourceValues::PerCreative(values))
}
