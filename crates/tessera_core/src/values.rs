//! Resolved source values.

use serde_json::Value;
use std::collections::HashMap;

/// The values one source resolved to for a whole batch.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceValues {
    /// One value per referencing slot (keyed by slot name), shared by every creative
    Broadcast(HashMap<String, Value>),
    /// Exactly one value per creative position
    PerCreative(Vec<Value>),
    /// Non-empty pool indexed by smart distribution
    Pool(Vec<Value>),
}

impl SourceValues {
    /// Short label used in logs.
    pub fn mode(&self) -> &'static str {
        match self {
            SourceValues::Broadcast(_) => "broadcast",
            SourceValues::PerCreative(_) => "per_creative",
            SourceValues::Pool(_) => "pool",
        }
    }

    /// Number of values held.
    pub fn len(&self) -> usize {
        match self {
            SourceValues::Broadcast(values) => values.len(),
            SourceValues::PerCreative(values) | SourceValues::Pool(values) => values.len(),
        }
    }

    /// Whether no values are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
