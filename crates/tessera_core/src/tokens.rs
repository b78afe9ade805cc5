//! Token accounting.

use serde::{Deserialize, Serialize};

/// Token counts reported for one model call.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters,
)]
pub struct TokenUsage {
    /// Tokens in the prompt
    prompt_tokens: u64,
    /// Tokens in the completion
    completion_tokens: u64,
}

impl TokenUsage {
    /// Usage from prompt and completion counts.
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    /// Prompt plus completion tokens.
    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Text returned by a text backend with its usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct TextCompletion {
    /// Completion text
    text: String,
    /// Token usage of the call
    usage: TokenUsage,
}

impl TextCompletion {
    /// Completion from text and usage.
    pub fn new(text: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            text: text.into(),
            usage,
        }
    }
}

/// Running token totals for a generation session.
///
/// Owned by the caller and passed down explicitly; totals only grow.
///
/// # Examples
///
/// ```
/// use tessera_core::{TokenLedger, TokenUsage};
///
/// let mut ledger = TokenLedger::default();
/// ledger.record(&TokenUsage::new(120, 300));
/// ledger.record(&TokenUsage::new(80, 200));
///
/// assert_eq!(*ledger.calls(), 2);
/// assert_eq!(*ledger.prompt_tokens(), 200);
/// assert_eq!(ledger.total(), 700);
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters,
)]
pub struct TokenLedger {
    /// Model calls recorded
    calls: u64,
    /// Sum of prompt tokens
    prompt_tokens: u64,
    /// Sum of completion tokens
    completion_tokens: u64,
}

impl TokenLedger {
    /// Add one call's usage.
    pub fn record(&mut self, usage: &TokenUsage) {
        self.calls += 1;
        self.prompt_tokens += usage.prompt_tokens;
        self.completion_tokens += usage.completion_tokens;
    }

    /// Fold another ledger into this one.
    pub fn absorb(&mut self, other: &TokenLedger) {
        self.calls += other.calls;
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
    }

    /// Prompt plus completion tokens.
    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}
