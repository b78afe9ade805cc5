//! System prompts for each stage and table mode.

use crate::TableMode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use strum::IntoEnumIterator;
use tessera_error::{PipelineError, PipelineErrorKind, TesseraResult};
use tracing::{debug, instrument};

/// Pipeline stages in execution order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    /// Writes the initial table
    Creator,
    /// Refines the creator's table
    Editor,
    /// Final polish
    FinalToucher,
}

impl Stage {
    /// Prompt file name for `mode` (e.g. `paired_editor.txt`).
    pub fn prompt_file(&self, mode: TableMode) -> String {
        match mode {
            TableMode::Plain => format!("{}.txt", self),
            TableMode::Paired => format!("paired_{}.txt", self),
        }
    }
}

fn bundled(stage: Stage, mode: TableMode) -> &'static str {
    match (mode, stage) {
        (TableMode::Plain, Stage::Creator) => include_str!("../prompts/creator.txt"),
        (TableMode::Plain, Stage::Editor) => include_str!("../prompts/editor.txt"),
        (TableMode::Plain, Stage::FinalToucher) => include_str!("../prompts/final_toucher.txt"),
        (TableMode::Paired, Stage::Creator) => include_str!("../prompts/paired_creator.txt"),
        (TableMode::Paired, Stage::Editor) => include_str!("../prompts/paired_editor.txt"),
        (TableMode::Paired, Stage::FinalToucher) => {
            include_str!("../prompts/paired_final_toucher.txt")
        }
    }
}

/// System prompts keyed by stage and mode.
///
/// # Examples
///
/// ```
/// use tessera_pipeline::{PromptSet, Stage, TableMode};
///
/// let prompts = PromptSet::bundled();
/// assert!(prompts.get(Stage::Creator, TableMode::Plain).contains("CREATOR"));
/// assert!(prompts.get(Stage::Editor, TableMode::Paired).contains("Header"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    prompts: HashMap<(Stage, TableMode), String>,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self::bundled()
    }
}

impl PromptSet {
    /// Prompts compiled into the crate.
    pub fn bundled() -> Self {
        let prompts = [TableMode::Plain, TableMode::Paired]
            .into_iter()
            .flat_map(|mode| Stage::iter().map(move |stage| (stage, mode)))
            .map(|(stage, mode)| ((stage, mode), bundled(stage, mode).trim().to_string()))
            .collect();
        Self { prompts }
    }

    /// Bundled prompts overridden by `<dir>/<stage>.txt` files where present.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError` if a present file cannot be read or is empty.
    #[instrument(skip(dir), fields(dir = %dir.display()))]
    pub fn from_dir(dir: &Path) -> TesseraResult<Self> {
        let mut set = Self::bundled();
        for ((stage, mode), prompt) in set.prompts.iter_mut() {
            let path = dir.join(stage.prompt_file(*mode));
            if !path.exists() {
                continue;
            }
            let content = std::fs::read_to_string(&path).map_err(|e| {
                PipelineError::new(PipelineErrorKind::Prompt {
                    stage: stage.to_string(),
                    message: format!("Failed to read {}: {}", path.display(), e),
                })
            })?;
            let content = content.trim();
            if content.is_empty() {
                return Err(PipelineError::new(PipelineErrorKind::Prompt {
                    stage: stage.to_string(),
                    message: format!("{} is empty", path.display()),
                })
                .into());
            }
            debug!(stage = %stage, mode = %mode, path = %path.display(), "Prompt overridden");
            *prompt = content.to_string();
        }
        Ok(set)
    }

    /// Replace one prompt.
    pub fn with_prompt(mut self, stage: Stage, mode: TableMode, prompt: impl Into<String>) -> Self {
        self.prompts.insert((stage, mode), prompt.into());
        self
    }

    /// Prompt for a stage and mode.
    pub fn get(&self, stage: Stage, mode: TableMode) -> &str {
        self.prompts
            .get(&(stage, mode))
            .map(String::as_str)
            .unwrap_or_else(|| bundled(stage, mode))
    }
}
