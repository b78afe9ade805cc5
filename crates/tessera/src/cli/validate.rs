//! Table validation command handler.

use std::path::Path;
use tessera::{
    ConfigError, PairedRow, TableRow, TabularRow, TesseraResult, format_table, parse_table,
};

/// Parse a table file, printing the normalized table on success.
pub fn run_validate(file: &Path, count: usize, paired: bool) -> TesseraResult<()> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| ConfigError::new(format!("Failed to read {}: {}", file.display(), e)))?;
    let title = file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let table = if paired {
        normalize::<PairedRow>(&title, &content, count)?
    } else {
        normalize::<TableRow>(&title, &content, count)?
    };
    println!("{}", table);
    Ok(())
}

fn normalize<R: TabularRow>(title: &str, content: &str, count: usize) -> TesseraResult<String> {
    let rows = parse_table::<R>(content, count)?;
    tracing::info!(rows = rows.len(), mode = %R::MODE, "Table valid");
    Ok(format_table(title, &rows))
}
