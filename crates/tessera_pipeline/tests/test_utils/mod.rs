//! Shared test utilities.

pub mod mock_text;

pub use mock_text::{MockResponse, MockTextBackend};

/// A plain table with rows `1..=count`, each tagged with `label`.
pub fn plain_table(label: &str, count: usize) -> String {
    let mut lines = vec![
        "### Desk Lamps — TSV".to_string(),
        String::new(),
        "Variation #\tText".to_string(),
    ];
    lines.extend((1..=count).map(|i| format!("{}\t{} line {}", i, label, i)));
    lines.join("\n")
}

/// A paired table with rows `1..=count`.
pub fn paired_table(label: &str, count: usize) -> String {
    let mut lines = vec!["Variation #\tHeader\tMain Text".to_string()];
    lines.extend((1..=count).map(|i| format!("{}\t{} header {}\t{} body {}", i, label, i, label, i)));
    lines.join("\n")
}
