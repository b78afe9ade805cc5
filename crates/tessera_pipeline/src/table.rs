//! Tabular output contract between pipeline stages.
//!
//! Models answer with numbered rows, one creative per row:
//!
//! ```text
//! ### Desk Lamps — TSV
//!
//! Variation #	Text
//! 1	Light that follows your focus
//! 2	...
//! ```
//!
//! Parsing is lenient about surrounding noise (blank lines, markdown
//! headings, header rows, stray prose) and strict about the result: exactly
//! `expected` rows whose indices are exactly `1..=expected`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tessera_error::{ValidationError, ValidationErrorKind};

static SINGLE_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(.+)$").expect("Valid row pattern"));

/// Row layout of a table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, Default,
)]
#[strum(serialize_all = "lowercase")]
pub enum TableMode {
    /// `index<TAB>text`
    #[default]
    Plain,
    /// `index<TAB>header<TAB>main text`
    Paired,
}

/// A row type the parser can recognize and the formatter can write.
pub trait TabularRow: Sized + Clone + Send + Sync {
    /// Layout this row type belongs to.
    const MODE: TableMode;

    /// Fixed header line written after the title.
    const HEADER: &'static str;

    /// Recognize a trimmed data line.
    fn parse_line(line: &str) -> Option<Self>;

    /// Whether a lowercased, trimmed line is a header row.
    fn is_header(lower: &str) -> bool;

    /// One-based row index.
    fn index(&self) -> usize;

    /// Tab-separated fields after the index.
    fn fields(&self) -> String;
}

/// One numbered line of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct TableRow {
    /// One-based position
    #[getter(copy)]
    index: usize,
    /// Row text
    text: String,
}

impl TableRow {
    /// Row from index and text.
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Take the row text.
    pub fn into_text(self) -> String {
        self.text
    }
}

impl TabularRow for TableRow {
    const MODE: TableMode = TableMode::Plain;
    const HEADER: &'static str = "Variation #\tText";

    fn parse_line(line: &str) -> Option<Self> {
        let captures = SINGLE_ROW.captures(line)?;
        let index = captures.get(1)?.as_str().parse().ok()?;
        let text = captures.get(2)?.as_str().trim();
        if text.is_empty() {
            return None;
        }
        Some(Self::new(index, text))
    }

    fn is_header(lower: &str) -> bool {
        (lower.contains("variation") && (lower.contains('#') || lower.contains("text")))
            || (lower.starts_with("index") && lower.contains("text"))
    }

    fn index(&self) -> usize {
        self.index
    }

    fn fields(&self) -> String {
        self.text.clone()
    }
}

/// One numbered header/main-text pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct PairedRow {
    /// One-based position
    #[getter(copy)]
    index: usize,
    /// Header line
    header: String,
    /// Body text
    main_text: String,
}

impl PairedRow {
    /// Row from its parts.
    pub fn new(index: usize, header: impl Into<String>, main_text: impl Into<String>) -> Self {
        Self {
            index,
            header: header.into(),
            main_text: main_text.into(),
        }
    }
}

impl TabularRow for PairedRow {
    const MODE: TableMode = TableMode::Paired;
    const HEADER: &'static str = "Variation #\tHeader\tMain Text";

    fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.split('\t');
        let index = parts.next()?.trim().parse().ok()?;
        let header = parts.next()?.trim();
        let main_text = parts.next()?.trim();
        if header.is_empty() || main_text.is_empty() {
            return None;
        }
        Some(Self::new(index, header, main_text))
    }

    fn is_header(lower: &str) -> bool {
        (lower.contains("variation") || lower.starts_with("index")) && lower.contains("header")
    }

    fn index(&self) -> usize {
        self.index
    }

    fn fields(&self) -> String {
        format!("{}\t{}", self.header, self.main_text)
    }
}

/// Parse `content` into exactly `expected` rows sorted by index.
///
/// # Errors
///
/// Returns `ValidationError` (carrying `content`) when the recognized rows
/// are not exactly the indices `1..=expected`.
///
/// # Examples
///
/// ```
/// use tessera_pipeline::{TableRow, parse_table};
///
/// let rows: Vec<TableRow> = parse_table("1\tFoo\n2\tBar\n3\tBaz", 3).unwrap();
/// assert_eq!(rows[2].text(), "Baz");
///
/// let err = parse_table::<TableRow>("1\tFoo\n2\tBar\n2\tBaz", 3).unwrap_err();
/// assert!(format!("{}", err).contains("Expected indices 1-3"));
/// ```
pub fn parse_table<R: TabularRow>(content: &str, expected: usize) -> Result<Vec<R>, ValidationError> {
    if expected == 0 {
        return Err(ValidationError::new(ValidationErrorKind::ZeroRows, content));
    }

    let mut rows: Vec<R> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| starts_with_digit(line) || !R::is_header(&line.to_lowercase()))
        .filter_map(R::parse_line)
        .filter(|row| (1..=expected).contains(&row.index()))
        .collect();

    if rows.len() != expected {
        return Err(ValidationError::new(
            ValidationErrorKind::RowCount {
                expected,
                actual: rows.len(),
            },
            content,
        ));
    }

    rows.sort_by_key(|row| row.index());
    let indices: Vec<usize> = rows.iter().map(|row| row.index()).collect();
    if !indices.iter().copied().eq(1..=expected) {
        return Err(ValidationError::new(
            ValidationErrorKind::Indices {
                expected,
                actual: indices,
            },
            content,
        ));
    }

    Ok(rows)
}

fn starts_with_digit(line: &str) -> bool {
    line.starts_with(|c: char| c.is_ascii_digit())
}

/// Render rows as the table handed to the next stage.
///
/// # Examples
///
/// ```
/// use tessera_pipeline::{TableRow, format_table};
///
/// let table = format_table("Desk Lamps", &[TableRow::new(1, "Glow up")]);
/// assert_eq!(table, "### Desk Lamps — TSV\n\nVariation #\tText\n1\tGlow up");
/// ```
pub fn format_table<R: TabularRow>(topic: &str, rows: &[R]) -> String {
    let mut lines = vec![
        format!("### {} — TSV", topic),
        String::new(),
        R::HEADER.to_string(),
    ];
    lines.extend(
        rows.iter()
            .map(|row| format!("{}\t{}", row.index(), row.fields())),
    );
    lines.join("\n")
}
