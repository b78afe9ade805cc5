//! Tabular output validation errors.

/// Ways a parsed table can violate the row contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ValidationErrorKind {
    /// Wrong number of recognized rows
    #[display("Expected {expected} rows, got {actual}")]
    RowCount {
        /// Rows required by the caller
        expected: usize,
        /// Rows recognized in the output
        actual: usize,
    },
    /// Row indices are not exactly 1..=expected
    #[display("Expected indices 1-{expected}, got {actual:?}")]
    Indices {
        /// Highest index required
        expected: usize,
        /// Sorted indices that were found
        actual: Vec<usize>,
    },
    /// Expected row count of zero is never satisfiable
    #[display("Expected row count must be at least 1")]
    ZeroRows,
}

/// Structured table parse failure carrying the raw model output.
///
/// The raw text is kept for diagnostics but left out of `Display` so log
/// lines stay short.
///
/// # Examples
///
/// ```
/// use tessera_error::{ValidationError, ValidationErrorKind};
///
/// let err = ValidationError::new(
///     ValidationErrorKind::RowCount { expected: 12, actual: 11 },
///     "1\tonly one row",
/// );
/// assert!(format!("{}", err).contains("Expected 12 rows, got 11"));
/// assert_eq!(err.raw_output(), "1\tonly one row");
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at line {} in {}", kind, line, file)]
pub struct ValidationError {
    /// The specific error condition
    pub kind: ValidationErrorKind,
    raw_output: String,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new ValidationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ValidationErrorKind, raw_output: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            raw_output: raw_output.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// The unparsed text that failed validation.
    pub fn raw_output(&self) -> &str {
        &self.raw_output
    }
}
