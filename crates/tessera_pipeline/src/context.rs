//! Product context attached to the first stage.

/// Products the creator stage should weave into some of its lines.
///
/// # Examples
///
/// ```
/// use tessera_pipeline::ProductContext;
///
/// let context = ProductContext::new(vec!["Arc Lamp".into(), "Desk Light".into()]);
/// let block = context.render(12);
/// assert!(block.starts_with("Product Context (use in exactly 4 of 12 lines):"));
/// assert!(block.ends_with("- Desk Light"));
/// ```
#[derive(Debug, Clone, PartialEq, derive_getters::Getters)]
pub struct ProductContext {
    /// Product names
    names: Vec<String>,
    /// Fraction of lines that should mention a product
    #[getter(copy)]
    share: f64,
}

impl ProductContext {
    /// Context mentioning products in a third of the lines.
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names,
            share: 1.0 / 3.0,
        }
    }

    /// Override the share of lines.
    pub fn with_share(mut self, share: f64) -> Self {
        self.share = share;
        self
    }

    /// Whether there is nothing to mention.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Lines that should mention a product out of `count`.
    pub fn mentions(&self, count: usize) -> usize {
        let wanted = (count as f64 * self.share - 1e-9).ceil();
        (wanted.max(1.0) as usize).min(count)
    }

    /// Render the context block for a request of `count` lines.
    pub fn render(&self, count: usize) -> String {
        let mut lines = vec![format!(
            "Product Context (use in exactly {} of {} lines):",
            self.mentions(count),
            count
        )];
        lines.extend(self.names.iter().map(|name| format!("- {}", name)));
        lines.join("\n")
    }
}
