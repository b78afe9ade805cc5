//! Built-in template configurations.

use tessera_core::TemplateConfig;
use tessera_error::ConfigError;

const PRODUCT_CLUSTER: &str = include_str!("../templates/product_cluster.toml");
const PRODUCT_GRID: &str = include_str!("../templates/product_grid.toml");
const HALF_HALF: &str = include_str!("../templates/half_half.toml");

const BUILTINS: &[(&str, &str)] = &[
    ("product_cluster", PRODUCT_CLUSTER),
    ("product_grid", PRODUCT_GRID),
    ("half_half", HALF_HALF),
];

/// Names of the built-in templates.
pub fn builtin_names() -> Vec<&'static str> {
    BUILTINS.iter().map(|(name, _)| *name).collect()
}

/// Parse the built-in template called `name`.
///
/// # Errors
///
/// Returns `ConfigError` if no built-in has that name.
///
/// # Examples
///
/// ```
/// use tessera_engine::builtin_template;
///
/// let grid = builtin_template("product_grid").unwrap();
/// assert_eq!(grid.style_pool().len(), 12);
/// assert!(builtin_template("mosaic").is_err());
/// ```
pub fn builtin_template(name: &str) -> Result<TemplateConfig, ConfigError> {
    let (_, source) = BUILTINS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .ok_or_else(|| ConfigError::new(format!("No built-in template named '{}'", name)))?;
    source.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_builtin_parses() {
        for name in builtin_names() {
            let config = builtin_template(name).unwrap();
            assert_eq!(config.name(), name);
            assert_eq!(config.variants_for(12).unwrap().len(), 12);
        }
    }

    #[test]
    fn test_product_cluster_alternates() {
        let config = builtin_template("product_cluster").unwrap();
        let labels: Vec<&str> = config
            .variants_for(4)
            .unwrap()
            .into_iter()
            .map(|v| v.label().as_str())
            .collect();
        assert_eq!(labels, vec!["dark", "light", "dark", "light"]);
    }

    #[test]
    fn test_product_grid_sources() {
        let config = builtin_template("product_grid").unwrap();
        let sources = config.sources();
        assert_eq!(sources[0], "text.main_text");
        assert_eq!(sources[1], "image.product");
        assert_eq!(config.slots_for_source("image.product").count(), 8);
        assert!(sources.contains(&"cta.button_image"));
    }
}
