//! Listing command handlers.

use tessera::{GeneratorRegistry, TesseraResult, builtin_names, builtin_template};

/// Print each built-in template with its variants and slot count.
pub fn list_templates() -> TesseraResult<()> {
    for name in builtin_names() {
        let template = builtin_template(name)?;
        let variants: Vec<&str> = template
            .variants()
            .iter()
            .map(|v| v.label().as_str())
            .collect();
        println!(
            "{:<16} {:>2} slots  variants: {}",
            name,
            template.slots().len(),
            variants.join(", ")
        );
    }
    Ok(())
}

/// Print every registered generator.
pub fn list_generators() -> TesseraResult<()> {
    for info in GeneratorRegistry::builtin().list() {
        println!(
            "{:<16} {:<6} {:<10} {}",
            info.name(),
            info.capability().to_string(),
            info.output_mode().to_string(),
            info.description()
        );
        if !info.inputs().is_empty() {
            println!("{:<16} inputs: {}", "", info.inputs().join(", "));
        }
    }
    Ok(())
}
