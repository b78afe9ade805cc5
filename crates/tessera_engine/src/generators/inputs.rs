//! Input keys read by the built-in generators.

use serde_json::Value;
use tessera_error::ConfigError;
use tessera_interface::GeneratorRequest;

pub const MAIN_LINES: &str = "main_lines";
pub const PRODUCT_NAMES: &str = "product_names";
pub const PRODUCT_URLS: &str = "product_urls";
pub const PRODUCT_IMAGE_URLS: &str = "product_image_urls";
pub const ASPECT_RATIO: &str = "aspect_ratio";
pub const IS_PEOPLE_MODE: &str = "is_people_mode";
pub const INPUT_INDEX: &str = "input_index";
pub const REMOVE_BG: &str = "remove_bg";
pub const CROP: &str = "crop";

/// A list of strings: a JSON array, or one string split on newlines.
pub fn string_list(request: &GeneratorRequest, key: &str) -> Result<Option<Vec<String>>, ConfigError> {
    let Some(value) = request.inputs().get(key) else {
        return Ok(None);
    };
    let items = match value {
        Value::Null => return Ok(None),
        Value::String(s) => s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    ConfigError::new(format!("Input '{}' must contain only strings", key))
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => {
            return Err(ConfigError::new(format!(
                "Input '{}' must be a list of strings",
                key
            )));
        }
    };
    Ok(Some(items))
}

/// A non-negative integer, given as a number or numeric string.
pub fn index(request: &GeneratorRequest, key: &str) -> Result<Option<usize>, ConfigError> {
    let parsed = match request.inputs().get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_u64().map(|n| n as usize),
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(_) => None,
    };
    parsed
        .map(Some)
        .ok_or_else(|| ConfigError::new(format!("Input '{}' must be a non-negative integer", key)))
}

/// A boolean input, falling back to `default`.
pub fn flag(request: &GeneratorRequest, key: &str, default: bool) -> bool {
    match request.inputs().get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => true,
            "false" | "no" | "0" => false,
            _ => default,
        },
        _ => default,
    }
}
