#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command, LogFormat, RunArgs};
pub use toml_config::AppConfig;

use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use std::path::Path;

/// Reads form fields from a flat `.toml` or `.json` file.
pub fn read_form_file(path: &Path) -> Result<Form> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let mut form = Form::new();
    if is_json {
        let value: serde_json::Value = serde_json::from_str(&content)?;
        let object = value.as_object().ok_or_else(|| CalcError::ConfigError {
            message: format!("{} must contain a JSON object of form fields", path.display()),
        })?;
        for (key, value) in object {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(_) | serde_json::Value::Bool(_) => value.to_string(),
                serde_json::Value::Null => String::new(),
                _ => return Err(nested_field(path, key)),
            };
            form.insert(key, text);
        }
    } else {
        let table: toml::Table = toml::from_str(&content).map_err(|e| CalcError::ConfigValidationError {
            field: path.display().to_string(),
            message: format!("TOML parsing error: {}", e),
        })?;
        for (key, value) in &table {
            if value.is_table() || value.is_array() {
                return Err(nested_field(path, key));
            }
            form.insert(key, toml_config::scalar_to_string(value));
        }
    }
    tracing::debug!("Read {} fields from {}", form.len(), path.display());
    Ok(form)
}

fn nested_field(path: &Path, key: &str) -> CalcError {
    CalcError::InvalidConfigValueError {
        field: key.to_string(),
        value: path.display().to_string(),
        reason: "Form fields must be plain values".to_string(),
    }
}
