use crate::adapters::qr::DEFAULT_QR_ENDPOINT;
use crate::calculators;
use crate::calculators::money::currency::DEFAULT_RATE_ENDPOINT;
use crate::core::render::OutputFormat;
use crate::core::ConfigProvider;
use crate::utils::error::{CalcError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// `calcdeck.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub output: OutputConfig,
    pub currency: ServiceConfig,
    pub qr: ServiceConfig,
    /// Calculator key (or its short name) to default form fields.
    pub defaults: HashMap<String, HashMap<String, toml::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: String,
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            directory: ".".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub enabled: Option<bool>,
}

impl ServiceConfig {
    fn timeout(&self) -> u64 {
        self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        tracing::debug!("Loaded config from {}", path.as_ref().display());
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        let mut config: Self =
            toml::from_str(&processed).map_err(|e| CalcError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;
        config.defaults = resolve_default_keys(std::mem::take(&mut config.defaults))?;
        Ok(config)
    }

    /// 替換環境變數, e.g. `${CALCDECK_RATES_URL}`. Unset variables are left as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let name = &caps[1];
                std::env::var(name).unwrap_or_else(|_| format!("${{{}}}", name))
            })
            .into_owned()
    }

    /// Configured field defaults for one calculator.
    pub fn default_fields(&self, calculator: &str) -> Option<HashMap<String, String>> {
        self.defaults.get(calculator).map(|fields| {
            fields
                .iter()
                .map(|(name, value)| (name.clone(), scalar_to_string(value)))
                .collect()
        })
    }
}

/// `tip` resolves to `tip-calculator`, `unit` to `unit-converter`.
fn resolve_key(name: &str) -> Option<&'static str> {
    let exact = calculators::find(name).map(|c| c.key());
    exact.or_else(|| {
        ["calculator", "converter"]
            .iter()
            .find_map(|suffix| calculators::find(&format!("{}-{}", name, suffix)))
            .map(|c| c.key())
    })
}

fn resolve_default_keys(
    defaults: HashMap<String, HashMap<String, toml::Value>>,
) -> Result<HashMap<String, HashMap<String, toml::Value>>> {
    let mut resolved = HashMap::new();
    for (name, fields) in defaults {
        let key = resolve_key(&name).ok_or_else(|| CalcError::InvalidConfigValueError {
            field: format!("defaults.{}", name),
            value: name.clone(),
            reason: "No calculator with that name".to_string(),
        })?;
        for (field, value) in &fields {
            if value.is_table() || value.is_array() {
                return Err(CalcError::InvalidConfigValueError {
                    field: format!("defaults.{}.{}", name, field),
                    value: value.to_string(),
                    reason: "Defaults must be plain strings, numbers or booleans".to_string(),
                });
            }
        }
        resolved
            .entry(key.to_string())
            .or_insert_with(HashMap::new)
            .extend(fields);
    }
    Ok(resolved)
}

pub(crate) fn scalar_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_one_of("output.format", &self.output.format.to_ascii_lowercase(), &OutputFormat::NAMES)?;
        validation::validate_path("output.directory", &self.output.directory)?;

        if let Some(endpoint) = &self.currency.endpoint {
            validation::validate_url("currency.endpoint", endpoint)?;
        }
        if let Some(endpoint) = &self.qr.endpoint {
            validation::validate_url("qr.endpoint", endpoint)?;
        }
        validation::validate_range("currency.timeout_seconds", self.currency.timeout(), 1, 120)?;
        validation::validate_range("qr.timeout_seconds", self.qr.timeout(), 1, 120)?;
        Ok(())
    }
}

impl ConfigProvider for AppConfig {
    fn output_format(&self) -> &str {
        &self.output.format
    }

    fn output_dir(&self) -> &str {
        &self.output.directory
    }

    fn currency_endpoint(&self) -> &str {
        self.currency.endpoint.as_deref().unwrap_or(DEFAULT_RATE_ENDPOINT)
    }

    fn qr_endpoint(&self) -> &str {
        self.qr.endpoint.as_deref().unwrap_or(DEFAULT_QR_ENDPOINT)
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.currency.timeout()
    }

    fn qr_timeout_seconds(&self) -> u64 {
        self.qr.timeout()
    }

    fn offline(&self) -> bool {
        false
    }

    fn currency_enabled(&self) -> bool {
        self.currency.is_enabled()
    }

    fn qr_enabled(&self) -> bool {
        self.qr.is_enabled()
    }

    fn defaults_for(&self, calculator: &str) -> Option<HashMap<String, String>> {
        self.default_fields(calculator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let config = AppConfig::from_toml_str(
            r#"
[output]
format = "json"
directory = "./out"

[currency]
endpoint = "https://rates.example.com/latest"
timeout_seconds = 3

[qr]
enabled = false

[defaults.tip]
tip = "18"
people = 2

[defaults.loan-calculator]
rate = 6.5
"#,
        )
        .unwrap();

        assert_eq!(config.output_format(), "json");
        assert_eq!(config.currency_endpoint(), "https://rates.example.com/latest");
        assert_eq!(config.request_timeout_seconds(), 3);
        assert_eq!(config.qr_endpoint(), DEFAULT_QR_ENDPOINT);
        assert!(!config.qr_enabled());

        let tip = config.defaults_for("tip-calculator").unwrap();
        assert_eq!(tip.get("tip").map(String::as_str), Some("18"));
        assert_eq!(tip.get("people").map(String::as_str), Some("2"));
        assert_eq!(
            config.defaults_for("loan-calculator").unwrap().get("rate").map(String::as_str),
            Some("6.5")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.output_format(), "text");
        assert_eq!(config.currency_endpoint(), DEFAULT_RATE_ENDPOINT);
        assert_eq!(config.qr_timeout_seconds(), DEFAULT_TIMEOUT_SECONDS);
        assert!(config.currency_enabled());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CALCDECK_TEST_RATES", "https://test.rates.example");
        let config = AppConfig::from_toml_str(
            r#"
[currency]
endpoint = "${CALCDECK_TEST_RATES}"
"#,
        )
        .unwrap();
        assert_eq!(config.currency_endpoint(), "https://test.rates.example");
        std::env::remove_var("CALCDECK_TEST_RATES");
    }

    #[test]
    fn test_unset_variable_is_kept_and_rejected() {
        let config = AppConfig::from_toml_str(
            r#"
[qr]
endpoint = "${CALCDECK_SURELY_UNSET_VAR}"
"#,
        )
        .unwrap();
        assert_eq!(config.qr_endpoint(), "${CALCDECK_SURELY_UNSET_VAR}");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_errors() {
        let bad_format = AppConfig::from_toml_str("[output]\nformat = \"pdf\"").unwrap();
        assert!(bad_format.validate().is_err());

        let bad_timeout = AppConfig::from_toml_str("[currency]\ntimeout_seconds = 0").unwrap();
        assert!(bad_timeout.validate().is_err());
    }

    #[test]
    fn test_unknown_defaults_section() {
        let err = AppConfig::from_toml_str("[defaults.teleporter]\nspeed = 1").unwrap_err();
        assert!(matches!(err, CalcError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[output]\nformat = \"html\"\ndirectory = \"reports\"\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output_format(), "html");
        assert_eq!(config.output_dir(), "reports");
    }
}
