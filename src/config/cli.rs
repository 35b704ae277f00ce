use super::toml_config::AppConfig;
use crate::adapters::qr::DEFAULT_QR_ENDPOINT;
use crate::calculators::money::currency::DEFAULT_RATE_ENDPOINT;
use crate::core::ConfigProvider;
use crate::domain::model::Form;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "calcdeck")]
#[command(about = "Everyday calculators from the command line")]
pub struct CliConfig {
    /// Path to a calcdeck.toml file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format: html, text, json or csv
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Directory for attachments such as QR images
    #[arg(long, global = true)]
    pub output_dir: Option<String>,

    /// Use bundled exchange rates and skip remote QR rendering
    #[arg(long, global = true)]
    pub offline: bool,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,

    /// Settings loaded from `--config`, overridden by the flags above.
    #[arg(skip)]
    pub file: AppConfig,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List calculators, optionally for one category
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// Find calculators by name or keyword
    Search { query: String },
    /// Run a calculator and print its card
    Run(RunArgs),
    /// Run a calculator and write every rendering into a zip
    Export {
        #[command(flatten)]
        run: RunArgs,
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Calculator key, e.g. loan-calculator
    pub calculator: String,

    /// Form field as key=value, repeatable
    #[arg(short = 'f', long = "field")]
    pub fields: Vec<String>,

    /// TOML or JSON file with form fields
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Fixed random seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,
}

impl RunArgs {
    /// Input file fields first, then `-f` pairs on top.
    pub fn form(&self) -> Result<Form> {
        let mut form = match &self.input {
            Some(path) => super::read_form_file(path)?,
            None => Form::new(),
        };
        for (key, value) in Form::from_pairs(&self.fields)?.fields() {
            form.insert(key, value);
        }
        Ok(form)
    }
}

impl CliConfig {
    /// Loads the `--config` file when one was given.
    pub fn with_file(mut self) -> Result<Self> {
        if let Some(path) = &self.config {
            tracing::info!("Loading configuration from {}", path.display());
            self.file = AppConfig::from_file(path)?;
        }
        Ok(self)
    }
}

impl ConfigProvider for CliConfig {
    fn output_format(&self) -> &str {
        self.format.as_deref().unwrap_or_else(|| self.file.output_format())
    }

    fn output_dir(&self) -> &str {
        self.output_dir.as_deref().unwrap_or_else(|| self.file.output_dir())
    }

    fn currency_endpoint(&self) -> &str {
        self.file.currency.endpoint.as_deref().unwrap_or(DEFAULT_RATE_ENDPOINT)
    }

    fn qr_endpoint(&self) -> &str {
        self.file.qr.endpoint.as_deref().unwrap_or(DEFAULT_QR_ENDPOINT)
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.file.request_timeout_seconds()
    }

    fn qr_timeout_seconds(&self) -> u64 {
        self.file.qr_timeout_seconds()
    }

    fn offline(&self) -> bool {
        self.offline
    }

    fn currency_enabled(&self) -> bool {
        self.file.currency_enabled()
    }

    fn qr_enabled(&self) -> bool {
        self.file.qr_enabled()
    }

    fn defaults_for(&self, calculator: &str) -> Option<HashMap<String, String>> {
        self.file.defaults_for(calculator)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        self.file.validate()?;
        if let Some(format) = &self.format {
            validation::validate_one_of(
                "--format",
                &format.to_ascii_lowercase(),
                &crate::core::render::OutputFormat::NAMES,
            )?;
        }
        if let Some(dir) = &self.output_dir {
            validation::validate_path("--output-dir", dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_run_command() {
        let config = CliConfig::try_parse_from([
            "calcdeck", "--format", "json", "run", "tip-calculator", "-f", "bill=80", "--field", "tip=15",
        ])
        .unwrap();
        assert_eq!(config.output_format(), "json");
        let Command::Run(args) = &config.command else {
            panic!("expected run");
        };
        let form = args.form().unwrap();
        assert_eq!(form.get("bill"), Some("80"));
        assert_eq!(form.get("tip"), Some("15"));
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[output]\nformat = \"html\"\ndirectory = \"from-file\"\n").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = CliConfig::try_parse_from(["calcdeck", "--config", path.as_str(), "--output-dir", "cli", "list"])
            .unwrap()
            .with_file()
            .unwrap();
        assert_eq!(config.output_format(), "html");
        assert_eq!(config.output_dir(), "cli");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_format_flag() {
        let config = CliConfig::try_parse_from(["calcdeck", "--format", "pdf", "search", "loan"]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_export_requires_out() {
        assert!(CliConfig::try_parse_from(["calcdeck", "export", "bmi-calculator"]).is_err());
    }
}
