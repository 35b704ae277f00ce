use crate::adapters::LocalStorage;
use crate::calculators;
use crate::config::{CliConfig, Command, RunArgs};
use crate::core::render::{self, OutputFormat};
use crate::core::{catalog, CalcEngine, Card, ConfigProvider, Env, Storage};
use crate::utils::error::{CalcError, Result};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

/// Runs one subcommand and returns what should go to stdout.
pub async fn execute(config: &CliConfig) -> Result<String> {
    match &config.command {
        Command::List { category } => list(category.as_deref()),
        Command::Search { query } => Ok(search(query)),
        Command::Run(args) => run(config, args).await,
        Command::Export { run, out } => export(config, run, out).await,
    }
}

pub fn list(category: Option<&str>) -> Result<String> {
    let categories = match category {
        Some(id) => vec![catalog::category(id).ok_or_else(|| CalcError::InvalidConfigValueError {
            field: "--category".to_string(),
            value: id.to_string(),
            reason: format!(
                "Valid categories: {}",
                catalog::categories().iter().map(|c| c.id).collect::<Vec<_>>().join(", ")
            ),
        })?],
        None => catalog::categories().iter().collect(),
    };

    let mut out = String::new();
    for category in categories {
        let _ = writeln!(out, "{} ({})", category.label, category.id);
        for info in category.calculators {
            let _ = writeln!(out, "  {:<36} {}", info.key(), info.description);
        }
    }
    Ok(out)
}

pub fn search(query: &str) -> String {
    let hits = catalog::search(query);
    if hits.is_empty() {
        return format!("No calculators match '{}'.\n", query.trim());
    }
    let mut out = String::new();
    for info in hits {
        let _ = writeln!(out, "{:<36} {}", info.key(), info.name);
    }
    out
}

async fn run_card(config: &CliConfig, args: &RunArgs) -> Result<(&'static str, Card)> {
    let key = calculators::find(&args.calculator)
        .map(|c| c.key())
        .ok_or_else(|| CalcError::UnknownCalculator {
            key: args.calculator.clone(),
        })?;

    let mut env = Env::from_config(config)?;
    if let Some(seed) = args.seed {
        env = env.with_seed(seed);
    }
    let defaults = config
        .defaults_for(key)
        .map(|fields| HashMap::from([(key.to_string(), fields)]))
        .unwrap_or_default();
    let engine = CalcEngine::new(env).with_defaults(defaults);
    let card = engine.run(key, args.form()?).await?;
    Ok((key, card))
}

pub async fn run(config: &CliConfig, args: &RunArgs) -> Result<String> {
    let format: OutputFormat = config.output_format().parse()?;
    let (_, card) = run_card(config, args).await?;

    if !card.attachments.is_empty() {
        let storage = LocalStorage::new(config.output_dir().to_string());
        for attachment in &card.attachments {
            storage.write_file(&attachment.file_name, &attachment.bytes).await?;
            tracing::info!(
                "Saved {} to {}",
                attachment.file_name,
                storage.resolve(&attachment.file_name).display()
            );
        }
    }

    render::render(&card, format)
}

pub async fn export(config: &CliConfig, args: &RunArgs, out: &Path) -> Result<String> {
    let (key, card) = run_card(config, args).await?;
    let bytes = render::bundle(&card, key)?;

    let path = out.to_string_lossy();
    LocalStorage::new(".".to_string()).write_file(&path, &bytes).await?;
    tracing::info!("Exported {} to {}", key, path);
    Ok(format!("Wrote {} ({} bytes)\n", path, bytes.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> CliConfig {
        CliConfig::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_list_one_category() {
        let out = list(Some("health")).unwrap();
        assert!(out.starts_with("Health"));
        assert!(out.contains("bmi-calculator"));
        assert!(!out.contains("loan-calculator"));
        assert!(list(Some("garden")).is_err());
    }

    #[test]
    fn test_search_miss() {
        assert_eq!(search("  zzz  "), "No calculators match 'zzz'.\n");
        assert!(search("mortgage").contains("mortgage-calculator"));
    }

    #[tokio::test]
    async fn test_run_prints_json_card() {
        let config = cli(&[
            "calcdeck", "--offline", "--format", "json", "run", "tip-calculator", "-f", "bill=50", "-f", "tip=20",
        ]);
        let out = execute(&config).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["tone"], "info");
    }

    #[tokio::test]
    async fn test_unknown_calculator_is_an_error() {
        let config = cli(&["calcdeck", "--offline", "run", "teleporter"]);
        let err = execute(&config).await.unwrap_err();
        assert!(matches!(err, CalcError::UnknownCalculator { .. }));
    }

    #[tokio::test]
    async fn test_export_writes_zip() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("bmi.zip");
        let out_arg = out.to_string_lossy().to_string();
        let config = cli(&[
            "calcdeck", "--offline", "export", "bmi-calculator", "-f", "height=175", "-f", "weight=70", "--out",
            out_arg.as_str(),
        ]);
        let message = execute(&config).await.unwrap();
        assert!(message.starts_with("Wrote "));

        let archive = zip::ZipArchive::new(std::fs::File::open(&out).unwrap()).unwrap();
        let names: Vec<_> = archive.file_names().map(String::from).collect();
        assert!(names.contains(&"bmi-calculator.json".to_string()));
    }
}
