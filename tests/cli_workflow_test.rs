use calcdeck::app;
use calcdeck::utils::validation::Validate;
use calcdeck::CliConfig;
use clap::Parser;
use httpmock::prelude::*;
use std::io::{Read, Write};
use tempfile::{NamedTempFile, TempDir};

fn cli(args: &[&str]) -> CliConfig {
    let config = CliConfig::try_parse_from(args).unwrap().with_file().unwrap();
    config.validate().unwrap();
    config
}

#[tokio::test]
async fn test_config_defaults_feed_the_form() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"[output]\nformat = \"json\"\n\n[defaults.tip]\ntip = \"20\"\npeople = 4\n")
        .unwrap();
    let path = file.path().to_string_lossy().to_string();

    let config = cli(&["calcdeck", "--offline", "--config", path.as_str(), "run", "tip-calculator", "-f", "bill=100"]);
    let out = app::execute(&config).await.unwrap();
    let card: serde_json::Value = serde_json::from_str(&out).unwrap();

    let stats = card["stats"].as_array().unwrap();
    let per_person = stats.iter().find(|s| s["label"] == "Per person").unwrap();
    assert_eq!(per_person["value"], "$30.00");
}

#[tokio::test]
async fn test_input_file_and_text_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bmi.toml");
    std::fs::write(&input, "height = 175\nweight = 70\n").unwrap();
    let input_arg = input.to_string_lossy().to_string();

    let config = cli(&["calcdeck", "--offline", "run", "bmi-calculator", "--input", input_arg.as_str()]);
    let out = app::execute(&config).await.unwrap();
    assert!(out.contains("22.9"));
    assert!(out.contains("Healthy weight"));
}

#[tokio::test]
async fn test_rejected_input_still_renders() {
    let config = cli(&["calcdeck", "--offline", "--format", "html", "run", "loan-calculator", "-f", "amount=-5"]);
    let out = app::execute(&config).await.unwrap();
    assert!(out.contains("class=\"card error\""));
}

#[tokio::test]
async fn test_qr_attachment_written_to_output_dir() {
    let server = MockServer::start();
    let qr_mock = server.mock(|when, then| {
        when.method(GET).path("/qr").query_param("data", "calcdeck");
        then.status(200).header("Content-Type", "image/png").body("png-bytes");
    });

    let out_dir = TempDir::new().unwrap();
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[qr]\nendpoint = \"{}\"\ntimeout_seconds = 5\n", server.url("/qr")).unwrap();
    let config_arg = file.path().to_string_lossy().to_string();
    let out_arg = out_dir.path().to_string_lossy().to_string();

    let config = cli(&[
        "calcdeck",
        "--config",
        config_arg.as_str(),
        "--output-dir",
        out_arg.as_str(),
        "run",
        "qr-code-generator",
        "-f",
        "text=calcdeck",
    ]);
    let out = app::execute(&config).await.unwrap();

    qr_mock.assert();
    assert!(out.contains("QR code preview"));
    let saved = std::fs::read(out_dir.path().join("qr-code.png")).unwrap();
    assert_eq!(saved, b"png-bytes");
}

#[tokio::test]
async fn test_export_bundle_contents() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("exports/loan.zip");
    let out_arg = out.to_string_lossy().to_string();

    let config = cli(&[
        "calcdeck",
        "--offline",
        "export",
        "/calculators/loan-calculator",
        "-f",
        "amount=25000",
        "-f",
        "rate=6.5",
        "-f",
        "term=5",
        "--out",
        out_arg.as_str(),
    ]);
    app::execute(&config).await.unwrap();

    let mut archive = zip::ZipArchive::new(std::fs::File::open(&out).unwrap()).unwrap();
    let names: Vec<String> = archive.file_names().map(String::from).collect();
    assert!(names.contains(&"loan-calculator.html".to_string()));
    assert!(names.contains(&"loan-calculator.json".to_string()));
    assert!(names.iter().any(|n| n.ends_with(".csv")));

    let mut html = String::new();
    archive
        .by_name("loan-calculator.html")
        .unwrap()
        .read_to_string(&mut html)
        .unwrap();
    assert!(html.starts_with("<section class=\"card\">"));
}

#[tokio::test]
async fn test_seeded_password_is_reproducible() {
    let args = [
        "calcdeck", "--offline", "--format", "json", "run", "password-generator", "-f", "length=20", "--seed", "42",
    ];
    let first = app::execute(&cli(&args)).await.unwrap();
    let second = app::execute(&cli(&args)).await.unwrap();
    assert_eq!(first, second);
}
