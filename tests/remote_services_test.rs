use calcdeck::adapters::{FallbackRateSource, HttpQrRenderer, HttpRateSource};
use calcdeck::core::Tone;
use calcdeck::{CalcEngine, Env, Form};
use chrono::NaiveDate;
use httpmock::prelude::*;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

fn offline_env() -> Env {
    Env::offline_at(NaiveDate::from_ymd_opt(2024, 10, 14).unwrap())
}

#[tokio::test]
async fn test_currency_uses_live_rates() {
    let server = MockServer::start();
    let rates_mock = server.mock(|when, then| {
        when.method(GET).path("/v6/latest/USD");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "result": "success",
                "base_code": "USD",
                "time_last_update_utc": "Mon, 14 Oct 2024 00:00:01 +0000",
                "rates": { "EUR": 0.5, "GBP": 0.25 }
            }));
    });

    let live = assert_ok!(HttpRateSource::new(server.url("/v6/latest/USD"), 5));
    let env = offline_env().with_rates(Arc::new(FallbackRateSource::new(live)));
    let card = CalcEngine::new(env)
        .run(
            "currency-converter",
            Form::new().with("amount", "10").with("from", "USD").with("to", "EUR"),
        )
        .await
        .unwrap();

    rates_mock.assert();
    assert_eq!(card.tone, Tone::Info);
    assert_eq!(card.headline.as_deref(), Some("$10.00 = €5.00"));
    assert!(card.notes[0].contains("updated Mon, 14 Oct 2024"));
}

#[tokio::test]
async fn test_currency_falls_back_on_server_error() {
    let server = MockServer::start();
    let rates_mock = server.mock(|when, then| {
        when.method(GET).path("/latest");
        then.status(503);
    });

    let live = HttpRateSource::new(server.url("/latest"), 5).unwrap();
    let env = offline_env().with_rates(Arc::new(FallbackRateSource::new(live)));
    let card = CalcEngine::new(env)
        .run("currency-converter", Form::new().with("amount", "100"))
        .await
        .unwrap();

    rates_mock.assert();
    assert_eq!(card.tone, Tone::Warning);
    assert_eq!(card.headline.as_deref(), Some("$100.00 = €92.00"));
}

#[tokio::test]
async fn test_rate_envelope_is_checked() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/latest");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({ "result": "error", "error-type": "unsupported-code" }));
    });

    let live = HttpRateSource::new(server.url("/latest"), 5).unwrap();
    assert_err!(calcdeck::core::RateSource::latest(&live).await);
}

#[tokio::test]
async fn test_qr_png_is_attached() {
    let server = MockServer::start();
    let qr_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/create-qr-code/")
            .query_param("data", "https://example.com")
            .query_param("size", "240x240")
            .query_param("ecc", "H");
        then.status(200)
            .header("Content-Type", "image/png")
            .body(vec![0x89, b'P', b'N', b'G']);
    });

    let renderer = HttpQrRenderer::new(server.url("/v1/create-qr-code/"), 5).unwrap();
    let env = offline_env().with_qr(Arc::new(renderer));
    let card = CalcEngine::new(env)
        .run(
            "qr-code-generator",
            Form::new()
                .with("text", "https://example.com")
                .with("size", "240")
                .with("ecc", "h"),
        )
        .await
        .unwrap();

    qr_mock.assert();
    assert_eq!(card.tone, Tone::Info);
    assert_eq!(card.attachments.len(), 1);
    assert_eq!(card.attachments[0].file_name, "qr-code.png");
    assert_eq!(card.attachments[0].bytes, vec![0x89, b'P', b'N', b'G']);
}

#[tokio::test]
async fn test_qr_failure_links_remote_image() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/qr");
        then.status(500);
    });

    let renderer = HttpQrRenderer::new(server.url("/qr"), 5).unwrap();
    let env = offline_env().with_qr(Arc::new(renderer));
    let card = CalcEngine::new(env)
        .run("qr-code-generator", Form::new().with("text", "hello"))
        .await
        .unwrap();

    assert_eq!(card.tone, Tone::Warning);
    assert!(card.attachments.is_empty());
    let link = card.stat_value("Image URL").unwrap();
    assert!(link.starts_with(&server.url("/qr")));
    assert!(link.contains("data=hello"));
}
