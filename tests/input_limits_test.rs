use calcdeck::core::Tone;
use calcdeck::{CalcEngine, Env, Form};
use chrono::NaiveDate;

fn engine() -> CalcEngine {
    CalcEngine::new(Env::offline_at(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()))
}

async fn assert_error_card(key: &str, form: Form) {
    let card = engine().run(key, form).await.unwrap();
    assert_eq!(card.tone, Tone::Error, "{} accepted the input", key);
    assert!(card.tables.is_empty());
}

#[tokio::test]
async fn test_loan_rejects_excessive_term() {
    assert_error_card(
        "loan-calculator",
        Form::new().with("amount", 1000).with("rate", 5).with("term", 400_000_000),
    )
    .await;
}

#[tokio::test]
async fn test_mortgage_rejects_excessive_term() {
    assert_error_card(
        "mortgage-calculator",
        Form::new()
            .with("price", 300_000)
            .with("down", 20)
            .with("rate", 6)
            .with("term", 400_000_000),
    )
    .await;
}

#[tokio::test]
async fn test_compound_rejects_excessive_years() {
    assert_error_card(
        "compound-interest-calculator",
        Form::new().with("principal", 1000).with("rate", 5).with("years", "1e10"),
    )
    .await;
}

#[tokio::test]
async fn test_savings_horizons_are_bounded() {
    assert_error_card(
        "savings-goal-calculator",
        Form::new().with("goal", 10_000).with("current", 0).with("years", "1e10"),
    )
    .await;
    assert_error_card(
        "savings-vs-investing-comparison",
        Form::new().with("start", 1000).with("years", "1e10"),
    )
    .await;
}

#[tokio::test]
async fn test_fifty_year_loan_still_runs() {
    let card = engine()
        .run(
            "loan-calculator",
            Form::new().with("amount", 1000).with("rate", 5).with("term", 50),
        )
        .await
        .unwrap();
    assert_eq!(card.tone, Tone::Info);
    assert_eq!(card.stat_value("Payoff time"), Some("50 yrs 0 mos"));
}
