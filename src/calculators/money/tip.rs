use crate::core::{Calculator, Card, Env};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::format_currency;
use async_trait::async_trait;
use serde::Serialize;

pub const DEFAULT_TIP_PERCENT: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TipSplit {
    pub bill: f64,
    pub tip_percent: f64,
    pub tip: f64,
    pub total: f64,
    pub per_person: f64,
    pub tip_per_person: f64,
    pub people: u32,
}

pub fn split(bill: f64, tip_percent: f64, people: u32) -> Result<TipSplit> {
    if !bill.is_finite() || bill < 0.0 {
        return Err(CalcError::invalid("Enter a bill amount of zero or more."));
    }
    if people == 0 {
        return Err(CalcError::invalid("People splitting must be at least one."));
    }
    if !tip_percent.is_finite() || tip_percent < 0.0 {
        return Err(CalcError::invalid("Enter a custom tip percentage of zero or more."));
    }
    let tip = bill * tip_percent / 100.0;
    let total = bill + tip;
    let people_f = f64::from(people);
    Ok(TipSplit {
        bill,
        tip_percent,
        tip,
        total,
        per_person: total / people_f,
        tip_per_person: tip / people_f,
        people,
    })
}

pub struct TipCalculator;

#[async_trait]
impl Calculator for TipCalculator {
    fn key(&self) -> &'static str {
        "tip-calculator"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let bill = form.value_or("bill", 0.0);
        let people = form.value_or("people", 1.0);
        let people = if people.is_finite() && people >= 1.0 {
            people.trunc() as u32
        } else {
            0
        };
        let tip_percent = match form.get("tip") {
            None => DEFAULT_TIP_PERCENT,
            Some(value) => match value.parse::<f64>() {
                Ok(preset) => preset,
                // "custom" or anything non-numeric reads the custom field
                Err(_) => form.value_or("custom_tip", 0.0),
            },
        };

        let result = split(bill, tip_percent, people)?;
        let party = if result.people == 1 { "person" } else { "people" };

        Card::new(format!(
            "{} bill · {:.1}% tip",
            format_currency(result.bill),
            result.tip_percent
        ))
        .stat("Tip amount", format_currency(result.tip))
        .stat("Total with tip", format_currency(result.total))
        .stat("Per person", format_currency(result.per_person))
        .stat("Tip per person", format_currency(result.tip_per_person))
        .stat("Split between", format!("{} {}", result.people, party))
        .note("Round up to avoid shorting the server. Adjust the custom tip for exceptional service.")
        .data(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_split_evenly() {
        let result = split(84.0, 18.0, 3).unwrap();
        assert!((result.tip - 15.12).abs() < 1e-9);
        assert!((result.per_person - 33.04).abs() < 1e-9);
    }

    #[test]
    fn test_errors() {
        assert_eq!(split(-1.0, 15.0, 1).unwrap_err().to_string(), "Enter a bill amount of zero or more.");
        assert_eq!(split(10.0, 15.0, 0).unwrap_err().to_string(), "People splitting must be at least one.");
        assert!(split(10.0, -5.0, 1).is_err());
    }

    #[tokio::test]
    async fn test_custom_tip_field() {
        let env = Env::offline_at(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let form = Form::new()
            .with("bill", "50")
            .with("tip", "custom")
            .with("custom_tip", "25");
        let card = TipCalculator.run(&form, &env).await.unwrap();
        assert_eq!(card.title.as_deref(), Some("$50.00 bill · 25.0% tip"));
        assert_eq!(card.stat_value("Tip amount"), Some("$12.50"));
        assert_eq!(card.stat_value("Split between"), Some("1 person"));
    }
}
