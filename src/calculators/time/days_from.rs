use super::date::{days_between, format_iso, format_short, parse_date};
use crate::core::{Calculator, Card, Env};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::{format_fixed, plural};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DayDistance {
    pub date: NaiveDate,
    pub compare: NaiveDate,
    pub days: i64,
}

impl DayDistance {
    pub fn between(date: NaiveDate, compare: NaiveDate) -> Self {
        Self {
            date,
            compare,
            days: days_between(compare, date),
        }
    }

    pub fn phrase(&self) -> String {
        match self.days {
            0 => "is today".to_string(),
            d if d > 0 => format!("is in {} day{}", d, plural(d)),
            d => format!("was {} day{} ago", d.abs(), plural(d)),
        }
    }
}

pub struct DaysFromDate;

#[async_trait]
impl Calculator for DaysFromDate {
    fn key(&self) -> &'static str {
        "days-from-date"
    }

    async fn run(&self, form: &Form, env: &Env) -> Result<Card> {
        let invalid = || CalcError::invalid("Please enter valid date(s).");
        let date = form.get("date").and_then(parse_date).ok_or_else(invalid)?;
        let compare = match form.get("compare") {
            Some(raw) => parse_date(raw).ok_or_else(invalid)?,
            None => env.today,
        };

        let distance = DayDistance::between(date, compare);
        let weeks = distance.days.abs() as f64 / 7.0;

        Card::new("Result")
            .headline(format!(
                "Your date {} (compared to {}).",
                distance.phrase(),
                format_short(compare)
            ))
            .stat("Date", format_iso(date))
            .stat("Compared to", format_iso(compare))
            .stat("Days", distance.days.to_string())
            .stat("Weeks", format_fixed(weeks, 1))
            .data(&distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Env {
        Env::offline_at(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
    }

    #[tokio::test]
    async fn test_future_date_against_today() {
        let card = DaysFromDate
            .run(&Form::new().with("date", "2024-03-11"), &env())
            .await
            .unwrap();
        assert_eq!(
            card.headline.as_deref(),
            Some("Your date is in 10 days (compared to Fri Mar 01 2024).")
        );
    }

    #[tokio::test]
    async fn test_past_date_with_compare() {
        let form = Form::new().with("date", "12/31/2023").with("compare", "2024-01-01");
        let card = DaysFromDate.run(&form, &env()).await.unwrap();
        assert!(card.headline.unwrap().starts_with("Your date was 1 day ago"));
    }

    #[tokio::test]
    async fn test_invalid_compare() {
        let form = Form::new().with("date", "2024-01-01").with("compare", "2024-02-30");
        assert!(DaysFromDate.run(&form, &env()).await.is_err());
    }
}
