use super::date::{days_between, days_in_month, format_short, next_month_day};
use crate::core::{Calculator, Card, Env};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::plural;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct BirthdayCountdown {
    pub next: NaiveDate,
    pub days: i64,
}

pub fn countdown(today: NaiveDate, month: u32, day: u32) -> Result<BirthdayCountdown> {
    // Feb 29 is always accepted; other days must exist in the month.
    let max_day = if month == 2 { 29 } else { days_in_month(2001, month) };
    if !(1..=12).contains(&month) || day < 1 || day > max_day {
        return Err(CalcError::invalid("Enter a valid month and day."));
    }
    let next = next_month_day(today, month, day)
        .ok_or_else(|| CalcError::invalid("Enter a valid month and day."))?;
    Ok(BirthdayCountdown {
        next,
        days: days_between(today, next),
    })
}

pub struct DaysUntilBirthday;

#[async_trait]
impl Calculator for DaysUntilBirthday {
    fn key(&self) -> &'static str {
        "days-until-birthday"
    }

    async fn run(&self, form: &Form, env: &Env) -> Result<Card> {
        let month = form.value("month");
        let day = form.value("day");
        if !month.is_finite()
            || !day.is_finite()
            || month.fract() != 0.0
            || day.fract() != 0.0
            || month < 1.0
            || day < 1.0
            || day > 31.0
        {
            return Err(CalcError::invalid("Enter a valid month and day."));
        }

        let result = countdown(env.today, month as u32, day as u32)?;
        let headline = if result.days == 0 {
            format!("Your birthday is today, {}. Happy birthday!", format_short(result.next))
        } else {
            format!(
                "Your next birthday is {}, in {} day{}.",
                format_short(result.next),
                result.days,
                plural(result.days)
            )
        };

        Card::new("Result")
            .headline(headline)
            .stat("Next birthday", format_short(result.next))
            .stat("Days to go", result.days.to_string())
            .data(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_feb_29_in_common_year() {
        let result = countdown(ymd(2025, 1, 1), 2, 29).unwrap();
        assert_eq!(result.next, ymd(2025, 2, 28));
        assert_eq!(result.days, 58);
    }

    #[test]
    fn test_passed_birthday_rolls_to_next_year() {
        let result = countdown(ymd(2024, 7, 1), 6, 15).unwrap();
        assert_eq!(result.next, ymd(2025, 6, 15));
    }

    #[test]
    fn test_impossible_day_rejected() {
        assert!(countdown(ymd(2024, 1, 1), 4, 31).is_err());
        assert!(countdown(ymd(2024, 1, 1), 13, 1).is_err());
    }

    #[tokio::test]
    async fn test_birthday_today() {
        let env = Env::offline_at(ymd(2024, 6, 15));
        let form = Form::new().with("month", "6").with("day", "15");
        let card = DaysUntilBirthday.run(&form, &env).await.unwrap();
        assert_eq!(card.stat_value("Days to go"), Some("0"));
    }

    #[tokio::test]
    async fn test_fractional_month_or_day_rejected() {
        let env = Env::offline_at(ymd(2024, 6, 15));
        for (month, day) in [("2.7", "10"), ("6", "15.5")] {
            let form = Form::new().with("month", month).with("day", day);
            let err = DaysUntilBirthday.run(&form, &env).await.unwrap_err();
            assert_eq!(err.to_string(), "Enter a valid month and day.");
        }
    }
}
