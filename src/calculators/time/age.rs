use super::date::{days_between, diff_parts, format_short, next_birthday_after, parse_date, DateParts};
use crate::core::{Calculator, Card, Env};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::{format_fixed, plural};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AgeSummary {
    pub parts: DateParts,
    pub total_days: i64,
    pub next_birthday: NaiveDate,
    pub days_until_birthday: i64,
}

pub fn age_on(birth: NaiveDate, today: NaiveDate) -> Result<AgeSummary> {
    if birth > today {
        return Err(CalcError::invalid("Birthdate can't be in the future."));
    }
    let invalid = || CalcError::invalid("Please enter a valid birthdate.");
    let parts = diff_parts(birth, today).ok_or_else(invalid)?;
    let next_birthday = next_birthday_after(birth, today).ok_or_else(invalid)?;
    Ok(AgeSummary {
        parts,
        total_days: days_between(birth, today),
        next_birthday,
        days_until_birthday: days_between(today, next_birthday),
    })
}

pub struct AgeCalculator;

#[async_trait]
impl Calculator for AgeCalculator {
    fn key(&self) -> &'static str {
        "age-calculator"
    }

    async fn run(&self, form: &Form, env: &Env) -> Result<Card> {
        let birth = form
            .get("birthdate")
            .and_then(parse_date)
            .ok_or_else(|| CalcError::invalid("Please enter a valid birthdate."))?;
        let as_of = match form.get("as_of") {
            Some(raw) => parse_date(raw).ok_or_else(|| CalcError::invalid("Please enter a valid comparison date."))?,
            None => env.today,
        };

        let summary = age_on(birth, as_of)?;
        let p = summary.parts;
        let weeks = summary.total_days as f64 / 7.0;

        Card::new("Result")
            .headline(format!(
                "You are {} year{}, {} month{}, and {} day{} old.",
                p.years,
                plural(p.years.into()),
                p.months,
                plural(p.months.into()),
                p.days,
                plural(p.days)
            ))
            .stat("Years", p.years.to_string())
            .stat("Total days", format_fixed(summary.total_days as f64, 0))
            .stat("Total weeks", format_fixed(weeks, 1))
            .stat("Next birthday", format_short(summary.next_birthday))
            .stat("Days until birthday", summary.days_until_birthday.to_string())
            .note(format!(
                "That is about {} day{} alive.",
                format_fixed(summary.total_days as f64, 0),
                plural(summary.total_days)
            ))
            .note(format!(
                "Next birthday: {} (in {} day{}).",
                format_short(summary.next_birthday),
                summary.days_until_birthday,
                plural(summary.days_until_birthday)
            ))
            .data(&summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_breakdown() {
        let summary = age_on(ymd(1990, 5, 20), ymd(2024, 3, 4)).unwrap();
        assert_eq!(summary.parts.years, 33);
        assert_eq!(summary.next_birthday, ymd(2024, 5, 20));
        assert_eq!(summary.days_until_birthday, 77);
        assert_eq!(summary.total_days, 12342);
    }

    #[test]
    fn test_future_birthdate_rejected() {
        let err = age_on(ymd(2030, 1, 1), ymd(2024, 3, 4)).unwrap_err();
        assert_eq!(err.to_string(), "Birthdate can't be in the future.");
    }

    #[test]
    fn test_leap_day_birth_uses_feb_28() {
        let summary = age_on(ymd(2000, 2, 29), ymd(2023, 2, 1)).unwrap();
        assert_eq!(summary.next_birthday, ymd(2023, 2, 28));
    }

    #[tokio::test]
    async fn test_card_headline() {
        let env = Env::offline_at(ymd(2024, 3, 4));
        let card = AgeCalculator
            .run(&Form::new().with("birthdate", "2023-03-04"), &env)
            .await
            .unwrap();
        assert_eq!(
            card.headline.as_deref(),
            Some("You are 1 year, 0 months, and 0 days old.")
        );
    }
}
