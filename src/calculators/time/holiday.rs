use super::date::{days_between, format_long, format_short, last_weekday, nth_weekday};
use crate::core::{Calculator, Card, Env, Table};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::plural;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Fixed { month: u32, day: u32 },
    Nth { month: u32, weekday: Weekday, n: u32 },
    Last { month: u32, weekday: Weekday },
}

#[derive(Debug, Clone, Copy)]
pub struct Holiday {
    pub key: &'static str,
    pub name: &'static str,
    rule: Rule,
}

impl Holiday {
    pub fn on_year(&self, year: i32) -> Option<NaiveDate> {
        match self.rule {
            Rule::Fixed { month, day } => NaiveDate::from_ymd_opt(year, month, day),
            Rule::Nth { month, weekday, n } => nth_weekday(year, month, weekday, n),
            Rule::Last { month, weekday } => last_weekday(year, month, weekday),
        }
    }

    /// This year's date, or next year's once it has passed.
    pub fn next_from(&self, today: NaiveDate) -> Option<NaiveDate> {
        let this_year = self.on_year(today.year())?;
        if this_year < today {
            self.on_year(today.year() + 1)
        } else {
            Some(this_year)
        }
    }
}

pub const HOLIDAYS: [Holiday; 7] = [
    Holiday { key: "new-year", name: "New Year's Day", rule: Rule::Fixed { month: 1, day: 1 } },
    Holiday { key: "mlk-day", name: "MLK Day", rule: Rule::Nth { month: 1, weekday: Weekday::Mon, n: 3 } },
    Holiday { key: "memorial-day", name: "Memorial Day", rule: Rule::Last { month: 5, weekday: Weekday::Mon } },
    Holiday { key: "independence-day", name: "Independence Day", rule: Rule::Fixed { month: 7, day: 4 } },
    Holiday { key: "labor-day", name: "Labor Day", rule: Rule::Nth { month: 9, weekday: Weekday::Mon, n: 1 } },
    Holiday { key: "thanksgiving", name: "Thanksgiving", rule: Rule::Nth { month: 11, weekday: Weekday::Thu, n: 4 } },
    Holiday { key: "christmas", name: "Christmas Day", rule: Rule::Fixed { month: 12, day: 25 } },
];

pub fn find(key: &str) -> Option<&'static Holiday> {
    HOLIDAYS.iter().find(|h| h.key == key)
}

#[derive(Debug, Clone, Serialize)]
pub struct HolidayCountdown {
    pub key: &'static str,
    pub name: &'static str,
    pub date: NaiveDate,
    pub days: i64,
}

pub struct HolidayCountdownCalculator;

#[async_trait]
impl Calculator for HolidayCountdownCalculator {
    fn key(&self) -> &'static str {
        "holiday-countdown"
    }

    async fn run(&self, form: &Form, env: &Env) -> Result<Card> {
        let holiday = find(form.text_or("holiday", "new-year"))
            .ok_or_else(|| CalcError::invalid("Invalid holiday."))?;
        let date = holiday
            .next_from(env.today)
            .ok_or_else(|| CalcError::invalid("Invalid holiday."))?;
        let days = days_between(env.today, date);

        let mut table = Table::new(&["Holiday", "Date", "Days"]);
        for other in &HOLIDAYS {
            if let Some(next) = other.next_from(env.today) {
                table.push(&[
                    other.name.to_string(),
                    format_short(next),
                    days_between(env.today, next).to_string(),
                ]);
            }
        }

        let countdown = HolidayCountdown {
            key: holiday.key,
            name: holiday.name,
            date,
            days,
        };

        Card::new(holiday.name)
            .headline(format!(
                "{}: {} day{} remaining.",
                format_short(date),
                days,
                plural(days)
            ))
            .stat("Date", format_long(date))
            .stat("Days remaining", days.to_string())
            .table(table.captioned("All holidays"))
            .data(&countdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_holiday_dates_2025() {
        let dates: Vec<_> = HOLIDAYS.iter().map(|h| h.on_year(2025).unwrap()).collect();
        assert_eq!(
            dates,
            vec![
                ymd(2025, 1, 1),
                ymd(2025, 1, 20),
                ymd(2025, 5, 26),
                ymd(2025, 7, 4),
                ymd(2025, 9, 1),
                ymd(2025, 11, 27),
                ymd(2025, 12, 25),
            ]
        );
    }

    #[test]
    fn test_passed_holiday_rolls_over() {
        let christmas = find("christmas").unwrap();
        assert_eq!(christmas.next_from(ymd(2024, 12, 26)), Some(ymd(2025, 12, 25)));
        assert_eq!(christmas.next_from(ymd(2024, 12, 25)), Some(ymd(2024, 12, 25)));
    }

    #[tokio::test]
    async fn test_unknown_holiday() {
        let env = Env::offline_at(ymd(2024, 1, 1));
        let err = HolidayCountdownCalculator
            .run(&Form::new().with("holiday", "festivus"), &env)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid holiday.");
    }

    #[tokio::test]
    async fn test_thanksgiving_card() {
        let env = Env::offline_at(ymd(2024, 11, 1));
        let card = HolidayCountdownCalculator
            .run(&Form::new().with("holiday", "thanksgiving"), &env)
            .await
            .unwrap();
        assert_eq!(card.stat_value("Date"), Some("Thursday, November 28, 2024"));
        assert_eq!(card.stat_value("Days remaining"), Some("27"));
    }
}
