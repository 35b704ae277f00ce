use super::date::{anniversary_date, days_between, format_short, parse_date};
use crate::core::{Calculator, Card, Env, Table};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::{ordinal, plural};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

const UPCOMING: i32 = 5;

#[derive(Debug, Clone, Serialize)]
pub struct Anniversary {
    pub number: i32,
    pub date: NaiveDate,
    pub days_away: i64,
}

/// First anniversary on or after `today`, followed by the next ones.
pub fn upcoming(base: NaiveDate, today: NaiveDate, count: i32) -> Vec<Anniversary> {
    let mut number = (today.year() - base.year()).max(1);
    while anniversary_date(base, number).is_some_and(|d| d < today) {
        number += 1;
    }
    (0..count)
        .filter_map(|i| {
            let n = number + i;
            anniversary_date(base, n).map(|date| Anniversary {
                number: n,
                date,
                days_away: days_between(today, date),
            })
        })
        .collect()
}

pub struct AnniversaryCountdown;

#[async_trait]
impl Calculator for AnniversaryCountdown {
    fn key(&self) -> &'static str {
        "anniversary-countdown"
    }

    async fn run(&self, form: &Form, env: &Env) -> Result<Card> {
        let special = form
            .get("date")
            .and_then(parse_date)
            .ok_or_else(|| CalcError::invalid("Please enter a valid date."))?;
        let label = form.text_or("label", "anniversary");

        let diff = days_between(special, env.today);
        let context = match diff {
            0 => "That's today.".to_string(),
            d if d > 0 => format!("That was {} day{} ago.", d, plural(d)),
            d => format!("That's in {} day{}.", d.abs(), plural(d.abs())),
        };

        let items = upcoming(special, env.today, UPCOMING);
        let mut table = Table::new(&["Anniversary", "Date", "When"]);
        for item in &items {
            let when = if item.days_away == 0 {
                "That's today!".to_string()
            } else {
                format!("In {} day{}.", item.days_away, plural(item.days_away))
            };
            table.push(&[
                format!("{} {}", ordinal(item.number.into()), label),
                format_short(item.date),
                when,
            ]);
        }

        let mut card = Card::new("Upcoming Anniversaries")
            .headline(format!("Original date: {}. {}", format_short(special), context));
        if let Some(next) = items.first() {
            card = card
                .stat("Next", format!("{} {}", ordinal(next.number.into()), label))
                .stat("Date", format_short(next.date))
                .stat("Days away", next.days_away.to_string());
        }
        card.table(table).data(&items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_upcoming_skips_past_anniversary() {
        let items = upcoming(ymd(2015, 6, 20), ymd(2024, 7, 1), 5);
        assert_eq!(items[0].number, 10);
        assert_eq!(items[0].date, ymd(2025, 6, 20));
        assert_eq!(items.len(), 5);
        assert_eq!(items[4].number, 14);
    }

    #[test]
    fn test_anniversary_today() {
        let items = upcoming(ymd(2015, 6, 20), ymd(2024, 6, 20), 1);
        assert_eq!(items[0].number, 9);
        assert_eq!(items[0].days_away, 0);
    }

    #[test]
    fn test_recent_date_starts_at_first() {
        let items = upcoming(ymd(2024, 3, 1), ymd(2024, 3, 10), 2);
        assert_eq!(items[0].number, 1);
        assert_eq!(items[0].date, ymd(2025, 3, 1));
    }

    #[test]
    fn test_leap_day_base() {
        let items = upcoming(ymd(2020, 2, 29), ymd(2022, 1, 1), 3);
        assert_eq!(items[0].date, ymd(2022, 2, 28));
        assert_eq!(items[2].date, ymd(2024, 2, 29));
    }
}
