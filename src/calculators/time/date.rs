//! Calendar arithmetic shared by the countdown and age calculators.
//!
//! Everything works on [`NaiveDate`], so "midnight normalisation" is
//! implicit: there is no time-of-day to strip.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Accepts `YYYY-MM-DD` or `M/D/YYYY` (one or two digit month and day).
/// Dates that do not exist on the calendar are rejected.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let value = input.trim();

    let iso: Vec<&str> = value.split('-').collect();
    if iso.len() == 3
        && iso[0].len() == 4
        && iso[1].len() == 2
        && iso[2].len() == 2
        && iso.iter().all(|p| all_digits(p))
    {
        return NaiveDate::from_ymd_opt(
            iso[0].parse().ok()?,
            iso[1].parse().ok()?,
            iso[2].parse().ok()?,
        );
    }

    let us: Vec<&str> = value.split('/').collect();
    if us.len() == 3
        && (1..=2).contains(&us[0].len())
        && (1..=2).contains(&us[1].len())
        && us[2].len() == 4
        && us.iter().all(|p| all_digits(p))
    {
        return NaiveDate::from_ymd_opt(
            us[2].parse().ok()?,
            us[0].parse().ok()?,
            us[1].parse().ok()?,
        );
    }

    None
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `Mon Mar 04 2024`
pub fn format_short(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

/// `Monday, March 4, 2024`
pub fn format_long(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Signed calendar-day difference `b - a`.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// `month` is 1-based.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Clamps `day` into the month, so Jan 31 + 1 month lands on Feb 28/29.
pub fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let day = day.min(days_in_month(year, month)).max(1);
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Adds `count` months, pinning the day to `anchor_day` clamped into the
/// target month.
pub fn add_months_clamped(date: NaiveDate, count: i32, anchor_day: u32) -> Option<NaiveDate> {
    let total = date.year() * 12 + date.month0() as i32 + count;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    clamped_date(year, month, anchor_day)
}

/// Calendar breakdown of `end - start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DateParts {
    pub years: i32,
    pub months: i32,
    pub days: i64,
}

/// Whole years, then whole months stepped with the start day as anchor,
/// then the residual days. `None` when `start > end`.
pub fn diff_parts(start: NaiveDate, end: NaiveDate) -> Option<DateParts> {
    if start > end {
        return None;
    }
    let anchor = start.day();
    let mut years = end.year() - start.year();
    let mut anniversary = add_months_clamped(start, years * 12, anchor)?;
    if anniversary > end {
        years -= 1;
        anniversary = add_months_clamped(start, years * 12, anchor)?;
    }

    let mut months = 0;
    let mut cursor = anniversary;
    loop {
        let next = add_months_clamped(cursor, 1, anchor)?;
        if next > end {
            break;
        }
        cursor = next;
        months += 1;
    }

    Some(DateParts {
        years,
        months,
        days: days_between(cursor, end),
    })
}

/// Next birthday strictly after `from`; on the birthday itself this is next year.
pub fn next_birthday_after(birth: NaiveDate, from: NaiveDate) -> Option<NaiveDate> {
    let candidate = clamped_date(from.year(), birth.month(), birth.day())?;
    if candidate <= from {
        clamped_date(from.year() + 1, birth.month(), birth.day())
    } else {
        Some(candidate)
    }
}

/// Next (month, day) on or after `from`. Feb 29 falls back to Feb 28 in
/// common years.
pub fn next_month_day(from: NaiveDate, month: u32, day: u32) -> Option<NaiveDate> {
    let on_year = |year: i32| {
        if month == 2 && day == 29 && !is_leap_year(year) {
            NaiveDate::from_ymd_opt(year, 2, 28)
        } else {
            NaiveDate::from_ymd_opt(year, month, day)
        }
    };
    let target = on_year(from.year())?;
    if target < from {
        on_year(from.year() + 1)
    } else {
        Some(target)
    }
}

/// The `n`-th anniversary of `base`, Feb 29 mapped to Feb 28 when needed.
pub fn anniversary_date(base: NaiveDate, n: i32) -> Option<NaiveDate> {
    let year = base.year() + n;
    NaiveDate::from_ymd_opt(year, base.month(), base.day()).or_else(|| {
        if base.month() == 2 && base.day() == 29 {
            NaiveDate::from_ymd_opt(year, 2, 28)
        } else {
            None
        }
    })
}

/// `n`-th `weekday` of `month` (1-based), e.g. the 4th Thursday of November.
pub fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let delta = (7 + weekday.num_days_from_sunday() - first.weekday().num_days_from_sunday()) % 7;
    let date = first + Duration::days(i64::from(delta + 7 * (n.saturating_sub(1))));
    (date.month() == month).then_some(date)
}

pub fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let last = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))?;
    let delta = (7 + last.weekday().num_days_from_sunday() - weekday.num_days_from_sunday()) % 7;
    Some(last - Duration::days(i64::from(delta)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!(parse_date("2024-03-04"), Some(ymd(2024, 3, 4)));
        assert_eq!(parse_date(" 3/4/2024 "), Some(ymd(2024, 3, 4)));
        assert_eq!(parse_date("03/04/2024"), Some(ymd(2024, 3, 4)));
        assert_eq!(parse_date("2023-02-29"), None);
        assert_eq!(parse_date("2024-3-4"), None);
        assert_eq!(parse_date("13/01/2024"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_display_formats() {
        assert_eq!(format_long(ymd(2024, 3, 4)), "Monday, March 4, 2024");
        assert_eq!(format_short(ymd(2024, 3, 4)), "Mon Mar 04 2024");
    }

    #[test]
    fn test_add_months_clamps() {
        assert_eq!(add_months_clamped(ymd(2024, 1, 31), 1, 31), Some(ymd(2024, 2, 29)));
        assert_eq!(add_months_clamped(ymd(2023, 1, 31), 1, 31), Some(ymd(2023, 2, 28)));
        assert_eq!(add_months_clamped(ymd(2024, 2, 29), 1, 31), Some(ymd(2024, 3, 31)));
        assert_eq!(add_months_clamped(ymd(2024, 1, 15), -1, 15), Some(ymd(2023, 12, 15)));
    }

    #[test]
    fn test_diff_parts() {
        let parts = diff_parts(ymd(1990, 5, 20), ymd(2024, 3, 4)).unwrap();
        assert_eq!(parts, DateParts { years: 33, months: 9, days: 13 });
        assert!(diff_parts(ymd(2024, 3, 5), ymd(2024, 3, 4)).is_none());
    }

    #[test]
    fn test_leap_birthday_in_common_year() {
        assert_eq!(next_month_day(ymd(2023, 1, 10), 2, 29), Some(ymd(2023, 2, 28)));
        assert_eq!(next_month_day(ymd(2023, 3, 1), 2, 29), Some(ymd(2024, 2, 29)));
        assert_eq!(next_birthday_after(ymd(2000, 2, 29), ymd(2023, 1, 1)), Some(ymd(2023, 2, 28)));
        assert_eq!(anniversary_date(ymd(2020, 2, 29), 1), Some(ymd(2021, 2, 28)));
    }

    #[test]
    fn test_birthday_today_rolls_forward_only_for_age() {
        let today = ymd(2024, 6, 1);
        assert_eq!(next_month_day(today, 6, 1), Some(today));
        assert_eq!(next_birthday_after(ymd(1990, 6, 1), today), Some(ymd(2025, 6, 1)));
    }

    #[test]
    fn test_us_holiday_rules() {
        assert_eq!(nth_weekday(2024, 1, Weekday::Mon, 3), Some(ymd(2024, 1, 15)));
        assert_eq!(nth_weekday(2024, 11, Weekday::Thu, 4), Some(ymd(2024, 11, 28)));
        assert_eq!(nth_weekday(2024, 9, Weekday::Mon, 1), Some(ymd(2024, 9, 2)));
        assert_eq!(last_weekday(2024, 5, Weekday::Mon), Some(ymd(2024, 5, 27)));
    }

    proptest! {
        #[test]
        fn prop_iso_and_us_agree(y in 1000i32..9999, m in 1u32..=12, d in 1u32..=31) {
            prop_assume!(NaiveDate::from_ymd_opt(y, m, d).is_some());
            let iso = format!("{:04}-{:02}-{:02}", y, m, d);
            let us = format!("{}/{}/{}", m, d, y);
            let padded = format!("{:02}/{:02}/{}", m, d, y);
            prop_assert_eq!(parse_date(&iso), parse_date(&us));
            prop_assert_eq!(parse_date(&us), parse_date(&padded));
            prop_assert_eq!(parse_date(&iso), NaiveDate::from_ymd_opt(y, m, d));
        }

        #[test]
        fn prop_parts_recombine(start_days in 0i64..40_000, span in 0i64..40_000) {
            let start = ymd(1900, 1, 1) + Duration::days(start_days);
            let end = start + Duration::days(span);
            let parts = diff_parts(start, end).unwrap();
            prop_assert!(parts.months >= 0 && parts.months < 12);
            prop_assert!(parts.days >= 0);
            let stepped = add_months_clamped(start, parts.years * 12 + parts.months, start.day()).unwrap();
            prop_assert_eq!(stepped + Duration::days(parts.days), end);
            prop_assert_eq!(days_between(start, end), span);
        }
    }
}
