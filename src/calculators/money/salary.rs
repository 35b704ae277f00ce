use crate::core::{Calculator, Card, Env};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::{format_currency, format_max};
use async_trait::async_trait;
use serde::Serialize;

const WORKDAYS_PER_WEEK: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    AnnualToHourly,
    HourlyToAnnual,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PayBreakdown {
    pub direction: Direction,
    pub hours_per_week: f64,
    pub weeks_per_year: f64,
    pub hourly: f64,
    pub daily: f64,
    pub weekly: f64,
    pub biweekly: f64,
    pub monthly: f64,
    pub annual: f64,
}

fn check_schedule(hours: f64, weeks: f64) -> Result<()> {
    if !hours.is_finite() || hours <= 0.0 || !weeks.is_finite() || weeks <= 0.0 {
        return Err(CalcError::invalid(
            "Please provide working hours per week and paid weeks per year above zero.",
        ));
    }
    Ok(())
}

fn breakdown(direction: Direction, hourly: f64, hours: f64, weeks: f64) -> PayBreakdown {
    let weekly = hourly * hours;
    let annual = weekly * weeks;
    PayBreakdown {
        direction,
        hours_per_week: hours,
        weeks_per_year: weeks,
        hourly,
        daily: weekly / WORKDAYS_PER_WEEK,
        weekly,
        biweekly: weekly * 2.0,
        monthly: annual / 12.0,
        annual,
    }
}

pub fn from_annual(annual: f64, hours: f64, weeks: f64) -> Result<PayBreakdown> {
    check_schedule(hours, weeks)?;
    if !annual.is_finite() || annual <= 0.0 {
        return Err(CalcError::invalid("Type an annual salary to convert."));
    }
    Ok(breakdown(Direction::AnnualToHourly, annual / (weeks * hours), hours, weeks))
}

pub fn from_hourly(hourly: f64, hours: f64, weeks: f64) -> Result<PayBreakdown> {
    check_schedule(hours, weeks)?;
    if !hourly.is_finite() || hourly <= 0.0 {
        return Err(CalcError::invalid("Enter an hourly rate to convert."));
    }
    Ok(breakdown(Direction::HourlyToAnnual, hourly, hours, weeks))
}

pub struct SalaryToHourly;

#[async_trait]
impl Calculator for SalaryToHourly {
    fn key(&self) -> &'static str {
        "salary-to-hourly"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let hours = form.value_or("hours", 40.0);
        let weeks = form.value_or("weeks", 52.0);
        // an explicit direction wins, otherwise whichever amount was given
        let direction = match form.get("direction") {
            Some("hourly-to-annual") => Direction::HourlyToAnnual,
            Some("annual-to-hourly") => Direction::AnnualToHourly,
            _ if form.get("annual").is_none() && form.get("hourly").is_some() => Direction::HourlyToAnnual,
            _ => Direction::AnnualToHourly,
        };

        let pay = match direction {
            Direction::AnnualToHourly => from_annual(form.money("annual"), hours, weeks)?,
            Direction::HourlyToAnnual => from_hourly(form.money("hourly"), hours, weeks)?,
        };

        let title = match direction {
            Direction::AnnualToHourly => format!(
                "{} per year ≈ {} per hour",
                format_currency(pay.annual),
                format_currency(pay.hourly)
            ),
            Direction::HourlyToAnnual => format!(
                "{} per hour ≈ {} per year",
                format_currency(pay.hourly),
                format_currency(pay.annual)
            ),
        };

        Card::new(title)
            .stat("Hourly", format_currency(pay.hourly))
            .stat("Daily", format_currency(pay.daily))
            .stat("Weekly", format_currency(pay.weekly))
            .stat("Biweekly", format_currency(pay.biweekly))
            .stat("Monthly", format_currency(pay.monthly))
            .stat("Annual", format_currency(pay.annual))
            .stat("Hours weekly", format_max(pay.hours_per_week, 2))
            .stat("Weeks counted", format_max(pay.weeks_per_year, 2))
            .note("Rounded to the nearest cent. Adjust weeks for unpaid leave or overtime expectations.")
            .data(&pay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annual_to_hourly() {
        let pay = from_annual(52_000.0, 40.0, 52.0).unwrap();
        assert_eq!(pay.hourly, 25.0);
        assert_eq!(pay.weekly, 1_000.0);
        assert_eq!(pay.daily, 200.0);
        assert!((pay.monthly - 4_333.333).abs() < 0.001);
    }

    #[test]
    fn test_round_trip_holds() {
        let there = from_hourly(31.5, 37.5, 48.0).unwrap();
        let back = from_annual(there.annual, 37.5, 48.0).unwrap();
        assert!((back.hourly - 31.5).abs() < 1e-9);
    }

    #[test]
    fn test_schedule_required() {
        assert!(from_annual(50_000.0, 0.0, 52.0).is_err());
        assert_eq!(
            from_hourly(0.0, 40.0, 52.0).unwrap_err().to_string(),
            "Enter an hourly rate to convert."
        );
    }
}
