use super::MAX_HORIZON_YEARS;
use crate::core::{Calculator, Card, Env, Table};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::{format_currency, format_max};
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SavingsYear {
    pub year: u32,
    pub deposits: f64,
    pub growth: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavingsPlan {
    pub monthly_deposit: f64,
    pub months: u32,
    pub new_contributions: f64,
    pub total_contributions: f64,
    pub total_growth: f64,
    pub balance: f64,
    pub schedule: Vec<SavingsYear>,
}

/// Month-end deposits needed to grow `current` into `goal`.
pub fn plan(goal: f64, current: f64, years: f64, annual_rate: f64) -> Result<SavingsPlan> {
    if !goal.is_finite() || goal <= 0.0 {
        return Err(CalcError::invalid("Please enter a savings goal above zero."));
    }
    if !current.is_finite() || current < 0.0 || !years.is_finite() || years <= 0.0 {
        return Err(CalcError::invalid(
            "Current savings can't be negative and timeframe must be above zero.",
        ));
    }
    if years > f64::from(MAX_HORIZON_YEARS) {
        return Err(CalcError::invalid(format!(
            "Choose a timeframe of {} years or less.",
            MAX_HORIZON_YEARS
        )));
    }
    let months = (years * 12.0).round();
    if months <= 0.0 {
        return Err(CalcError::invalid(
            "Your timeframe is too short. Choose at least one month.",
        ));
    }
    let months = months as u32;

    let monthly_rate = if annual_rate > 0.0 { annual_rate / 100.0 / 12.0 } else { 0.0 };
    let factor = (1.0 + monthly_rate).powi(months as i32);
    let future_current = current * factor;
    let monthly_deposit = if goal <= future_current {
        0.0
    } else if monthly_rate == 0.0 {
        (goal - current) / f64::from(months)
    } else {
        (goal - future_current) * monthly_rate / (factor - 1.0)
    };
    if !monthly_deposit.is_finite() || monthly_deposit < 0.0 {
        return Err(CalcError::invalid(
            "We couldn't compute a plan. Adjust the goal or timeline.",
        ));
    }

    let mut balance = current;
    let mut new_contributions = 0.0;
    let mut schedule: Vec<SavingsYear> = Vec::new();
    for month in 1..=months {
        let interest = balance * monthly_rate;
        balance += interest + monthly_deposit;
        new_contributions += monthly_deposit;

        let year = (month - 1) / 12 + 1;
        if schedule.last().map(|y| y.year) != Some(year) {
            schedule.push(SavingsYear { year, ..SavingsYear::default() });
        }
        if let Some(row) = schedule.last_mut() {
            row.deposits += monthly_deposit;
            row.growth += interest;
            row.balance = balance;
        }
    }
    // rounding drift
    if balance < goal {
        balance = goal;
        if let Some(row) = schedule.last_mut() {
            row.balance = balance;
        }
    }

    let total_contributions = current + new_contributions;
    Ok(SavingsPlan {
        monthly_deposit,
        months,
        new_contributions,
        total_contributions,
        total_growth: balance - total_contributions,
        balance,
        schedule,
    })
}

pub struct SavingsGoalCalculator;

#[async_trait]
impl Calculator for SavingsGoalCalculator {
    fn key(&self) -> &'static str {
        "savings-goal-calculator"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let years = form.value_or("years", 0.0);
        let rate = form.value_or("rate", 0.0);
        let result = plan(
            form.value_or("goal", 0.0),
            form.value_or("current", 0.0),
            years,
            if rate.is_finite() { rate } else { 0.0 },
        )?;

        let title = if result.monthly_deposit > 0.0 {
            format!("Save {} per month", format_currency(result.monthly_deposit))
        } else {
            "No new monthly savings required".to_string()
        };
        let advice = if result.monthly_deposit > 0.0 {
            "Consider rounding contributions up to keep a buffer."
        } else {
            "Your existing savings already reach the goal given the assumed growth."
        };

        let mut table = Table::new(&["Year", "Deposits", "Growth", "Ending balance"]);
        for row in &result.schedule {
            table.push(&[
                format!("Year {}", row.year),
                format_currency(row.deposits),
                format_currency(row.growth),
                format_currency(row.balance),
            ]);
        }

        Card::new(title)
            .stat("Monthly deposit", format_currency(result.monthly_deposit))
            .stat("Existing savings", format_currency(result.total_contributions - result.new_contributions))
            .stat("New contributions", format_currency(result.new_contributions))
            .stat("Total contributions", format_currency(result.total_contributions))
            .stat("Growth earned", format_currency(result.total_growth))
            .stat("Projected balance", format_currency(result.balance))
            .stat("Timeline", format!("{} years ({} months)", format_max(years, 2), result.months))
            .note(format!("Deposits are assumed at month end. {}", advice))
            .table(table)
            .data(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_deposit() {
        let result = plan(20_000.0, 5_000.0, 3.0, 4.0).unwrap();
        assert!((result.monthly_deposit - 376.19).abs() < 0.01);
        assert_eq!(result.months, 36);
        assert!((result.balance - 20_000.0).abs() < 0.01);
    }

    #[test]
    fn test_goal_already_reached() {
        let result = plan(1_000.0, 1_500.0, 1.0, 0.0).unwrap();
        assert_eq!(result.monthly_deposit, 0.0);
        assert_eq!(result.balance, 1_500.0);
    }

    #[test]
    fn test_zero_rate() {
        let result = plan(1_200.0, 0.0, 1.0, 0.0).unwrap();
        assert!((result.monthly_deposit - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_timeframe() {
        assert!(plan(1_000.0, 0.0, 0.01, 0.0).is_err());
        assert!(plan(0.0, 0.0, 1.0, 0.0).is_err());
    }

    #[test]
    fn test_rejects_excessive_timeframe() {
        assert!(plan(1_000.0, 0.0, 1e10, 5.0).is_err());
        assert!(plan(1_000.0, 0.0, f64::from(MAX_HORIZON_YEARS), 5.0).is_ok());
    }
}
