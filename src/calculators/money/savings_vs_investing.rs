use super::MAX_HORIZON_YEARS;
use crate::core::{Calculator, Card, Env, Table};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::{format_currency, format_max};
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ProjectionRow {
    pub year: u32,
    /// Last row of a timeline that ends mid-year.
    pub partial: bool,
    pub contributions: f64,
    pub growth: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Projection {
    pub balance: f64,
    pub total_growth: f64,
    pub total_contributions: f64,
    pub schedule: Vec<ProjectionRow>,
}

pub fn run_projection(start: f64, monthly: f64, months: u32, annual_rate: f64) -> Projection {
    let monthly_rate = annual_rate / 100.0 / 12.0;
    let mut balance = start;
    let mut total_growth = 0.0;
    let mut total_contributions = start;
    let mut year_contributions = 0.0;
    let mut year_growth = 0.0;
    let mut schedule = Vec::new();

    for month in 1..=months {
        let interest = balance * monthly_rate;
        balance += interest;
        total_growth += interest;
        year_growth += interest;
        if monthly > 0.0 {
            balance += monthly;
            total_contributions += monthly;
            year_contributions += monthly;
        }
        if month % 12 == 0 || month == months {
            schedule.push(ProjectionRow {
                year: month.div_ceil(12),
                partial: month % 12 != 0,
                contributions: year_contributions,
                growth: year_growth,
                balance,
            });
            year_contributions = 0.0;
            year_growth = 0.0;
        }
    }

    Projection {
        balance,
        total_growth,
        total_contributions,
        schedule,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub months: u32,
    pub market_rate: f64,
    pub fee_rate: f64,
    pub savings: Projection,
    pub investing: Projection,
}

impl Comparison {
    pub fn difference(&self) -> f64 {
        self.investing.balance - self.savings.balance
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

pub fn compare(
    start: f64,
    monthly: f64,
    years: f64,
    bank_rate: f64,
    market_rate: f64,
    fees: f64,
) -> Result<Comparison> {
    if !start.is_finite() || start < 0.0 {
        return Err(CalcError::invalid("Starting balance can't be negative."));
    }
    if !years.is_finite() || years <= 0.0 {
        return Err(CalcError::invalid("Choose a time horizon greater than zero."));
    }
    if years > f64::from(MAX_HORIZON_YEARS) {
        return Err(CalcError::invalid(format!(
            "Choose a time horizon of {} years or less.",
            MAX_HORIZON_YEARS
        )));
    }
    let months = (years * 12.0).round();
    if months <= 0.0 {
        return Err(CalcError::invalid(
            "Your timeframe is too short. Try at least one month.",
        ));
    }
    let months = months as u32;
    let monthly = finite_or_zero(monthly).max(0.0);
    let market_rate = finite_or_zero(market_rate);
    let fee_rate = finite_or_zero(fees).max(0.0);

    Ok(Comparison {
        months,
        market_rate,
        fee_rate,
        savings: run_projection(start, monthly, months, finite_or_zero(bank_rate)),
        investing: run_projection(start, monthly, months, market_rate - fee_rate),
    })
}

pub struct SavingsVsInvesting;

#[async_trait]
impl Calculator for SavingsVsInvesting {
    fn key(&self) -> &'static str {
        "savings-vs-investing-comparison"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let years = form.value_or("years", 0.0);
        let result = compare(
            form.value_or("start", 0.0),
            form.value_or("monthly", 0.0),
            years,
            form.value_or("bank_rate", 0.0),
            form.value_or("market_rate", 0.0),
            form.value_or("fees", 0.0),
        )?;

        let mut table = Table::new(&["Year", "Savings balance", "Investing balance", "Difference"]);
        for (i, row) in result.savings.schedule.iter().enumerate() {
            let invest = result
                .investing
                .schedule
                .get(i)
                .map(|r| r.balance)
                .unwrap_or(result.investing.balance);
            let label = if row.partial {
                format!("Year {}*", row.year)
            } else {
                format!("Year {}", row.year)
            };
            table.push(&[
                label,
                format_currency(row.balance),
                format_currency(invest),
                format_currency(invest - row.balance),
            ]);
        }

        Card::new(format!("Projected balances after {} years", format_max(years, 2)))
            .stat("Total contributed", format_currency(result.savings.total_contributions))
            .stat("Savings account balance", format_currency(result.savings.balance))
            .stat("Savings growth earned", format_currency(result.savings.total_growth))
            .stat("Investing balance (net of fees)", format_currency(result.investing.balance))
            .stat("Investing growth earned", format_currency(result.investing.total_growth))
            .stat("Difference", format_currency(result.difference()))
            .table(table)
            .note(format!(
                "Investment return uses {}% minus {}% in annual fees. Rows with an asterisk represent a partial year at the end of the timeline.",
                format_max(result.market_rate, 2),
                format_max(result.fee_rate, 2)
            ))
            .data(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_year_row() {
        let p = run_projection(1_000.0, 100.0, 18, 0.0);
        assert_eq!(p.schedule.len(), 2);
        assert!(p.schedule[1].partial);
        assert_eq!(p.schedule[1].year, 2);
        assert_eq!(p.balance, 2_800.0);
    }

    #[test]
    fn test_fees_reduce_market_return() {
        let result = compare(10_000.0, 500.0, 10.0, 4.0, 7.0, 3.0).unwrap();
        assert!((result.difference()).abs() < 1e-6);
        let result = compare(10_000.0, 500.0, 10.0, 4.0, 7.0, 0.5).unwrap();
        assert!(result.difference() > 0.0);
        assert_eq!(result.savings.total_contributions, 70_000.0);
    }

    #[test]
    fn test_validation() {
        assert!(compare(-1.0, 0.0, 1.0, 1.0, 1.0, 0.0).is_err());
        assert!(compare(0.0, 0.0, 0.0, 1.0, 1.0, 0.0).is_err());
        assert!(compare(0.0, 0.0, 1e10, 1.0, 1.0, 0.0).is_err());
    }
}
