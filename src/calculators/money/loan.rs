use super::MAX_LOAN_YEARS;
use crate::core::{Calculator, Card, Env, Table};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::format_currency;
use async_trait::async_trait;
use serde::Serialize;

/// Level payment for `principal` over `months` at `monthly_rate`.
/// A zero rate splits the principal evenly.
pub fn level_payment(principal: f64, monthly_rate: f64, months: u32) -> f64 {
    if months == 0 {
        return f64::NAN;
    }
    if monthly_rate == 0.0 {
        return principal / f64::from(months);
    }
    let factor = (1.0 + monthly_rate).powi(months as i32);
    principal * monthly_rate * factor / (factor - 1.0)
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoanYear {
    pub year: u32,
    pub principal: f64,
    pub interest: f64,
    pub paid: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoanSummary {
    pub payment: f64,
    pub total_paid: f64,
    pub total_interest: f64,
    pub months: u32,
    pub schedule: Vec<LoanYear>,
}

pub fn amortize(amount: f64, annual_rate: f64, years: u32, extra: f64) -> Result<LoanSummary> {
    if !amount.is_finite() || amount <= 0.0 || !annual_rate.is_finite() || annual_rate < 0.0 || years == 0 {
        return Err(CalcError::invalid(
            "Please provide a loan amount, interest rate, and term above zero.",
        ));
    }
    if years > MAX_LOAN_YEARS {
        return Err(CalcError::invalid(format!(
            "Choose a loan term of {} years or less.",
            MAX_LOAN_YEARS
        )));
    }
    let extra = if extra.is_finite() && extra > 0.0 { extra } else { 0.0 };
    let monthly_rate = annual_rate / 100.0 / 12.0;
    let total_months = years * 12;
    let payment = level_payment(amount, monthly_rate, total_months) + extra;
    if !payment.is_finite() || payment <= 0.0 {
        return Err(CalcError::invalid("Something went wrong. Try adjusting your inputs."));
    }

    let mut balance = amount;
    let mut total_interest = 0.0;
    let mut total_paid = 0.0;
    let mut months = 0;
    let mut schedule: Vec<LoanYear> = Vec::new();

    for month in 1..=total_months {
        if balance <= 0.0 {
            break;
        }
        let interest = balance * monthly_rate;
        let mut principal = payment - interest;
        let mut paid = payment;
        if principal > balance {
            principal = balance;
            paid = principal + interest;
        }
        balance = (balance - principal).max(0.0);
        total_interest += interest;
        total_paid += paid;

        let year = (month - 1) / 12 + 1;
        if schedule.last().map(|y| y.year) != Some(year) {
            schedule.push(LoanYear { year, ..LoanYear::default() });
        }
        if let Some(row) = schedule.last_mut() {
            row.principal += principal;
            row.interest += interest;
            row.paid += paid;
            row.balance = balance;
        }
        months = month;
    }

    Ok(LoanSummary {
        payment,
        total_paid,
        total_interest,
        months,
        schedule,
    })
}

pub struct LoanCalculator;

#[async_trait]
impl Calculator for LoanCalculator {
    fn key(&self) -> &'static str {
        "loan-calculator"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let term = form.value("term");
        let years = if term.is_finite() && term >= 1.0 { term.trunc() as u32 } else { 0 };
        let summary = amortize(
            form.value("amount"),
            form.value("rate"),
            years,
            form.value_or("extra", 0.0),
        )?;

        let mut table = Table::new(&["Year", "Principal paid", "Interest paid", "Total paid", "Ending balance"]);
        for row in &summary.schedule {
            table.push(&[
                format!("Year {}", row.year),
                format_currency(row.principal),
                format_currency(row.interest),
                format_currency(row.paid),
                format_currency(row.balance),
            ]);
        }

        Card::new("Monthly payment")
            .stat("Payment", format_currency(summary.payment))
            .stat("Total paid", format_currency(summary.total_paid))
            .stat("Total interest", format_currency(summary.total_interest))
            .stat(
                "Payoff time",
                format!("{} yrs {} mos", summary.months / 12, summary.months % 12),
            )
            .note("Numbers are rounded to the nearest cent.")
            .table(table)
            .data(&summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thirty_year_payment() {
        let summary = amortize(200_000.0, 6.0, 30, 0.0).unwrap();
        assert_eq!(format_currency(summary.payment), "$1,199.10");
        assert!((summary.payment - 1198.49).abs() < 1.0);
        assert_eq!(summary.months, 360);
        assert_eq!(summary.schedule.len(), 30);
        let principal: f64 = summary.schedule.iter().map(|y| y.principal).sum();
        assert!((principal - 200_000.0).abs() < 0.01);
        assert!(summary.schedule.last().unwrap().balance < 0.01);
    }

    #[test]
    fn test_extra_payment_shortens_term() {
        let summary = amortize(25_000.0, 5.0, 5, 100.0).unwrap();
        assert_eq!(summary.months, 49);
        assert!((summary.total_interest - 2655.84).abs() < 0.01);
    }

    #[test]
    fn test_zero_rate_splits_evenly() {
        let summary = amortize(12_000.0, 0.0, 1, 0.0).unwrap();
        assert_eq!(summary.payment, 1000.0);
        assert_eq!(summary.total_interest, 0.0);
    }

    #[test]
    fn test_rejects_zero_amount() {
        assert!(amortize(0.0, 5.0, 5, 0.0).is_err());
        assert!(amortize(1000.0, -1.0, 5, 0.0).is_err());
        assert!(amortize(1000.0, 5.0, 0, 0.0).is_err());
    }

    #[test]
    fn test_rejects_excessive_term() {
        assert!(amortize(1000.0, 5.0, MAX_LOAN_YEARS, 0.0).is_ok());
        assert!(amortize(1000.0, 5.0, MAX_LOAN_YEARS + 1, 0.0).is_err());
        assert!(amortize(1000.0, 5.0, u32::MAX, 0.0).is_err());
    }
}
