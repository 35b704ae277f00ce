use super::MAX_LOAN_YEARS;
use crate::core::{Calculator, Card, Env};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::{format_currency, format_max};
use async_trait::async_trait;
use serde::Serialize;

pub const DEFAULT_SHARE_PERCENT: f64 = 15.0;
const CUSHION: f64 = 0.9;

#[derive(Debug, Clone, Copy, Default)]
pub struct CarInput {
    pub income_annual: f64,
    pub debts_monthly: f64,
    pub term_months: u32,
    pub rate: f64,
    pub down: f64,
    pub trade_in: f64,
    pub share_percent: f64,
    pub tax_percent: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CarBudget {
    pub monthly_income: f64,
    pub max_payment: f64,
    pub max_loan: f64,
    pub upfront: f64,
    pub price: f64,
    pub out_the_door: f64,
    pub cushion_price: f64,
    pub car_share_percent: f64,
    pub dti_percent: f64,
}

fn positive(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

/// Present value of `payment` over `months` at `monthly_rate`.
pub fn loan_for_payment(payment: f64, monthly_rate: f64, months: u32) -> f64 {
    if monthly_rate == 0.0 {
        payment * f64::from(months)
    } else {
        payment * (1.0 - (1.0 + monthly_rate).powi(-(months as i32))) / monthly_rate
    }
}

pub fn afford(input: &CarInput) -> Result<CarBudget> {
    if !input.income_annual.is_finite() || input.income_annual <= 0.0 {
        return Err(CalcError::invalid("Enter your gross annual income above zero."));
    }
    if input.term_months == 0 || input.term_months > MAX_LOAN_YEARS * 12 {
        return Err(CalcError::invalid("Select a valid loan term."));
    }

    let monthly_income = input.income_annual / 12.0;
    let debts = positive(input.debts_monthly);
    let share = if input.share_percent.is_finite() && input.share_percent > 0.0 {
        input.share_percent / 100.0
    } else {
        DEFAULT_SHARE_PERCENT / 100.0
    };
    let max_payment = (monthly_income * share - debts).max(0.0);
    if max_payment <= 0.0 {
        return Err(CalcError::invalid(format!(
            "Your existing monthly debt already uses the entire {}% target. Increase the target percentage or pay down other loans.",
            format_max(share * 100.0, 2)
        )));
    }

    let monthly_rate = positive(input.rate) / 100.0 / 12.0;
    let max_loan = loan_for_payment(max_payment, monthly_rate, input.term_months);
    let upfront = positive(input.down) + positive(input.trade_in);
    let tax = positive(input.tax_percent) / 100.0;
    let price = ((max_loan + upfront) / (1.0 + tax)).max(0.0);

    Ok(CarBudget {
        monthly_income,
        max_payment,
        max_loan,
        upfront,
        price,
        out_the_door: price * (1.0 + tax),
        cushion_price: price * CUSHION,
        car_share_percent: max_payment / monthly_income * 100.0,
        dti_percent: (max_payment + debts) / monthly_income * 100.0,
    })
}

pub struct CarLoanAffordability;

#[async_trait]
impl Calculator for CarLoanAffordability {
    fn key(&self) -> &'static str {
        "car-loan-affordability-calculator"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let term = form.value_or("term", 60.0);
        let rate = form.value_or("rate", 0.0);
        let input = CarInput {
            income_annual: form.value_or("income", 0.0),
            debts_monthly: form.value_or("debts", 0.0),
            term_months: if term.is_finite() && term >= 1.0 { term.trunc() as u32 } else { 0 },
            rate,
            down: form.value_or("down", 0.0),
            trade_in: form.value_or("trade", 0.0),
            share_percent: form.value_or("share", DEFAULT_SHARE_PERCENT),
            tax_percent: form.value_or("tax", 0.0),
        };
        let budget = afford(&input)?;

        Card::new(format!(
            "You can afford about {} before tax",
            format_currency(budget.price)
        ))
        .stat("Monthly income", format_currency(budget.monthly_income))
        .stat("Target car payment", format_currency(budget.max_payment))
        .stat("Loan amount", format_currency(budget.max_loan))
        .stat("Out-the-door budget", format_currency(budget.out_the_door))
        .stat("Upfront cash (down + trade)", format_currency(budget.upfront))
        .stat("Car payment share of income", format!("{}%", format_max(budget.car_share_percent, 2)))
        .stat("Total debt-to-income", format!("{}%", format_max(budget.dti_percent, 2)))
        .stat("Cushioned car price (-10%)", format_currency(budget.cushion_price))
        .note(format!(
            "Assumes a {}-month loan at {}% APR. Adjust the target percentage to model more aggressive or conservative budgets.",
            input.term_months,
            format_max(positive(rate), 2)
        ))
        .data(&budget)
    }
}
