use super::loan::level_payment;
use super::MAX_LOAN_YEARS;
use crate::core::{Calculator, Card, Env, Table};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::{format_currency, format_max};
use async_trait::async_trait;
use serde::Serialize;

/// Housing plus debts may take at most this share of gross monthly income.
const DTI_LIMIT: f64 = 0.36;
const BISECTION_STEPS: usize = 40;

#[derive(Debug, Clone, Copy, Default)]
pub struct MortgageInput {
    pub price: f64,
    pub down_percent: f64,
    pub rate: f64,
    pub years: u32,
    pub tax_percent: f64,
    pub insurance_annual: f64,
    pub hoa_monthly: f64,
    pub income_annual: f64,
    pub debts_monthly: f64,
}

impl MortgageInput {
    fn monthly_rate(&self) -> f64 {
        if self.rate > 0.0 {
            self.rate / 100.0 / 12.0
        } else {
            0.0
        }
    }

    fn insurance_monthly(&self) -> f64 {
        self.insurance_annual.max(0.0) / 12.0
    }

    fn hoa(&self) -> f64 {
        self.hoa_monthly.max(0.0)
    }

    fn tax_monthly(&self, price: f64) -> f64 {
        if self.tax_percent > 0.0 {
            price * self.tax_percent / 100.0 / 12.0
        } else {
            0.0
        }
    }

    /// Full monthly housing cost for a hypothetical purchase price.
    fn monthly_cost_for(&self, price: f64) -> f64 {
        let loan = (price - price * self.down_percent / 100.0).max(0.0);
        let pi = if loan > 0.0 {
            level_payment(loan, self.monthly_rate(), self.years * 12)
        } else {
            0.0
        };
        pi + self.tax_monthly(price) + self.insurance_monthly() + self.hoa()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MortgageYear {
    pub year: u32,
    pub principal: f64,
    pub interest: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MortgageSummary {
    pub loan_amount: f64,
    pub down_payment: f64,
    pub principal_interest: f64,
    pub escrow_monthly: f64,
    pub piti: f64,
    pub total_interest: f64,
    pub total_escrow: f64,
    pub total_out_of_pocket: f64,
    pub payoff_months: u32,
    pub dti_percent: Option<f64>,
    pub affordable_payment: f64,
    pub affordable_price: f64,
    pub schedule: Vec<MortgageYear>,
}

pub fn analyze(input: &MortgageInput) -> Result<MortgageSummary> {
    if !(input.price > 0.0)
        || input.years == 0
        || !(0.0..=100.0).contains(&input.down_percent)
        || input.rate < 0.0
    {
        return Err(CalcError::invalid(
            "Please enter a valid price, down payment, rate, and term.",
        ));
    }
    if input.years > MAX_LOAN_YEARS {
        return Err(CalcError::invalid(format!(
            "Choose a mortgage term of {} years or less.",
            MAX_LOAN_YEARS
        )));
    }

    let down_payment = input.price * input.down_percent / 100.0;
    let loan_amount = (input.price - down_payment).max(0.0);
    let monthly_rate = input.monthly_rate();
    let total_months = input.years * 12;
    let principal_interest = if loan_amount > 0.0 {
        level_payment(loan_amount, monthly_rate, total_months)
    } else {
        0.0
    };
    let escrow_monthly =
        input.tax_monthly(input.price) + input.insurance_monthly() + input.hoa();
    let piti = principal_interest + escrow_monthly;

    let mut balance = loan_amount;
    let mut total_interest = 0.0;
    let mut total_principal = 0.0;
    let mut months_elapsed = 0;
    let mut schedule: Vec<MortgageYear> = Vec::new();

    if loan_amount > 0.0 {
        for month in 1..=total_months {
            if balance <= 0.0 {
                break;
            }
            let interest = balance * monthly_rate;
            let mut principal = principal_interest - interest;
            if principal < 0.0 {
                return Err(CalcError::invalid(
                    "Your payment does not cover the monthly interest. Increase the payment or adjust your rate.",
                ));
            }
            principal = principal.min(balance);
            balance = (balance - principal).max(0.0);
            total_interest += interest;
            total_principal += principal;
            months_elapsed = month;

            let year = (month - 1) / 12 + 1;
            if schedule.last().map(|y| y.year) != Some(year) {
                schedule.push(MortgageYear { year, ..MortgageYear::default() });
            }
            if let Some(row) = schedule.last_mut() {
                row.principal += principal;
                row.interest += interest;
                row.balance = balance;
            }
        }
    }

    let escrow_months = if months_elapsed > 0 { months_elapsed } else { total_months };
    let total_escrow = escrow_monthly * f64::from(escrow_months);
    let total_out_of_pocket = total_principal + total_interest + total_escrow + down_payment;

    let mut dti_percent = None;
    let mut affordable_payment = 0.0;
    let mut affordable_price = 0.0;
    if input.income_annual > 0.0 {
        let monthly_income = input.income_annual / 12.0;
        affordable_payment = (monthly_income * DTI_LIMIT - input.debts_monthly).max(0.0);
        dti_percent = Some((piti + input.debts_monthly) / monthly_income * 100.0);

        if affordable_payment > 0.0 {
            let mut low = 0.0;
            let mut high = (input.price * 2.0).max(100_000.0);
            for _ in 0..BISECTION_STEPS {
                let mid = (low + high) / 2.0;
                if input.monthly_cost_for(mid) > affordable_payment {
                    high = mid;
                } else {
                    low = mid;
                }
            }
            affordable_price = low;
        }
    }

    Ok(MortgageSummary {
        loan_amount,
        down_payment,
        principal_interest,
        escrow_monthly,
        piti,
        total_interest,
        total_escrow,
        total_out_of_pocket,
        payoff_months: if loan_amount > 0.0 { escrow_months } else { 0 },
        dti_percent,
        affordable_payment,
        affordable_price,
        schedule,
    })
}

fn lenient(form: &Form, field: &str) -> f64 {
    let v = form.value(field);
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

pub struct MortgageCalculator;

#[async_trait]
impl Calculator for MortgageCalculator {
    fn key(&self) -> &'static str {
        "mortgage-calculator"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let term = lenient(form, "term");
        let input = MortgageInput {
            price: lenient(form, "price"),
            down_percent: lenient(form, "down"),
            rate: lenient(form, "rate"),
            years: if term >= 1.0 { term.trunc() as u32 } else { 0 },
            tax_percent: lenient(form, "tax"),
            insurance_annual: lenient(form, "insurance"),
            hoa_monthly: lenient(form, "hoa"),
            income_annual: lenient(form, "income"),
            debts_monthly: lenient(form, "debts"),
        };
        let summary = analyze(&input)?;

        let mut card = Card::new("Monthly snapshot")
            .stat("Loan amount", format_currency(summary.loan_amount))
            .stat("Down payment", format_currency(summary.down_payment))
            .stat("Principal & interest", format_currency(summary.principal_interest))
            .stat("Taxes + insurance + HOA", format_currency(summary.escrow_monthly))
            .stat("Total monthly payment", format_currency(summary.piti))
            .stat("Total interest", format_currency(summary.total_interest))
            .stat(
                "Payoff timeline",
                format!("{} yrs {} mos", summary.payoff_months / 12, summary.payoff_months % 12),
            );
        if let Some(dti) = summary.dti_percent {
            card = card.stat("Debt-to-income", format!("{}%", format_max(dti, 1)));
        }
        if summary.affordable_price > 0.0 {
            card = card.stat("36% rule home price", format_currency(summary.affordable_price));
        }
        if summary.affordable_payment > 0.0 {
            card = card.note(format!(
                "Max housing payment at 36% rule: {} (including debts).",
                format_currency(summary.affordable_payment)
            ));
        }
        card = card.note(format!(
            "Estimated lifetime cost (including down payment & extras): {}.",
            format_currency(summary.total_out_of_pocket)
        ));

        if summary.schedule.is_empty() {
            card = card.note("No amortization schedule: this scenario does not require a loan.");
        } else {
            let mut table = Table::new(&["Year", "Principal paid", "Interest paid", "Ending balance"]);
            for row in &summary.schedule {
                table.push(&[
                    format!("Year {}", row.year),
                    format_currency(row.principal),
                    format_currency(row.interest),
                    format_currency(row.balance),
                ]);
            }
            card = card.table(table);
        }

        card.data(&summary)
    }
}
