use super::debt::{MAX_MONTHS, STALL_MONTHS};
use crate::core::{Calculator, Card, Env, Table};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::{format_currency, format_max, format_months};
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CardPlan {
    pub payment: f64,
    pub months: u32,
    pub total_interest: f64,
    pub total_paid: f64,
    pub stalled: bool,
    pub ending_balance: f64,
}

/// Each month: new charges land, interest accrues on the result, then the
/// payment (never below `min_floor`) comes off.
pub fn simulate(balance: f64, apr: f64, payment: f64, charges: f64, min_floor: f64) -> CardPlan {
    let monthly_rate = if apr > 0.0 { apr / 100.0 / 12.0 } else { 0.0 };
    let mut current = balance;
    let mut months = 0;
    let mut total_interest = 0.0;
    let mut total_paid = 0.0;
    let mut stalled = false;
    let mut no_progress = 0;

    while months < MAX_MONTHS && current > 0.01 {
        months += 1;
        let starting = current;
        current += charges;
        let interest = current * monthly_rate;
        current += interest;
        total_interest += interest;

        let pay = payment.max(min_floor).min(current);
        current -= pay;
        total_paid += pay;

        if current >= starting - 0.01 && interest + charges >= pay - 0.01 {
            no_progress += 1;
        } else {
            no_progress = 0;
        }
        if no_progress >= STALL_MONTHS {
            stalled = true;
            break;
        }
    }
    if current > 0.01 && months >= MAX_MONTHS {
        stalled = true;
    }

    CardPlan {
        payment: payment.max(min_floor),
        months,
        total_interest,
        total_paid,
        stalled,
        ending_balance: current,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CardOutlook {
    pub balance: f64,
    pub apr: f64,
    pub first_month_interest: f64,
    pub charges: f64,
    pub floor: f64,
    pub current: CardPlan,
    pub with_extra: CardPlan,
    pub has_extra: bool,
}

impl CardOutlook {
    pub fn interest_saved(&self) -> f64 {
        self.current.total_interest - self.with_extra.total_interest
    }

    pub fn comparison(&self) -> String {
        if !self.has_extra {
            return "Paying extra each month doesn't change the payoff because no additional payment was entered.".to_string();
        }
        if self.with_extra.stalled {
            return "Even with the extra payment, the balance doesn't shrink. Raise the payment or stop new charges.".to_string();
        }
        if self.current.stalled {
            return "Adding the extra payment is enough to reverse the balance and pay the card off.".to_string();
        }
        let saved = self.current.months.saturating_sub(self.with_extra.months);
        let cut = if saved > 0 {
            format!("{} months from the payoff timeline", saved)
        } else {
            "no time from the payoff timeline".to_string()
        };
        format!(
            "Extra payments save {} in interest and cut {}.",
            format_currency(self.interest_saved()),
            cut
        )
    }
}

fn positive_or_zero(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

pub fn outlook(
    balance: f64,
    apr: f64,
    payment: f64,
    extra: f64,
    charges: f64,
    minimum: f64,
) -> Result<CardOutlook> {
    if !balance.is_finite() || balance <= 0.0 {
        return Err(CalcError::invalid("Enter a credit card balance above zero."));
    }
    if !apr.is_finite() || apr < 0.0 {
        return Err(CalcError::invalid("APR must be zero or higher."));
    }
    if !payment.is_finite() || payment <= 0.0 {
        return Err(CalcError::invalid("Monthly payment must be greater than zero."));
    }
    let extra = positive_or_zero(extra);
    let charges = positive_or_zero(charges);
    let floor = positive_or_zero(minimum);
    let monthly_rate = if apr > 0.0 { apr / 100.0 / 12.0 } else { 0.0 };

    Ok(CardOutlook {
        balance,
        apr,
        first_month_interest: (balance + charges) * monthly_rate,
        charges,
        floor,
        current: simulate(balance, apr, payment, charges, floor),
        with_extra: simulate(balance, apr, payment + extra, charges, floor),
        has_extra: extra > 0.0,
    })
}

pub struct CreditCardInterestCalculator;

#[async_trait]
impl Calculator for CreditCardInterestCalculator {
    fn key(&self) -> &'static str {
        "credit-card-interest-calculator"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let result = outlook(
            form.value_or("balance", 0.0),
            form.value_or("rate", 0.0),
            form.value_or("payment", 0.0),
            form.value_or("extra", 0.0),
            form.value_or("charges", 0.0),
            form.value_or("minimum", 0.0),
        )?;

        let extra_label = if result.has_extra {
            "With extra payment"
        } else {
            "With current payment"
        };
        let mut table = Table::new(&["Scenario", "Monthly payment", "Payoff timeline", "Total interest", "Total paid"]);
        for (label, plan) in [("Current payment", &result.current), (extra_label, &result.with_extra)] {
            let timeline = if plan.stalled {
                "Not paid off".to_string()
            } else {
                format_months(plan.months)
            };
            table.push(&[
                label.to_string(),
                format_currency(plan.payment),
                timeline,
                format_currency(plan.total_interest),
                format_currency(plan.total_paid),
            ]);
        }

        let mut card = Card::new("Credit card payoff outlook")
            .stat("Starting balance", format_currency(result.balance))
            .stat("APR", format!("{}%", format_max(result.apr, 2)))
            .stat("First month interest", format_currency(result.first_month_interest))
            .stat("Monthly charges added", format_currency(result.charges))
            .stat("Payment floor", format_currency(result.floor))
            .table(table)
            .note(result.comparison());
        if result.current.stalled {
            card = card.note(format!(
                "With your current payment, the balance grows to {} after about {} months.",
                format_currency(result.current.ending_balance),
                result.current.months
            ));
        }
        card.data(&result)
    }
}
