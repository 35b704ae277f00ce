use crate::core::{Calculator, Card, Env, Table};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::{format_currency, format_max};
use async_trait::async_trait;
use serde::Serialize;

pub const DEFAULT_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OvertimePay {
    pub regular_hours: f64,
    pub overtime_hours: f64,
    pub double_hours: f64,
    pub multiplier: f64,
    pub regular_pay: f64,
    pub overtime_pay: f64,
    pub double_pay: f64,
    pub bonus: f64,
    pub total: f64,
    pub straight_time: f64,
    pub premium: f64,
    pub effective_hourly: f64,
}

impl OvertimePay {
    pub fn total_hours(&self) -> f64 {
        self.regular_hours + self.overtime_hours + self.double_hours
    }
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

pub fn compute(
    rate: f64,
    regular_hours: f64,
    overtime_hours: f64,
    multiplier: f64,
    double_hours: f64,
    bonus: f64,
) -> Result<OvertimePay> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(CalcError::invalid("Please enter a base hourly rate above zero."));
    }
    if !regular_hours.is_finite() || regular_hours < 0.0 {
        return Err(CalcError::invalid("Regular hours cannot be negative."));
    }
    let overtime_hours = non_negative(overtime_hours);
    let double_hours = non_negative(double_hours);
    let bonus = non_negative(bonus);
    let multiplier = if multiplier.is_finite() && multiplier >= 1.0 {
        multiplier
    } else {
        DEFAULT_MULTIPLIER
    };

    let hours = regular_hours + overtime_hours + double_hours;
    if hours <= 0.0 {
        return Err(CalcError::invalid("Add at least one hour of work to calculate pay."));
    }

    let regular_pay = rate * regular_hours;
    let overtime_pay = rate * overtime_hours * multiplier;
    let double_pay = rate * double_hours * 2.0;
    let total = regular_pay + overtime_pay + double_pay + bonus;
    let straight_time = rate * hours;

    Ok(OvertimePay {
        regular_hours,
        overtime_hours,
        double_hours,
        multiplier,
        regular_pay,
        overtime_pay,
        double_pay,
        bonus,
        total,
        straight_time,
        premium: total - straight_time,
        effective_hourly: total / hours,
    })
}

pub struct OvertimePayCalculator;

#[async_trait]
impl Calculator for OvertimePayCalculator {
    fn key(&self) -> &'static str {
        "overtime-pay-calculator"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let pay = compute(
            form.value_or("rate", 0.0),
            form.value_or("regular_hours", 0.0),
            form.value_or("overtime_hours", 0.0),
            form.value_or("multiplier", DEFAULT_MULTIPLIER),
            form.value_or("double_hours", 0.0),
            form.value_or("bonus", 0.0),
        )?;

        let mut table = Table::new(&["Category", "Hours", "Pay"]);
        table.push(&["Regular time".to_string(), format_max(pay.regular_hours, 2), format_currency(pay.regular_pay)]);
        table.push(&[
            format!("Overtime ({}×)", format_max(pay.multiplier, 2)),
            format_max(pay.overtime_hours, 2),
            format_currency(pay.overtime_pay),
        ]);
        table.push(&["Double time (2×)".to_string(), format_max(pay.double_hours, 2), format_currency(pay.double_pay)]);
        table.push(&["Premium earned".to_string(), "—".to_string(), format_currency(pay.premium)]);
        table.push(&["Bonus".to_string(), "—".to_string(), format_currency(pay.bonus)]);

        Card::new(format!("Total pay: {}", format_currency(pay.total)))
            .stat("Regular pay", format_currency(pay.regular_pay))
            .stat("Overtime pay", format_currency(pay.overtime_pay))
            .stat("Double-time pay", format_currency(pay.double_pay))
            .stat("Bonuses & stipends", format_currency(pay.bonus))
            .stat("Total hours", format!("{} hrs", format_max(pay.total_hours(), 2)))
            .stat("Effective hourly rate", format_currency(pay.effective_hourly))
            .table(table)
            .note(format!(
                "Base pay for all hours at the standard rate would be {}; overtime rules add {}.",
                format_currency(pay.straight_time),
                format_currency(pay.premium)
            ))
            .data(&pay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_and_a_half() {
        let pay = compute(20.0, 40.0, 10.0, 1.5, 0.0, 0.0).unwrap();
        assert_eq!(pay.total, 1_100.0);
        assert_eq!(pay.premium, 100.0);
        assert_eq!(pay.effective_hourly, 22.0);
    }

    #[test]
    fn test_double_time_and_bonus() {
        let pay = compute(30.0, 40.0, 0.0, 1.5, 4.0, 50.0).unwrap();
        assert_eq!(pay.double_pay, 240.0);
        assert_eq!(pay.total, 1_200.0 + 240.0 + 50.0);
    }

    #[test]
    fn test_bad_multiplier_falls_back() {
        let pay = compute(10.0, 0.0, 2.0, 0.5, 0.0, 0.0).unwrap();
        assert_eq!(pay.multiplier, DEFAULT_MULTIPLIER);
        assert!(compute(10.0, 0.0, 0.0, 1.5, 0.0, 0.0).is_err());
        assert!(compute(0.0, 40.0, 0.0, 1.5, 0.0, 0.0).is_err());
    }
}
