use crate::core::{Calculator, Card, Env, Table};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::{format_currency, format_max};
use async_trait::async_trait;
use serde::Serialize;

const WEEKS_PER_YEAR: f64 = 52.0;
const WEEKS_PER_MONTH: f64 = 4.33;
const DAY_HOURS: f64 = 8.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct RateInput {
    pub income: f64,
    pub expenses: f64,
    pub hours_per_week: f64,
    pub weeks_off: f64,
    pub margin_percent: f64,
    pub reserve_percent: f64,
    pub project_hours: f64,
    pub project_expenses: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProjectQuote {
    pub labor: f64,
    pub expenses: f64,
    pub total: f64,
    pub break_even: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FreelanceRate {
    pub billable_hours: f64,
    pub break_even_hourly: f64,
    pub recommended_hourly: f64,
    pub day_rate: f64,
    pub month_retainer: f64,
    pub reserve: f64,
    pub revenue: f64,
    pub take_home: f64,
    pub project: Option<ProjectQuote>,
}

fn positive(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

pub fn recommend(input: &RateInput) -> Result<FreelanceRate> {
    if !input.income.is_finite() || input.income <= 0.0 {
        return Err(CalcError::invalid(
            "Enter the annual take-home pay you want from freelancing.",
        ));
    }
    if !input.hours_per_week.is_finite() || input.hours_per_week <= 0.0 {
        return Err(CalcError::invalid(
            "Billable hours per week must be greater than zero.",
        ));
    }
    let working_weeks = WEEKS_PER_YEAR - positive(input.weeks_off);
    if working_weeks <= 0.0 {
        return Err(CalcError::invalid("Leave at least one working week in the year."));
    }
    let reserve_rate = positive(input.reserve_percent) / 100.0;
    if reserve_rate >= 1.0 {
        return Err(CalcError::invalid("The reserve percentage must be below 100%."));
    }

    let billable_hours = input.hours_per_week * working_weeks;
    let expenses = positive(input.expenses);
    let margin = positive(input.margin_percent) / 100.0;
    let cost_with_reserve = (input.income + expenses) / (1.0 - reserve_rate);
    let revenue = cost_with_reserve * (1.0 + margin);
    let break_even_hourly = cost_with_reserve / billable_hours;
    let recommended_hourly = revenue / billable_hours;
    let reserve = revenue * reserve_rate;

    let project = (input.project_hours.is_finite() && input.project_hours > 0.0).then(|| {
        let expenses = positive(input.project_expenses);
        let labor = recommended_hourly * input.project_hours;
        ProjectQuote {
            labor,
            expenses,
            total: labor + expenses,
            break_even: break_even_hourly * input.project_hours + expenses,
        }
    });

    Ok(FreelanceRate {
        billable_hours,
        break_even_hourly,
        recommended_hourly,
        day_rate: recommended_hourly * DAY_HOURS,
        month_retainer: recommended_hourly * input.hours_per_week * WEEKS_PER_MONTH,
        reserve,
        revenue,
        take_home: revenue - reserve - expenses,
        project,
    })
}

pub struct FreelancerRateCalculator;

#[async_trait]
impl Calculator for FreelancerRateCalculator {
    fn key(&self) -> &'static str {
        "freelancer-hourly-rate-calculator"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let input = RateInput {
            income: form.value_or("income", 0.0),
            expenses: form.value_or("expenses", 0.0),
            hours_per_week: form.value_or("hours", 0.0),
            weeks_off: form.value_or("weeks_off", 0.0),
            margin_percent: form.value_or("margin", 0.0),
            reserve_percent: form.value_or("reserve", 0.0),
            project_hours: form.value_or("project_hours", 0.0),
            project_expenses: form.value_or("project_expenses", 0.0),
        };
        let rate = recommend(&input)?;

        let mut card = Card::new(format!(
            "Charge about {} per billable hour",
            format_currency(rate.recommended_hourly)
        ))
        .stat("Annual billable hours", format_max(rate.billable_hours, 2))
        .stat("Base hourly (covers goals)", format_currency(rate.break_even_hourly))
        .stat("Recommended hourly", format_currency(rate.recommended_hourly))
        .stat("Day rate (8 hrs)", format_currency(rate.day_rate))
        .stat("Monthly retainer*", format_currency(rate.month_retainer))
        .stat("Reserve set aside", format_currency(rate.reserve))
        .stat("Target revenue", format_currency(rate.revenue))
        .stat("Est. take-home after reserve", format_currency(rate.take_home))
        .note(format!(
            "*Monthly retainer assumes {} billable hours each week ({} hours per month).",
            format_max(input.hours_per_week, 2),
            format_max(input.hours_per_week * WEEKS_PER_MONTH, 2)
        ));

        if let Some(project) = rate.project {
            let mut table = Table::new(&["Project estimate", "Amount"]);
            table.push(&[
                format!("Hours @ recommended rate ({})", format_currency(rate.recommended_hourly)),
                format_currency(project.labor),
            ]);
            table.push(&["Expenses".to_string(), format_currency(project.expenses)]);
            table.push(&["Suggested quote".to_string(), format_currency(project.total)]);
            table.push(&["Quote to just break even".to_string(), format_currency(project.break_even)]);
            card = card.table(table);
        }

        card.data(&rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_and_margin() {
        let input = RateInput {
            income: 80_000.0,
            expenses: 10_000.0,
            hours_per_week: 25.0,
            weeks_off: 4.0,
            margin_percent: 10.0,
            reserve_percent: 25.0,
            ..RateInput::default()
        };
        let rate = recommend(&input).unwrap();
        assert_eq!(rate.billable_hours, 1_200.0);
        assert!((rate.break_even_hourly - 100.0).abs() < 1e-9);
        assert!((rate.recommended_hourly - 110.0).abs() < 1e-9);
        assert!((rate.day_rate - 880.0).abs() < 1e-9);
        assert!(rate.project.is_none());
    }

    #[test]
    fn test_project_quote() {
        let input = RateInput {
            income: 52_000.0,
            hours_per_week: 20.0,
            project_hours: 10.0,
            project_expenses: 150.0,
            ..RateInput::default()
        };
        let rate = recommend(&input).unwrap();
        let project = rate.project.unwrap();
        assert!((project.labor - 500.0).abs() < 1e-9);
        assert!((project.total - 650.0).abs() < 1e-9);
    }

    #[test]
    fn test_guards() {
        let bad_reserve = RateInput { income: 1.0, hours_per_week: 1.0, reserve_percent: 100.0, ..RateInput::default() };
        assert!(recommend(&bad_reserve).is_err());
        let no_weeks = RateInput { income: 1.0, hours_per_week: 1.0, weeks_off: 52.0, ..RateInput::default() };
        assert!(recommend(&no_weeks).is_err());
    }
}
