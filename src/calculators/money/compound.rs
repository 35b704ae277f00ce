use super::MAX_HORIZON_YEARS;
use crate::core::{Calculator, Card, Env, Table};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::{format_currency, format_percent, plural};
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Compounding {
    Annually,
    Quarterly,
    Monthly,
    Daily,
}

impl Compounding {
    /// Unknown names compound monthly.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "annually" | "yearly" => Self::Annually,
            "quarterly" => Self::Quarterly,
            "daily" => Self::Daily,
            _ => Self::Monthly,
        }
    }

    pub fn periods_per_year(self) -> f64 {
        match self {
            Self::Annually => 1.0,
            Self::Quarterly => 4.0,
            Self::Monthly => 12.0,
            Self::Daily => 365.0,
        }
    }

    /// Equivalent rate for one monthly step.
    pub fn monthly_rate(self, annual_percent: f64) -> f64 {
        let n = self.periods_per_year();
        (1.0 + annual_percent / 100.0 / n).powf(n / 12.0) - 1.0
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GrowthYear {
    pub year: u32,
    pub contributions: f64,
    pub growth: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GrowthProjection {
    pub balance: f64,
    pub total_contributions: f64,
    pub total_growth: f64,
    pub last_contribution: f64,
    pub annualized_return: f64,
    pub schedule: Vec<GrowthYear>,
}

pub fn project(
    principal: f64,
    monthly_contribution: f64,
    annual_rate: f64,
    years: u32,
    compounding: Compounding,
    raise_percent: f64,
) -> Result<GrowthProjection> {
    if principal < 0.0 || years == 0 || annual_rate < 0.0 || monthly_contribution < 0.0 || raise_percent < 0.0 {
        return Err(CalcError::invalid(
            "Double-check your inputs. We need non-negative values and at least one year of growth.",
        ));
    }
    if years > MAX_HORIZON_YEARS {
        return Err(CalcError::invalid(format!(
            "Keep the projection to {} years or less.",
            MAX_HORIZON_YEARS
        )));
    }

    let monthly_rate = compounding.monthly_rate(annual_rate);
    let raise = if raise_percent > 0.0 { raise_percent / 100.0 } else { 0.0 };
    let mut balance = principal;
    let mut contribution = monthly_contribution;
    let mut last_contribution = monthly_contribution;
    let mut total_contributions = principal;
    let mut schedule = Vec::with_capacity(years as usize);

    for year in 1..=years {
        let mut row = GrowthYear { year, ..GrowthYear::default() };
        for _ in 0..12 {
            let growth = balance * monthly_rate;
            balance += growth + contribution;
            total_contributions += contribution;
            last_contribution = contribution;
            row.contributions += contribution;
            row.growth += growth;
        }
        row.balance = balance;
        schedule.push(row);
        if raise > 0.0 {
            contribution *= 1.0 + raise;
        }
    }

    let annualized_return = if total_contributions > 0.0 {
        (balance / total_contributions).powf(1.0 / f64::from(years)) - 1.0
    } else {
        annual_rate / 100.0
    };

    Ok(GrowthProjection {
        balance,
        total_contributions,
        total_growth: balance - total_contributions,
        last_contribution,
        annualized_return,
        schedule,
    })
}

pub struct CompoundInterestCalculator;

#[async_trait]
impl Calculator for CompoundInterestCalculator {
    fn key(&self) -> &'static str {
        "compound-interest-calculator"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let n = |f: &str| {
            let v = form.value(f);
            if v.is_finite() { v } else { 0.0 }
        };
        let years = n("years");
        let years = if years >= 1.0 { years.trunc() as u32 } else { 0 };
        let projection = project(
            n("principal"),
            n("contribution"),
            n("rate"),
            years,
            Compounding::parse(form.text_or("frequency", "monthly")),
            n("raise"),
        )?;

        let mut table = Table::new(&["Year", "Contributions", "Growth", "Ending balance"]);
        for row in &projection.schedule {
            table.push(&[
                format!("Year {}", row.year),
                format_currency(row.contributions),
                format_currency(row.growth),
                format_currency(row.balance),
            ]);
        }

        Card::new(format!(
            "Projected balance after {} year{}",
            years,
            plural(i64::from(years))
        ))
        .stat("Future value", format_currency(projection.balance))
        .stat("Total contributed", format_currency(projection.total_contributions))
        .stat("Growth earned", format_currency(projection.total_growth))
        .stat("Last monthly deposit", format_currency(projection.last_contribution))
        .stat("Avg. annualized return", format_percent(projection.annualized_return * 100.0, 2))
        .note("Returns assume smooth growth; real markets bounce around. Adjust contributions yearly to reflect expected raises.")
        .table(table)
        .data(&projection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_compounding_matches_closed_form() {
        let p = project(10_000.0, 200.0, 7.0, 10, Compounding::Monthly, 0.0).unwrap();
        assert!((p.balance - 54_713.58).abs() < 0.01);
        assert_eq!(p.total_contributions, 34_000.0);
        assert_eq!(p.schedule.len(), 10);
    }

    #[test]
    fn test_annual_compounding_equivalent_rate() {
        let monthly = Compounding::Annually.monthly_rate(12.0);
        assert!(((1.0 + monthly).powi(12) - 1.12).abs() < 1e-12);
        assert_eq!(Compounding::parse("weekly"), Compounding::Monthly);
    }

    #[test]
    fn test_raise_applies_after_each_year() {
        let p = project(0.0, 100.0, 0.0, 2, Compounding::Monthly, 10.0).unwrap();
        assert!((p.last_contribution - 110.0).abs() < 1e-9);
        assert!((p.schedule[1].contributions - 1_320.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_negative_inputs() {
        assert!(project(-1.0, 0.0, 5.0, 1, Compounding::Monthly, 0.0).is_err());
        assert!(project(1.0, 0.0, 5.0, 0, Compounding::Monthly, 0.0).is_err());
    }

    #[test]
    fn test_rejects_excessive_years() {
        assert!(project(1.0, 0.0, 5.0, MAX_HORIZON_YEARS, Compounding::Monthly, 0.0).is_ok());
        assert!(project(1.0, 0.0, 5.0, u32::MAX, Compounding::Monthly, 0.0).is_err());
    }
}
