//! 2024 take-home pay estimate: federal brackets after the standard
//! deduction, FICA, and a flat state rate.

use crate::core::{Calculator, Card, Env, Table};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::{format_currency, format_max, format_percent};
use async_trait::async_trait;
use serde::Serialize;

const SOCIAL_SECURITY_RATE: f64 = 0.062;
const SOCIAL_SECURITY_WAGE_BASE: f64 = 168_600.0;
const MEDICARE_RATE: f64 = 0.0145;
const ADDITIONAL_MEDICARE_RATE: f64 = 0.009;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilingStatus {
    Single,
    Married,
}

impl FilingStatus {
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("married") {
            Self::Married
        } else {
            Self::Single
        }
    }

    pub fn standard_deduction(self) -> f64 {
        match self {
            Self::Single => 14_600.0,
            Self::Married => 29_200.0,
        }
    }

    /// (upper bound, marginal rate)
    fn brackets(self) -> &'static [(f64, f64); 7] {
        match self {
            Self::Single => &[
                (11_600.0, 0.10),
                (47_150.0, 0.12),
                (100_525.0, 0.22),
                (191_950.0, 0.24),
                (243_725.0, 0.32),
                (609_350.0, 0.35),
                (f64::INFINITY, 0.37),
            ],
            Self::Married => &[
                (23_200.0, 0.10),
                (94_300.0, 0.12),
                (201_050.0, 0.22),
                (383_900.0, 0.24),
                (487_450.0, 0.32),
                (731_200.0, 0.35),
                (f64::INFINITY, 0.37),
            ],
        }
    }

    fn additional_medicare_threshold(self) -> f64 {
        match self {
            Self::Single => 200_000.0,
            Self::Married => 250_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayFrequency {
    Annual,
    Monthly,
    SemiMonthly,
    Biweekly,
    Weekly,
}

impl PayFrequency {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "annual" => Some(Self::Annual),
            "monthly" => Some(Self::Monthly),
            "semi-monthly" | "semimonthly" => Some(Self::SemiMonthly),
            "biweekly" => Some(Self::Biweekly),
            "weekly" => Some(Self::Weekly),
            _ => None,
        }
    }

    pub fn periods(self) -> f64 {
        match self {
            Self::Annual => 1.0,
            Self::Monthly => 12.0,
            Self::SemiMonthly => 24.0,
            Self::Biweekly => 26.0,
            Self::Weekly => 52.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Annual => "year",
            Self::Monthly => "month",
            _ => "paycheck",
        }
    }
}

/// (code, name, flat rate)
pub const STATES: [(&str, &str, f64); 51] = [
    ("AL", "Alabama", 0.05),
    ("AK", "Alaska", 0.0),
    ("AZ", "Arizona", 0.025),
    ("AR", "Arkansas", 0.049),
    ("CA", "California", 0.06),
    ("CO", "Colorado", 0.044),
    ("CT", "Connecticut", 0.05),
    ("DE", "Delaware", 0.055),
    ("DC", "District of Columbia", 0.06),
    ("FL", "Florida", 0.0),
    ("GA", "Georgia", 0.05),
    ("HI", "Hawaii", 0.075),
    ("ID", "Idaho", 0.058),
    ("IL", "Illinois", 0.0495),
    ("IN", "Indiana", 0.0323),
    ("IA", "Iowa", 0.057),
    ("KS", "Kansas", 0.057),
    ("KY", "Kentucky", 0.045),
    ("LA", "Louisiana", 0.0425),
    ("ME", "Maine", 0.058),
    ("MD", "Maryland", 0.0575),
    ("MA", "Massachusetts", 0.05),
    ("MI", "Michigan", 0.0405),
    ("MN", "Minnesota", 0.068),
    ("MS", "Mississippi", 0.047),
    ("MO", "Missouri", 0.0495),
    ("MT", "Montana", 0.059),
    ("NE", "Nebraska", 0.058),
    ("NV", "Nevada", 0.0),
    ("NH", "New Hampshire", 0.0),
    ("NJ", "New Jersey", 0.0637),
    ("NM", "New Mexico", 0.049),
    ("NY", "New York", 0.065),
    ("NC", "North Carolina", 0.0475),
    ("ND", "North Dakota", 0.025),
    ("OH", "Ohio", 0.035),
    ("OK", "Oklahoma", 0.0475),
    ("OR", "Oregon", 0.0775),
    ("PA", "Pennsylvania", 0.0307),
    ("RI", "Rhode Island", 0.0599),
    ("SC", "South Carolina", 0.05),
    ("SD", "South Dakota", 0.0),
    ("TN", "Tennessee", 0.0),
    ("TX", "Texas", 0.0),
    ("UT", "Utah", 0.0465),
    ("VT", "Vermont", 0.066),
    ("VA", "Virginia", 0.0575),
    ("WA", "Washington", 0.0),
    ("WV", "West Virginia", 0.051),
    ("WI", "Wisconsin", 0.05),
    ("WY", "Wyoming", 0.0),
];

/// Unknown codes are taxed at zero under their own label.
pub fn state(code: &str) -> (String, f64) {
    let code = code.trim().to_ascii_uppercase();
    STATES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, name, rate)| (name.to_string(), *rate))
        .unwrap_or((code, 0.0))
}

pub fn federal_tax(income: f64, status: FilingStatus) -> f64 {
    let taxable = (income - status.standard_deduction()).max(0.0);
    let mut tax = 0.0;
    let mut lower = 0.0;
    for &(cap, rate) in status.brackets() {
        if taxable <= lower {
            break;
        }
        tax += (cap.min(taxable) - lower) * rate;
        lower = cap;
    }
    tax
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fica {
    pub social_security: f64,
    pub medicare: f64,
}

pub fn fica(wages: f64, status: FilingStatus) -> Fica {
    let wages = wages.max(0.0);
    let additional = (wages - status.additional_medicare_threshold()).max(0.0) * ADDITIONAL_MEDICARE_RATE;
    Fica {
        social_security: wages.min(SOCIAL_SECURITY_WAGE_BASE) * SOCIAL_SECURITY_RATE,
        medicare: wages * MEDICARE_RATE + additional,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Paycheck {
    pub frequency: PayFrequency,
    pub status: FilingStatus,
    pub state_name: String,
    pub state_rate: f64,
    pub gross_per_period: f64,
    pub pretax_per_period: f64,
    pub posttax_per_period: f64,
    pub federal_tax: f64,
    pub state_tax: f64,
    pub fica: Fica,
    pub total_tax: f64,
    pub net_annual: f64,
    pub net_per_period: f64,
    pub effective_rate: f64,
}

pub fn estimate(
    income: f64,
    frequency: Option<PayFrequency>,
    status: FilingStatus,
    state_code: &str,
    pretax: f64,
    posttax: f64,
) -> Result<Paycheck> {
    let frequency = match frequency {
        Some(f) if income.is_finite() && income > 0.0 => f,
        _ => return Err(CalcError::invalid("Please enter a gross income above zero.")),
    };
    let periods = frequency.periods();
    let pretax = if pretax.is_finite() && pretax > 0.0 { pretax } else { 0.0 };
    let posttax = if posttax.is_finite() && posttax > 0.0 { posttax } else { 0.0 };

    let taxable = (income - pretax * periods).max(0.0);
    let federal = federal_tax(taxable, status);
    let (state_name, state_rate) = state(state_code);
    let state_tax = taxable * state_rate;
    let payroll = fica(taxable, status);
    let total_tax = federal + state_tax + payroll.social_security + payroll.medicare;
    let net_annual = (income - pretax * periods - total_tax - posttax * periods).max(0.0);

    Ok(Paycheck {
        frequency,
        status,
        state_name,
        state_rate,
        gross_per_period: income / periods,
        pretax_per_period: pretax,
        posttax_per_period: posttax,
        federal_tax: federal,
        state_tax,
        fica: payroll,
        total_tax,
        net_annual,
        net_per_period: net_annual / periods,
        effective_rate: total_tax / income,
    })
}

pub struct PaycheckTaxCalculator;

#[async_trait]
impl Calculator for PaycheckTaxCalculator {
    fn key(&self) -> &'static str {
        "paycheck-tax-calculator"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let status = FilingStatus::parse(form.text_or("status", "single"));
        let result = estimate(
            form.value_or("income", 0.0),
            PayFrequency::parse(form.text_or("frequency", "biweekly")),
            status,
            form.text_or("state", "TX"),
            form.value_or("pretax", 0.0),
            form.value_or("posttax", 0.0),
        )?;
        let periods = result.frequency.periods();
        let per = result.frequency.label();

        let mut table = Table::new(&["Category".to_string(), "Annual".to_string(), format!("Per {}", per)]);
        let rows = [
            ("Federal income tax".to_string(), result.federal_tax),
            (format!("{} income tax", result.state_name), result.state_tax),
            ("Social Security".to_string(), result.fica.social_security),
            ("Medicare".to_string(), result.fica.medicare),
            ("Post-tax deductions".to_string(), result.posttax_per_period * periods),
        ];
        for (label, annual) in rows {
            table.push(&[label, format_currency(annual), format_currency(annual / periods)]);
        }

        let state_note = if result.state_rate == 0.0 {
            format!("{} has no state income tax in this estimate.", result.state_name)
        } else {
            format!("State rate assumed: {}%.", format_max(result.state_rate * 100.0, 2))
        };

        Card::new(format!(
            "Estimated take-home: {} per {}",
            format_currency(result.net_per_period),
            per
        ))
        .stat(format!("Gross per {}", per), format_currency(result.gross_per_period))
        .stat("Pre-tax deductions", format_currency(result.pretax_per_period))
        .stat(format!("Taxes per {}", per), format_currency(result.total_tax / periods))
        .stat(format!("Net pay per {}", per), format_currency(result.net_per_period))
        .stat("Annual take-home", format_currency(result.net_annual))
        .stat("Effective tax rate", format_percent(result.effective_rate * 100.0, 2))
        .table(table)
        .note(format!(
            "Standard deduction applied: {}. {}",
            format_currency(status.standard_deduction()),
            state_note
        ))
        .data(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_federal_brackets_single() {
        // taxable 60,000 - 14,600 = 45,400
        let tax = federal_tax(60_000.0, FilingStatus::Single);
        let expected = 11_600.0 * 0.10 + (45_400.0 - 11_600.0) * 0.12;
        assert!((tax - expected).abs() < 1e-9);
        assert_eq!(federal_tax(10_000.0, FilingStatus::Married), 0.0);
    }

    #[test]
    fn test_fica_caps() {
        let high = fica(300_000.0, FilingStatus::Single);
        assert!((high.social_security - 168_600.0 * 0.062).abs() < 1e-9);
        assert!((high.medicare - (300_000.0 * 0.0145 + 100_000.0 * 0.009)).abs() < 1e-9);
    }

    #[test]
    fn test_texas_biweekly() {
        let pay = estimate(
            78_000.0,
            Some(PayFrequency::Biweekly),
            FilingStatus::Single,
            "tx",
            0.0,
            0.0,
        )
        .unwrap();
        assert_eq!(pay.state_name, "Texas");
        assert_eq!(pay.state_tax, 0.0);
        assert!((pay.gross_per_period - 3_000.0).abs() < 1e-9);
        assert!((pay.net_annual + pay.total_tax - 78_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_pretax_lowers_taxable_income() {
        let base = estimate(90_000.0, Some(PayFrequency::Monthly), FilingStatus::Single, "CA", 0.0, 0.0).unwrap();
        let with_401k = estimate(90_000.0, Some(PayFrequency::Monthly), FilingStatus::Single, "CA", 500.0, 0.0).unwrap();
        assert!(with_401k.total_tax < base.total_tax);
        assert!((with_401k.state_tax - 84_000.0 * 0.06).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_frequency() {
        assert!(estimate(50_000.0, PayFrequency::parse("daily"), FilingStatus::Single, "NY", 0.0, 0.0).is_err());
    }
}
