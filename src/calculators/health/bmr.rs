use super::measure::{positive, Units};
use crate::core::{Calculator, Card, Env};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::format_fixed;
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    /// Defaults to female, matching the form's first option.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("male") {
            Self::Male
        } else {
            Self::Female
        }
    }
}

/// (id, factor, label)
pub const ACTIVITY: [(&str, f64, &str); 5] = [
    ("sedentary", 1.2, "Sedentary (little or no exercise)"),
    ("light", 1.375, "Lightly active (1-3 days/week)"),
    ("moderate", 1.55, "Moderately active (3-5 days/week)"),
    ("active", 1.725, "Very active (6-7 days/week)"),
    ("very", 1.9, "Extra active (physical job or twice daily)"),
];

/// Accepts an activity id or a raw factor.
pub fn activity(input: &str) -> Option<(f64, &'static str)> {
    let input = input.trim();
    if let Some((_, factor, label)) = ACTIVITY.iter().find(|(id, _, _)| id.eq_ignore_ascii_case(input)) {
        return Some((*factor, label));
    }
    let factor: f64 = input.parse().ok()?;
    ACTIVITY
        .iter()
        .find(|(_, f, _)| (f - factor).abs() < 1e-9)
        .map(|(_, f, label)| (*f, *label))
        .or((factor.is_finite() && factor > 0.0).then_some((factor, "Custom activity factor")))
}

/// Mifflin-St Jeor.
pub fn mifflin_st_jeor(sex: Sex, age: f64, height_cm: f64, weight_kg: f64) -> f64 {
    let offset = match sex {
        Sex::Male => 5.0,
        Sex::Female => -161.0,
    };
    10.0 * weight_kg + 6.25 * height_cm - 5.0 * age + offset
}

pub fn round_to_ten(value: f64) -> f64 {
    (value / 10.0).round() * 10.0
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EnergyTargets {
    pub bmr: f64,
    pub maintenance: f64,
    pub mild_deficit: f64,
    pub moderate_deficit: f64,
    pub surplus: f64,
}

/// Deficits never drop below 95% / 90% of BMR.
pub fn targets(bmr: f64, factor: f64) -> EnergyTargets {
    let maintenance = bmr * factor;
    EnergyTargets {
        bmr,
        maintenance,
        mild_deficit: (maintenance - 250.0).max(bmr * 0.95),
        moderate_deficit: (maintenance - 500.0).max(bmr * 0.9),
        surplus: maintenance + 250.0,
    }
}

fn kcal(value: f64) -> String {
    format!("{} kcal", format_fixed(round_to_ten(value), 0))
}

pub struct BmrCalorieCalculator;

#[async_trait]
impl Calculator for BmrCalorieCalculator {
    fn key(&self) -> &'static str {
        "bmr-calorie-calculator"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let units = Units::parse(form.text_or("units", "metric"));
        let sex = Sex::parse(form.text_or("gender", "female"));
        let age = positive(form.value("age"), "Enter an age above zero.")?;
        let height = positive(form.value("height"), "Enter a height above zero.")?;
        let weight = positive(form.value("weight"), "Enter a weight above zero.")?;
        let (factor, label) = activity(form.text_or("activity", "sedentary"))
            .ok_or_else(|| CalcError::invalid("Select an activity level."))?;

        let bmr = mifflin_st_jeor(sex, age, units.to_cm(height), units.to_kg(weight));
        let t = targets(bmr, factor);

        Card::new("Daily energy targets")
            .stat("Basal metabolic rate", kcal(t.bmr))
            .stat_hint("Maintenance calories", kcal(t.maintenance), label)
            .stat_hint("Gentle deficit", kcal(t.mild_deficit), "≈250 kcal below maintenance")
            .stat_hint("Moderate deficit", kcal(t.moderate_deficit), "≈500 kcal below maintenance")
            .stat_hint("Lean bulk", kcal(t.surplus), "≈250 kcal above maintenance")
            .note("Calorie ranges are estimates. Monitor energy, recovery, and progress, and adjust weekly if needed.")
            .data(&t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mifflin() {
        let male = mifflin_st_jeor(Sex::Male, 30.0, 180.0, 80.0);
        assert_eq!(male, 1780.0);
        let female = mifflin_st_jeor(Sex::Female, 30.0, 165.0, 60.0);
        assert!((female - 1320.25).abs() < 1e-9);
    }

    #[test]
    fn test_targets_round_and_floor() {
        let t = targets(1780.0, 1.55);
        assert_eq!(round_to_ten(t.maintenance), 2760.0);
        assert_eq!(round_to_ten(t.moderate_deficit), 2260.0);
        let low = targets(1200.0, 1.2);
        assert_eq!(low.moderate_deficit, 1200.0 * 0.9);
        assert_eq!(kcal(t.surplus), "3,010 kcal");
    }

    #[test]
    fn test_activity_lookup() {
        assert_eq!(activity("moderate").map(|a| a.0), Some(1.55));
        assert_eq!(activity("1.725").map(|a| a.1), Some("Very active (6-7 days/week)"));
        assert!(activity("lazy").is_none());
    }
}
