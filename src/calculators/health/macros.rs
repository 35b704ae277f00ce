use super::measure::{positive, Units, LB_PER_KG};
use crate::core::{Calculator, Card, Env};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::format_max;
use async_trait::async_trait;
use serde::Serialize;

/// Preset splits as (id, label, protein %, carbs %, fat %).
pub const PRESETS: [(&str, &str, f64, f64, f64); 4] = [
    ("balanced", "Balanced (30 / 40 / 30%)", 30.0, 40.0, 30.0),
    ("cut", "Fat loss (40 / 30 / 30%)", 40.0, 30.0, 30.0),
    ("bulk", "Muscle gain (30 / 50 / 20%)", 30.0, 50.0, 20.0),
    ("keto", "Keto (25 / 5 / 70%)", 25.0, 5.0, 70.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Split {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Split {
    /// Percentages each in 0..=100 and totalling 100 ± 0.5.
    pub fn custom(protein: f64, carbs: f64, fat: f64) -> Result<Self> {
        let parts = [protein, carbs, fat];
        if parts.iter().any(|p| !p.is_finite()) {
            return Err(CalcError::invalid("Enter percentages for protein, carbs, and fat."));
        }
        if parts.iter().any(|p| *p < 0.0) {
            return Err(CalcError::invalid("Custom percentages cannot be negative."));
        }
        if parts.iter().any(|p| *p > 100.0) {
            return Err(CalcError::invalid("Each macro percentage should be 100% or less."));
        }
        let total: f64 = parts.iter().sum();
        if total <= 0.0 {
            return Err(CalcError::invalid(
                "Custom macro percentages must add up to more than zero.",
            ));
        }
        if (total - 100.0).abs() > 0.5 {
            return Err(CalcError::invalid(format!(
                "Custom macro percentages should total 100%. You're currently at {:.1}%.",
                total
            )));
        }
        Ok(Self { protein, carbs, fat })
    }
}

pub fn preset(id: &str) -> Option<(&'static str, Split)> {
    PRESETS
        .iter()
        .find(|(key, ..)| key.eq_ignore_ascii_case(id.trim()))
        .map(|(_, label, protein, carbs, fat)| {
            (*label, Split { protein: *protein, carbs: *carbs, fat: *fat })
        })
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MacroPlan {
    pub calories: f64,
    pub split: Split,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub protein_per_kg: f64,
    pub protein_per_lb: f64,
}

/// 4 kcal/g for protein and carbs, 9 kcal/g for fat.
pub fn plan(calories: f64, weight_kg: f64, split: Split) -> MacroPlan {
    let protein_g = calories * split.protein / 100.0 / 4.0;
    MacroPlan {
        calories,
        split,
        protein_g,
        carbs_g: calories * split.carbs / 100.0 / 4.0,
        fat_g: calories * split.fat / 100.0 / 9.0,
        protein_per_kg: protein_g / weight_kg,
        protein_per_lb: protein_g / (weight_kg * LB_PER_KG),
    }
}

fn grams(g: f64, percent: f64) -> String {
    format!("{} g ({}%)", g.round(), percent.round())
}

pub struct MacrosCalculator;

#[async_trait]
impl Calculator for MacrosCalculator {
    fn key(&self) -> &'static str {
        "macros-calculator"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let units = Units::parse(form.text_or("units", "metric"));
        let weight = positive(form.value("weight"), "Enter a body weight above zero.")?;
        let calories = positive(form.value("calories"), "Enter a calorie goal above zero.")?;

        let goal = form.text_or("goal", "balanced");
        let (label, split) = if goal.eq_ignore_ascii_case("custom") {
            let split = Split::custom(
                form.value_or("protein", 0.0),
                form.value_or("carbs", 0.0),
                form.value_or("fat", 0.0),
            )?;
            let label = format!(
                "Custom split ({:.0} / {:.0} / {:.0}%)",
                split.protein, split.carbs, split.fat
            );
            (label, split)
        } else {
            let (label, split) = preset(goal).ok_or_else(|| {
                CalcError::invalid("Unable to read the macro split. Try choosing another option.")
            })?;
            (label.to_string(), split)
        };

        let p = plan(calories, units.to_kg(weight), split);
        Card::new(format!("{} kcal macro plan", format_max(calories, 3)))
            .stat("Protein", grams(p.protein_g, split.protein))
            .stat("Carbohydrates", grams(p.carbs_g, split.carbs))
            .stat("Fats", grams(p.fat_g, split.fat))
            .stat(
                "Protein density",
                format!("{:.2} g/kg · {:.2} g/lb", p.protein_per_kg, p.protein_per_lb),
            )
            .stat("Macro split", label)
            .note("Pair these targets with whole foods, fiber, and plenty of water. Reassess every few weeks based on gym performance and recovery.")
            .data(&p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_balanced_grams() {
        let (_, split) = preset("balanced").unwrap();
        let p = plan(2000.0, 80.0, split);
        assert_eq!(p.protein_g, 150.0);
        assert_eq!(p.carbs_g, 200.0);
        assert!((p.fat_g - 66.666).abs() < 0.01);
        assert!((p.protein_per_kg - 1.875).abs() < 1e-9);
    }

    #[test]
    fn test_custom_total_tolerance() {
        assert!(Split::custom(33.3, 33.3, 33.3).is_ok());
        let err = Split::custom(40.0, 40.0, 30.0).unwrap_err();
        assert!(err.to_string().contains("110.0%"));
        assert!(Split::custom(-10.0, 60.0, 50.0).is_err());
    }

    #[tokio::test]
    async fn test_card_labels() {
        let env = Env::offline_at(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        let form = Form::new().with("weight", "80").with("calories", "2500").with("goal", "keto");
        let card = MacrosCalculator.run(&form, &env).await.unwrap();
        assert_eq!(card.title.as_deref(), Some("2,500 kcal macro plan"));
        assert_eq!(card.stat_value("Fats"), Some("194 g (70%)"));
    }
}
