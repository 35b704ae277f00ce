use super::bmr::Sex;
use super::measure::{positive, Units, LB_PER_KG};
use crate::core::{Calculator, Card, Env};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use async_trait::async_trait;
use serde::Serialize;

/// US Navy circumference method, everything in inches.
pub fn navy_body_fat(sex: Sex, height: f64, neck: f64, waist: f64, hip: f64) -> Result<f64> {
    let percent = match sex {
        Sex::Male => {
            let span = waist - neck;
            if span <= 0.0 {
                return Err(CalcError::invalid("Waist must be larger than neck for the male formula."));
            }
            86.010 * span.log10() - 70.041 * height.log10() + 36.76
        }
        Sex::Female => {
            let span = waist + hip - neck;
            if span <= 0.0 {
                return Err(CalcError::invalid(
                    "Waist plus hip must be larger than neck for the female formula.",
                ));
            }
            163.205 * span.log10() - 97.684 * height.log10() - 78.387
        }
    };
    if !percent.is_finite() || percent <= 0.0 {
        return Err(CalcError::invalid(
            "Unable to calculate body fat with these numbers. Double-check your measurements.",
        ));
    }
    Ok(percent)
}

pub fn category(sex: Sex, percent: f64) -> &'static str {
    let bounds: [f64; 4] = match sex {
        Sex::Female => [14.0, 21.0, 25.0, 32.0],
        Sex::Male => [6.0, 14.0, 18.0, 25.0],
    };
    const NAMES: [&str; 5] = ["Essential", "Athlete", "Fitness", "Average", "Above average"];
    let idx = bounds.iter().position(|b| percent < *b).unwrap_or(4);
    NAMES[idx]
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Composition {
    pub body_fat_percent: f64,
    pub category: &'static str,
    pub fat_mass_kg: f64,
    pub lean_mass_kg: f64,
}

fn mass(units: Units, kg: f64) -> String {
    let lb = kg * LB_PER_KG;
    match units {
        Units::Imperial => format!("{:.1} lb ({:.1} kg)", lb, kg),
        Units::Metric => format!("{:.1} kg ({:.1} lb)", kg, lb),
    }
}

pub struct BodyFatEstimator;

#[async_trait]
impl Calculator for BodyFatEstimator {
    fn key(&self) -> &'static str {
        "body-fat-estimator"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let units = Units::parse(form.text_or("units", "metric"));
        let sex = Sex::parse(form.text_or("sex", "male"));
        let weight = positive(form.value("weight"), "Enter a body weight above zero.")?;
        let height = positive(form.value("height"), "Enter a height above zero.")?;
        let neck = positive(form.value("neck"), "Enter a neck measurement above zero.")?;
        let waist = positive(form.value("waist"), "Enter a waist measurement above zero.")?;
        let hip = match sex {
            Sex::Female => positive(
                form.value("hip"),
                "Enter a hip measurement above zero for the female formula.",
            )?,
            Sex::Male => 0.0,
        };

        let percent = navy_body_fat(
            sex,
            units.to_inches(height),
            units.to_inches(neck),
            units.to_inches(waist),
            units.to_inches(hip),
        )?;
        let weight_kg = units.to_kg(weight);
        let fat_mass_kg = weight_kg * percent / 100.0;
        let result = Composition {
            body_fat_percent: percent,
            category: category(sex, percent),
            fat_mass_kg,
            lean_mass_kg: weight_kg - fat_mass_kg,
        };

        Card::new(format!("Estimated body fat: {:.1}%", percent))
            .stat("Category", result.category)
            .stat("Lean body mass", mass(units, result.lean_mass_kg))
            .stat("Fat mass", mass(units, result.fat_mass_kg))
            .stat(
                "Tape inputs",
                match sex {
                    Sex::Female => "Waist + hip − neck",
                    Sex::Male => "Waist − neck",
                },
            )
            .note("This method provides an estimate. For a medical evaluation, use a DEXA scan or consult a qualified professional.")
            .data(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navy_male() {
        let pct = navy_body_fat(Sex::Male, 70.0, 15.0, 34.0, 0.0).unwrap();
        assert!((pct - 17.51).abs() < 0.01, "{}", pct);
        assert_eq!(category(Sex::Male, pct), "Fitness");
    }

    #[test]
    fn test_navy_female_needs_span() {
        assert!(navy_body_fat(Sex::Female, 65.0, 40.0, 20.0, 10.0).is_err());
        let pct = navy_body_fat(Sex::Female, 65.0, 13.0, 30.0, 38.0).unwrap();
        assert!((pct - 28.56).abs() < 0.01, "{}", pct);
        assert_eq!(category(Sex::Female, pct), "Average");
    }

    #[test]
    fn test_categories() {
        assert_eq!(category(Sex::Female, 13.9), "Essential");
        assert_eq!(category(Sex::Female, 32.0), "Above average");
        assert_eq!(category(Sex::Male, 24.9), "Average");
    }
}
