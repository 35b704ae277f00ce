use super::measure::{positive, Units, LB_PER_KG};
use crate::core::{Calculator, Card, Env};
use crate::domain::model::Form;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Serialize;

pub const HEALTHY_MIN: f64 = 18.5;
pub const HEALTHY_MAX: f64 = 24.9;

pub fn classify(bmi: f64) -> &'static str {
    match bmi {
        b if b < 18.5 => "Underweight",
        b if b < 25.0 => "Healthy weight",
        b if b < 30.0 => "Overweight",
        b if b < 35.0 => "Obesity class I",
        b if b < 40.0 => "Obesity class II",
        _ => "Obesity class III",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "direction", content = "kg", rename_all = "lowercase")]
pub enum Adjustment {
    Gain(f64),
    Lose(f64),
    None,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BmiResult {
    pub bmi: f64,
    pub category: &'static str,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub healthy_min_kg: f64,
    pub healthy_max_kg: f64,
    pub adjustment: Adjustment,
}

pub fn bmi(height_cm: f64, weight_kg: f64) -> Result<BmiResult> {
    let height_cm = positive(height_cm, "Enter a height greater than zero.")?;
    let weight_kg = positive(weight_kg, "Enter a weight greater than zero.")?;
    let meters_sq = (height_cm / 100.0).powi(2);
    let bmi = weight_kg / meters_sq;
    let healthy_min_kg = HEALTHY_MIN * meters_sq;
    let healthy_max_kg = HEALTHY_MAX * meters_sq;
    let adjustment = if bmi < HEALTHY_MIN {
        Adjustment::Gain((healthy_min_kg - weight_kg).max(0.0))
    } else if bmi > HEALTHY_MAX {
        Adjustment::Lose((weight_kg - healthy_max_kg).max(0.0))
    } else {
        Adjustment::None
    };
    Ok(BmiResult {
        bmi,
        category: classify(bmi),
        height_cm,
        weight_kg,
        healthy_min_kg,
        healthy_max_kg,
        adjustment,
    })
}

fn range(units: Units, min_kg: f64, max_kg: f64) -> String {
    match units {
        Units::Metric => format!("{:.1} – {:.1} kg", min_kg, max_kg),
        Units::Imperial => format!("{:.1} – {:.1} lb", min_kg * LB_PER_KG, max_kg * LB_PER_KG),
    }
}

pub struct BmiCalculator;

#[async_trait]
impl Calculator for BmiCalculator {
    fn key(&self) -> &'static str {
        "bmi-calculator"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let units = Units::parse(form.text_or("units", "metric"));
        let result = bmi(
            units.to_cm(form.value("height")),
            units.to_kg(form.value("weight")),
        )?;

        let other = match units {
            Units::Metric => Units::Imperial,
            Units::Imperial => Units::Metric,
        };
        let height = match units {
            Units::Metric => format!("{:.1} cm", result.height_cm),
            Units::Imperial => format!("{:.1} in", result.height_cm / 2.54),
        };
        let guide = match result.adjustment {
            Adjustment::Gain(kg) => format!("Gain about {} to reach a BMI of 18.5.", units.weight(kg)),
            Adjustment::Lose(kg) => format!("Lose about {} to reach a BMI of 24.9.", units.weight(kg)),
            Adjustment::None => "Already in the healthy BMI range".to_string(),
        };

        Card::new(format!("BMI: {:.1}", result.bmi))
            .stat("Category", result.category)
            .stat_hint(
                "Healthy weight range",
                range(units, result.healthy_min_kg, result.healthy_max_kg),
                range(other, result.healthy_min_kg, result.healthy_max_kg),
            )
            .stat("Entered height", height)
            .stat("Adjustment guide", guide)
            .note("BMI is a screening tool and can read high for athletes with more muscle mass. Check in with a clinician for a full assessment.")
            .data(&result)
    }
}
