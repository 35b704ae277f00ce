use super::measure::{positive, Units};
use crate::core::{Calculator, Card, Env};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use async_trait::async_trait;
use serde::Serialize;

const ML_PER_KG: f64 = 0.033;
const LITERS_PER_30_MIN: f64 = 0.35;
const OZ_PER_LITER: f64 = 33.814_022_6;

/// Unknown climates fall back to temperate.
pub fn climate_factor(climate: &str) -> f64 {
    match climate.trim().to_ascii_lowercase().as_str() {
        "warm" => 1.1,
        "hot" => 1.2,
        _ => 1.0,
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Hydration {
    pub base_liters: f64,
    pub exercise_liters: f64,
    pub climate_liters: f64,
    pub multiplier: f64,
    pub total_liters: f64,
    pub ounces: f64,
    pub cups: f64,
}

pub fn intake(weight_kg: f64, active_minutes: f64, multiplier: f64) -> Hydration {
    let base_liters = weight_kg * ML_PER_KG;
    let exercise_liters = active_minutes / 30.0 * LITERS_PER_30_MIN;
    let total_liters = (base_liters + exercise_liters) * multiplier;
    let ounces = total_liters * OZ_PER_LITER;
    Hydration {
        base_liters,
        exercise_liters,
        climate_liters: (total_liters - base_liters - exercise_liters).max(0.0),
        multiplier,
        total_liters,
        ounces,
        cups: ounces / 8.0,
    }
}

pub struct WaterIntakeCalculator;

#[async_trait]
impl Calculator for WaterIntakeCalculator {
    fn key(&self) -> &'static str {
        "water-intake-calculator"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let units = Units::parse(form.text_or("units", "metric"));
        let weight = positive(form.value("weight"), "Enter a body weight above zero.")?;
        let minutes = form.value_or("activity", 0.0);
        if !minutes.is_finite() || minutes < 0.0 {
            return Err(CalcError::invalid("Enter daily active minutes as zero or more."));
        }
        let h = intake(units.to_kg(weight), minutes, climate_factor(form.text_or("climate", "temperate")));
        let liters = |v: f64| format!("{:.2} L", v);

        Card::new(format!("Suggested hydration: {}", liters(h.total_liters)))
            .stat_hint("Base need", liters(h.base_liters), "≈33 ml × body weight (kg)")
            .stat_hint("Exercise boost", liters(h.exercise_liters), format!("{:.0} min active", minutes))
            .stat_hint("Climate adjustment", liters(h.climate_liters), format!("{:.2}× multiplier", h.multiplier))
            .stat_hint(
                "Daily target",
                liters(h.total_liters),
                format!("≈{:.0} oz · {:.1} cups", h.ounces, h.cups),
            )
            .note("Sip steadily throughout the day and adjust upward on especially hard training days. Check with your doctor if you have fluid restrictions.")
            .data(&h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hot_day_with_exercise() {
        let h = intake(70.0, 60.0, climate_factor("hot"));
        assert!((h.base_liters - 2.31).abs() < 1e-9);
        assert!((h.exercise_liters - 0.7).abs() < 1e-9);
        assert_eq!(format!("{:.2}", h.total_liters), "3.61");
        assert_eq!(format!("{:.1}", h.cups), "15.3");
    }

    #[test]
    fn test_temperate_has_no_bonus() {
        let h = intake(80.0, 0.0, climate_factor("arctic"));
        assert_eq!(h.climate_liters, 0.0);
    }
}
