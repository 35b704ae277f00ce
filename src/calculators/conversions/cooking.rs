use crate::core::{Calculator, Card, Env, Table};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::format_max;
use async_trait::async_trait;
use serde::Serialize;

/// Milliliters or grams per unit; water density makes them interchangeable.
pub const UNITS: [(&str, &str, f64); 11] = [
    ("cup", "Cups (US)", 236.588_236_5),
    ("metricCup", "Metric cups", 250.0),
    ("tablespoon", "Tablespoons (Tbsp)", 14.786_764_781_25),
    ("teaspoon", "Teaspoons (tsp)", 4.928_921_593_75),
    ("fluidOunce", "Fluid ounces (fl oz)", 29.573_529_562_5),
    ("milliliter", "Milliliters (mL)", 1.0),
    ("liter", "Liters (L)", 1000.0),
    ("gram", "Grams (g)", 1.0),
    ("kilogram", "Kilograms (kg)", 1000.0),
    ("ounce", "Ounces (oz)", 28.349_523_125),
    ("pound", "Pounds (lb)", 453.592_37),
];

fn unit(id: &str) -> Option<(&'static str, &'static str, f64)> {
    UNITS.iter().copied().find(|(u, _, _)| u.eq_ignore_ascii_case(id))
}

pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let abs = value.abs();
    let decimals = if abs >= 1000.0 {
        2
    } else if abs < 1.0 {
        6
    } else {
        4
    };
    format_max(value, decimals)
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Measure {
    pub amount: f64,
    pub converted: f64,
    pub base: f64,
}

pub fn convert(amount: f64, from: &str, to: &str) -> Result<Measure> {
    if !amount.is_finite() {
        return Err(CalcError::invalid("Enter a valid quantity to convert."));
    }
    let (Some((_, _, from)), Some((_, _, to))) = (unit(from), unit(to)) else {
        return Err(CalcError::invalid("Select both a source and target unit."));
    };
    let base = amount * from;
    Ok(Measure {
        amount,
        converted: base / to,
        base,
    })
}

pub struct CookingConverter;

#[async_trait]
impl Calculator for CookingConverter {
    fn key(&self) -> &'static str {
        "cooking-measurement-converter"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let from = form.text_or("from", "cup");
        let to = form.text_or("to", "tablespoon");
        let measure = convert(form.value_or("amount", 1.0), from, to)?;
        let label = |id: &str| unit(id).map_or("", |(_, l, _)| l);

        let mut table = Table::new(&["Unit", "Amount"]);
        for (_, name, factor) in UNITS {
            table.push(&[name.to_string(), format_amount(measure.base / factor)]);
        }

        Card::new(format!(
            "{} {} = {} {}",
            format_amount(measure.amount),
            label(from),
            format_amount(measure.converted),
            label(to)
        ))
        .table(table)
        .note("Assumes water density for volume ↔ weight conversions. Adjust for specific ingredients as needed.")
        .data(&measure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cup_to_tablespoons() {
        let m = convert(1.0, "cup", "tablespoon").unwrap();
        assert!((m.converted - 16.0).abs() < 1e-9);
        assert_eq!(format_amount(m.converted), "16");
    }

    #[test]
    fn test_volume_to_weight_uses_water() {
        let m = convert(1.0, "liter", "kilogram").unwrap();
        assert!((m.converted - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_unknown_unit() {
        assert!(convert(1.0, "pinch", "cup").is_err());
    }
}
