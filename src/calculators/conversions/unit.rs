//! Length, weight, temperature and volume conversion through a base unit
//! per category (meter, gram, celsius, milliliter).

use crate::core::{Calculator, Card, Env, Table};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::format_max;
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// `base = value * factor`
    Linear(f64),
    /// `base = (value - offset) * ratio`
    Affine { offset: f64, ratio: f64 },
}

impl Scale {
    pub fn to_base(self, value: f64) -> f64 {
        match self {
            Scale::Linear(factor) => value * factor,
            Scale::Affine { offset, ratio } => (value - offset) * ratio,
        }
    }

    pub fn from_base(self, value: f64) -> f64 {
        match self {
            Scale::Linear(factor) => value / factor,
            Scale::Affine { offset, ratio } => value / ratio + offset,
        }
    }
}

#[derive(Debug)]
pub struct Unit {
    pub id: &'static str,
    pub label: &'static str,
    pub scale: Scale,
}

#[derive(Debug)]
pub struct Category {
    pub id: &'static str,
    pub label: &'static str,
    pub units: &'static [Unit],
}

const fn linear(id: &'static str, label: &'static str, factor: f64) -> Unit {
    Unit { id, label, scale: Scale::Linear(factor) }
}

const fn affine(id: &'static str, label: &'static str, offset: f64, ratio: f64) -> Unit {
    Unit { id, label, scale: Scale::Affine { offset, ratio } }
}

pub const LENGTH: &[Unit] = &[
    linear("meter", "Meters (m)", 1.0),
    linear("kilometer", "Kilometers (km)", 1000.0),
    linear("centimeter", "Centimeters (cm)", 0.01),
    linear("millimeter", "Millimeters (mm)", 0.001),
    linear("micrometer", "Micrometers (µm)", 0.000_001),
    linear("mile", "Miles (mi)", 1609.344),
    linear("yard", "Yards (yd)", 0.9144),
    linear("foot", "Feet (ft)", 0.3048),
    linear("inch", "Inches (in)", 0.0254),
    linear("nauticalMile", "Nautical miles (NM)", 1852.0),
];

pub const WEIGHT: &[Unit] = &[
    linear("gram", "Grams (g)", 1.0),
    linear("kilogram", "Kilograms (kg)", 1000.0),
    linear("milligram", "Milligrams (mg)", 0.001),
    linear("metricTon", "Metric tons (t)", 1_000_000.0),
    linear("ounce", "Ounces (oz)", 28.349_523_125),
    linear("pound", "Pounds (lb)", 453.592_37),
    linear("stone", "Stones (st)", 6350.293_18),
];

pub const TEMPERATURE: &[Unit] = &[
    affine("celsius", "Celsius (°C)", 0.0, 1.0),
    affine("fahrenheit", "Fahrenheit (°F)", 32.0, 5.0 / 9.0),
    affine("kelvin", "Kelvin (K)", 273.15, 1.0),
    affine("rankine", "Rankine (°R)", 491.67, 5.0 / 9.0),
];

pub const VOLUME: &[Unit] = &[
    linear("milliliter", "Milliliters (mL)", 1.0),
    linear("liter", "Liters (L)", 1000.0),
    linear("teaspoon", "Teaspoons (tsp)", 4.928_921_593_75),
    linear("tablespoon", "Tablespoons (Tbsp)", 14.786_764_781_25),
    linear("fluidOunce", "Fluid ounces (fl oz)", 29.573_529_562_5),
    linear("cup", "Cups (US)", 236.588_236_5),
    linear("pint", "Pints (US)", 473.176_473),
    linear("quart", "Quarts (US)", 946.352_946),
    linear("gallon", "Gallons (US)", 3785.411_784),
    linear("cubicMeter", "Cubic meters (m³)", 1_000_000.0),
];

pub const CATEGORIES: [Category; 4] = [
    Category { id: "length", label: "Length", units: LENGTH },
    Category { id: "weight", label: "Weight", units: WEIGHT },
    Category { id: "temperature", label: "Temperature", units: TEMPERATURE },
    Category { id: "volume", label: "Volume", units: VOLUME },
];

impl Category {
    pub fn unit(&self, id: &str) -> Option<&'static Unit> {
        self.units.iter().find(|u| u.id.eq_ignore_ascii_case(id))
    }

    pub fn is_temperature(&self) -> bool {
        self.id == "temperature"
    }

    /// Display precision: temperatures keep 2-3 decimals, large values 2,
    /// sub-unit values 6, everything else 4.
    pub fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return "-".to_string();
        }
        let abs = value.abs();
        let decimals = if self.is_temperature() {
            if abs < 1.0 { 3 } else { 2 }
        } else if abs >= 10_000.0 {
            2
        } else if abs < 1.0 {
            6
        } else {
            4
        };
        format_max(value, decimals)
    }
}

pub fn category(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id.eq_ignore_ascii_case(id))
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitConversion {
    pub category: &'static str,
    pub from: &'static str,
    pub to: &'static str,
    pub amount: f64,
    pub converted: f64,
    /// Every unit of the category, in table order.
    pub all: Vec<(&'static str, f64)>,
}

pub fn convert(category: &'static Category, from: &str, to: &str, amount: f64) -> Result<UnitConversion> {
    if !amount.is_finite() {
        return Err(CalcError::invalid("Enter a valid number to convert."));
    }
    let (from, to) = match (category.unit(from), category.unit(to)) {
        (Some(f), Some(t)) => (f, t),
        _ => return Err(CalcError::invalid("Select units to convert between.")),
    };
    let base = from.scale.to_base(amount);
    Ok(UnitConversion {
        category: category.id,
        from: from.id,
        to: to.id,
        amount,
        converted: to.scale.from_base(base),
        all: category
            .units
            .iter()
            .map(|u| (u.id, u.scale.from_base(base)))
            .collect(),
    })
}

pub struct UnitConverter;

#[async_trait]
impl Calculator for UnitConverter {
    fn key(&self) -> &'static str {
        "unit-converter"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let category = category(form.text_or("category", "length"))
            .ok_or_else(|| CalcError::invalid("Select a unit category."))?;
        let default_to = category.units.get(1).map_or(category.units[0].id, |u| u.id);
        let from = form.text_or("from", category.units[0].id);
        let to = form.text_or("to", default_to);
        let result = convert(category, from, to, form.value_or("amount", 1.0))?;

        let from_label = category.unit(result.from).map_or("", |u| u.label);
        let to_label = category.unit(result.to).map_or("", |u| u.label);
        let mut table = Table::new(&["Unit", "Value"]);
        for (unit, (_, value)) in category.units.iter().zip(&result.all) {
            table.push(&[unit.label.to_string(), category.format(*value)]);
        }

        Card::new(format!(
            "{} {} = {} {}",
            category.format(result.amount),
            from_label,
            category.format(result.converted),
            to_label
        ))
        .table(table)
        .note("Values are rounded for readability but calculated using precise conversion factors.")
        .data(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    #[test]
    fn test_temperature_is_affine() {
        let temp = category("temperature").unwrap();
        let boiling = convert(temp, "celsius", "fahrenheit", 100.0).unwrap();
        assert!((boiling.converted - 212.0).abs() < 1e-9);
        let absolute = convert(temp, "kelvin", "rankine", 0.0).unwrap();
        assert!(absolute.converted.abs() < 1e-9);
        assert_eq!(temp.format(-40.0), "-40");
    }

    #[test]
    fn test_unknown_unit() {
        let length = category("length").unwrap();
        assert!(convert(length, "meter", "gram", 1.0).is_err());
        assert!(convert(length, "meter", "foot", f64::NAN).is_err());
    }

    #[test]
    fn test_precision_rules() {
        let length = category("length").unwrap();
        assert_eq!(length.format(12_345.678_9), "12,345.68");
        assert_eq!(length.format(0.123_456_78), "0.123457");
        assert_eq!(length.format(3.280_839_9), "3.2808");
    }

    #[tokio::test]
    async fn test_card_lists_every_unit() {
        let env = Env::offline_at(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        let form = Form::new().with("category", "length").with("from", "mile").with("to", "kilometer");
        let card = UnitConverter.run(&form, &env).await.unwrap();
        assert_eq!(card.title.as_deref(), Some("1 Miles (mi) = 1.6093 Kilometers (km)"));
        assert_eq!(card.tables[0].rows.len(), LENGTH.len());
    }

    proptest! {
        #[test]
        fn prop_round_trip_every_category(idx in 0usize..4, a in 0usize..10, b in 0usize..10, amount in -1.0e6f64..1.0e6) {
            let cat = &CATEGORIES[idx];
            let from = &cat.units[a % cat.units.len()];
            let to = &cat.units[b % cat.units.len()];
            let there = convert(cat, from.id, to.id, amount).unwrap().converted;
            let back = convert(cat, to.id, from.id, there).unwrap().converted;
            prop_assert!((back - amount).abs() <= 1e-6 * amount.abs().max(1.0));
        }
    }
}
