use crate::core::{Calculator, Card, Env};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::format_max;
use async_trait::async_trait;
use serde::Serialize;

/// mpg × L/100km for US gallons.
pub const MPG_L100: f64 = 235.214_583;
const KM_PER_MILE: f64 = 1.609_344;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Efficiency {
    pub mpg: f64,
    pub liters_per_100km: f64,
    pub km_per_liter: f64,
    pub miles_per_liter: f64,
    pub gallons_per_100mi: f64,
}

pub fn from_mpg(mpg: f64) -> Result<Efficiency> {
    positive(mpg)?;
    Ok(build(mpg, MPG_L100 / mpg))
}

pub fn from_l100(l100: f64) -> Result<Efficiency> {
    positive(l100)?;
    Ok(build(MPG_L100 / l100, l100))
}

fn positive(value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CalcError::invalid("Enter a positive efficiency value to convert."))
    }
}

fn build(mpg: f64, l100: f64) -> Efficiency {
    let km_per_liter = 100.0 / l100;
    Efficiency {
        mpg,
        liters_per_100km: l100,
        km_per_liter,
        miles_per_liter: km_per_liter / KM_PER_MILE,
        gallons_per_100mi: 100.0 / mpg,
    }
}

fn show(value: f64) -> String {
    let abs = value.abs();
    let decimals = if abs >= 100.0 {
        1
    } else if abs < 1.0 {
        3
    } else {
        2
    };
    format_max(value, decimals)
}

pub struct FuelEconomyConverter;

#[async_trait]
impl Calculator for FuelEconomyConverter {
    fn key(&self) -> &'static str {
        "fuel-economy-converter"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let value = form.value("value");
        let e = match form.text_or("direction", "mpg-to-l") {
            "l-to-mpg" => from_l100(value)?,
            _ => from_mpg(value)?,
        };

        Card::new(format!("{} mpg ↔ {} L/100 km", show(e.mpg), show(e.liters_per_100km)))
            .stat("US miles per gallon", show(e.mpg))
            .stat("Liters per 100 km", show(e.liters_per_100km))
            .stat("Kilometers per liter", show(e.km_per_liter))
            .stat("Miles per liter", show(e.miles_per_liter))
            .stat("Gallons per 100 miles", show(e.gallons_per_100mi))
            .note("Uses the standard 235.2146 constant for converting US MPG to metric efficiency.")
            .data(&e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_30_mpg() {
        let e = from_mpg(30.0).unwrap();
        assert_eq!(show(e.liters_per_100km), "7.84");
        assert_eq!(show(e.gallons_per_100mi), "3.33");
    }

    #[test]
    fn test_directions_agree() {
        let a = from_mpg(42.0).unwrap();
        let b = from_l100(a.liters_per_100km).unwrap();
        assert!((b.mpg - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_rejected() {
        assert!(from_mpg(0.0).is_err());
        assert!(from_l100(-3.0).is_err());
    }
}
