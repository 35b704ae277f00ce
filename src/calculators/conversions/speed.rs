use crate::core::{Calculator, Card, Env};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::format_max;
use async_trait::async_trait;
use serde::Serialize;

const KMH_PER_MPH: f64 = 1.609_344;
const FTPS_PER_MPH: f64 = 22.0 / 15.0;
const KMH_PER_KNOT: f64 = 1.852;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Speed {
    pub mph: f64,
    pub kmh: f64,
    pub meters_per_second: f64,
    pub knots: f64,
    pub feet_per_second: f64,
}

impl Speed {
    pub fn from_kmh(kmh: f64) -> Result<Self> {
        if !kmh.is_finite() || kmh < 0.0 {
            return Err(CalcError::invalid("Enter a non-negative speed to convert."));
        }
        let mph = kmh / KMH_PER_MPH;
        Ok(Self {
            mph,
            kmh,
            meters_per_second: kmh / 3.6,
            knots: kmh / KMH_PER_KNOT,
            feet_per_second: mph * FTPS_PER_MPH,
        })
    }

    pub fn from_mph(mph: f64) -> Result<Self> {
        Self::from_kmh(mph * KMH_PER_MPH)
    }
}

fn show(value: f64) -> String {
    let abs = value.abs();
    let decimals = if abs >= 200.0 {
        1
    } else if abs < 1.0 {
        3
    } else {
        2
    };
    format_max(value, decimals)
}

pub struct SpeedConverter;

#[async_trait]
impl Calculator for SpeedConverter {
    fn key(&self) -> &'static str {
        "speed-converter"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let value = form.value("value");
        let speed = match form.text_or("direction", "mph-to-kmh") {
            "kmh-to-mph" => Speed::from_kmh(value)?,
            _ => Speed::from_mph(value)?,
        };

        Card::new(format!("{} mph ↔ {} km/h", show(speed.mph), show(speed.kmh)))
            .stat("Miles per hour", show(speed.mph))
            .stat("Kilometers per hour", show(speed.kmh))
            .stat("Meters per second", show(speed.meters_per_second))
            .stat("Knots", show(speed.knots))
            .stat("Feet per second", show(speed.feet_per_second))
            .note("Uses the exact 1 mile = 1.609344 km conversion.")
            .data(&speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sixty_mph() {
        let s = Speed::from_mph(60.0).unwrap();
        assert_eq!(show(s.kmh), "96.56");
        assert!((s.feet_per_second - 88.0).abs() < 1e-9);
        assert_eq!(show(s.knots), "52.14");
    }

    #[test]
    fn test_zero_is_allowed_negative_is_not() {
        assert_eq!(Speed::from_kmh(0.0).unwrap().mph, 0.0);
        assert!(Speed::from_kmh(-1.0).is_err());
    }
}
