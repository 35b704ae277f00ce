use crate::core::{Calculator, Card, Env, Table};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::{format_fixed, format_max};
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShoeSize {
    pub us: f64,
    pub uk: f64,
    pub eu: f64,
    pub cm: f64,
}

const fn row(us: f64, uk: f64, eu: f64, cm: f64) -> ShoeSize {
    ShoeSize { us, uk, eu, cm }
}

pub const WOMEN: [ShoeSize; 13] = [
    row(5.0, 3.0, 35.5, 21.6),
    row(5.5, 3.5, 36.0, 22.2),
    row(6.0, 4.0, 36.5, 22.5),
    row(6.5, 4.5, 37.0, 23.0),
    row(7.0, 5.0, 37.5, 23.5),
    row(7.5, 5.5, 38.0, 24.0),
    row(8.0, 6.0, 38.5, 24.5),
    row(8.5, 6.5, 39.0, 24.9),
    row(9.0, 7.0, 40.0, 25.4),
    row(9.5, 7.5, 40.5, 25.7),
    row(10.0, 8.0, 41.0, 26.0),
    row(10.5, 8.5, 41.5, 26.4),
    row(11.0, 9.0, 42.0, 26.8),
];

pub const MEN: [ShoeSize; 14] = [
    row(6.0, 5.5, 38.5, 24.1),
    row(6.5, 6.0, 39.0, 24.5),
    row(7.0, 6.5, 40.0, 24.9),
    row(7.5, 7.0, 40.5, 25.4),
    row(8.0, 7.5, 41.0, 25.8),
    row(8.5, 8.0, 42.0, 26.2),
    row(9.0, 8.5, 42.5, 26.7),
    row(9.5, 9.0, 43.0, 27.1),
    row(10.0, 9.5, 44.0, 27.5),
    row(10.5, 10.0, 44.5, 27.9),
    row(11.0, 10.5, 45.0, 28.3),
    row(11.5, 11.0, 45.5, 28.7),
    row(12.0, 11.5, 46.0, 29.1),
    row(13.0, 12.5, 47.5, 30.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum System {
    Us,
    Uk,
    Eu,
    Cm,
}

impl System {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "us" => Some(Self::Us),
            "uk" => Some(Self::Uk),
            "eu" => Some(Self::Eu),
            "cm" => Some(Self::Cm),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Us => "US",
            Self::Uk => "UK",
            Self::Eu => "EU",
            Self::Cm => "CM",
        }
    }

    fn pick(self, size: &ShoeSize) -> f64 {
        match self {
            Self::Us => size.us,
            Self::Uk => size.uk,
            Self::Eu => size.eu,
            Self::Cm => size.cm,
        }
    }
}

pub fn chart(profile: &str) -> Option<(&'static str, &'static [ShoeSize])> {
    match profile.trim().to_ascii_lowercase().as_str() {
        "women" | "womens" | "w" => Some(("Women's shoes", &WOMEN)),
        "men" | "mens" | "m" => Some(("Men's shoes", &MEN)),
        _ => None,
    }
}

/// Row whose `system` value is closest to `value`; ties keep the smaller size.
pub fn nearest(rows: &[ShoeSize], system: System, value: f64) -> Option<ShoeSize> {
    if !value.is_finite() {
        return None;
    }
    rows.iter()
        .copied()
        .min_by(|a, b| {
            let da = (system.pick(a) - value).abs();
            let db = (system.pick(b) - value).abs();
            da.total_cmp(&db)
        })
}

pub struct ShoeSizeConverter;

#[async_trait]
impl Calculator for ShoeSizeConverter {
    fn key(&self) -> &'static str {
        "shoe-size-converter"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let (label, rows) = chart(form.text_or("profile", "women"))
            .ok_or_else(|| CalcError::invalid("Choose women's or men's sizing."))?;
        let system = System::parse(form.text_or("source", "us"))
            .ok_or_else(|| CalcError::invalid("Choose a sizing system: US, UK, EU or CM."))?;
        let entry = nearest(rows, system, form.value("size"))
            .ok_or_else(|| CalcError::invalid("Select a size to see conversions."))?;

        let mut table = Table::new(&["System", "Size"]);
        for (system, value) in [("US", entry.us), ("UK", entry.uk), ("EU", entry.eu)] {
            table.push(&[system.to_string(), format_max(value, 1)]);
        }
        table.push(&[
            "Foot length".to_string(),
            format!("{} cm / {} in", format_fixed(entry.cm, 1), format_fixed(entry.cm / 2.54, 1)),
        ]);

        Card::new(label)
            .headline(format!("Selected {}: {}", system.label(), format_max(system.pick(&entry), 1)))
            .table(table)
            .note("Numbers reflect common conversion charts. Brands may vary slightly.")
            .data(&entry)
    }
}
