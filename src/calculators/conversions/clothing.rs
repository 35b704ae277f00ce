use crate::core::{Calculator, Card, Env, Table};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct GarmentSize {
    pub intl: &'static str,
    pub us: &'static str,
    pub uk: &'static str,
    pub eu: &'static str,
    /// Bust for women, chest for men.
    pub upper: &'static str,
    pub waist: &'static str,
}

macro_rules! size {
    ($intl:literal, $us:literal, $uk:literal, $eu:literal, $upper:literal, $waist:literal) => {
        GarmentSize { intl: $intl, us: $us, uk: $uk, eu: $eu, upper: $upper, waist: $waist }
    };
}

pub const WOMEN: [GarmentSize; 6] = [
    size!("XS", "0-2", "4-6", "32-34", "31-33 in / 79-84 cm", "24-26 in / 61-66 cm"),
    size!("S", "4-6", "8-10", "36-38", "33-35 in / 84-89 cm", "26-28 in / 66-71 cm"),
    size!("M", "8-10", "12-14", "40-42", "36-38 in / 91-97 cm", "29-31 in / 74-79 cm"),
    size!("L", "12-14", "16-18", "44-46", "39-41 in / 99-104 cm", "32-34 in / 81-86 cm"),
    size!("XL", "16-18", "20-22", "48-50", "42-44 in / 107-112 cm", "35-38 in / 89-97 cm"),
    size!("XXL", "20-22", "24-26", "52-54", "45-47 in / 114-119 cm", "39-42 in / 99-107 cm"),
];

pub const MEN: [GarmentSize; 6] = [
    size!("XS", "34", "34", "44", "34-36 in / 86-91 cm", "28-30 in / 71-76 cm"),
    size!("S", "36", "36", "46", "36-38 in / 91-97 cm", "30-32 in / 76-81 cm"),
    size!("M", "38-40", "38-40", "48-50", "38-40 in / 97-102 cm", "32-34 in / 81-86 cm"),
    size!("L", "42-44", "42-44", "52-54", "42-44 in / 107-112 cm", "36-38 in / 91-97 cm"),
    size!("XL", "46-48", "46-48", "56-58", "46-48 in / 117-122 cm", "40-42 in / 102-107 cm"),
    size!("XXL", "50-52", "50-52", "60-62", "50-52 in / 127-132 cm", "44-46 in / 112-117 cm"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Women,
    Men,
}

impl Profile {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "women" | "womens" | "w" => Some(Self::Women),
            "men" | "mens" | "m" => Some(Self::Men),
            _ => None,
        }
    }

    pub fn chart(self) -> &'static [GarmentSize] {
        match self {
            Self::Women => &WOMEN,
            Self::Men => &MEN,
        }
    }

    fn upper_label(self) -> &'static str {
        match self {
            Self::Women => "Bust",
            Self::Men => "Chest",
        }
    }
}

pub fn lookup(profile: Profile, letter: &str) -> Option<GarmentSize> {
    let letter = letter.trim();
    profile
        .chart()
        .iter()
        .copied()
        .find(|s| s.intl.eq_ignore_ascii_case(letter))
}

pub struct ClothingSizeConverter;

#[async_trait]
impl Calculator for ClothingSizeConverter {
    fn key(&self) -> &'static str {
        "clothing-size-converter"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let profile = Profile::parse(form.text_or("profile", "women"))
            .ok_or_else(|| CalcError::invalid("Choose women's or men's sizing."))?;
        let entry = lookup(profile, form.text_or("size", "M"))
            .ok_or_else(|| CalcError::invalid("Select a size to see international matches."))?;

        let title = match profile {
            Profile::Women => "Women's clothing",
            Profile::Men => "Men's clothing",
        };
        let mut table = Table::new(&["Measure", "Size"]);
        table.push(&["International", entry.intl]);
        table.push(&["US", entry.us]);
        table.push(&["UK", entry.uk]);
        table.push(&["EU", entry.eu]);
        table.push(&[profile.upper_label(), entry.upper]);
        table.push(&["Waist", entry.waist]);

        Card::new(title)
            .headline(format!("Selected International: {}", entry.intl))
            .table(table)
            .note("Sizing varies by brand. Use this chart as a starting point and confirm with retailer measurements when possible.")
            .data(&entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let m = lookup(Profile::Men, "xl").unwrap();
        assert_eq!(m.eu, "56-58");
        assert_eq!(lookup(Profile::Women, " s ").unwrap().uk, "8-10");
    }

    #[test]
    fn test_unknown_letter() {
        assert!(lookup(Profile::Women, "XXXL").is_none());
    }
}
