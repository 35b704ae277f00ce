use crate::core::{Calculator, Card, Env, Table};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::plural;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

const DAYS_PER_YEAR: f64 = 365.2425;
pub const MILESTONES: [f64; 8] = [0.5, 1.0, 2.0, 3.0, 5.0, 8.0, 12.0, 16.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Dog,
    Cat,
}

impl Species {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dog" => Some(Self::Dog),
            "cat" => Some(Self::Cat),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Dog => "Dog",
            Self::Cat => "Cat",
        }
    }

    /// 15 for the first year, 9 for the second, then 5 (dog) or 4 (cat).
    pub fn human_equivalent(self, age: f64) -> f64 {
        let later = match self {
            Self::Dog => 5.0,
            Self::Cat => 4.0,
        };
        if age <= 0.0 {
            0.0
        } else if age <= 1.0 {
            age * 15.0
        } else if age <= 2.0 {
            15.0 + (age - 1.0) * 9.0
        } else {
            24.0 + (age - 2.0) * later
        }
    }

    pub fn life_stage(self, age: f64) -> &'static str {
        if age < 1.0 {
            match self {
                Self::Cat => "Kitten",
                Self::Dog => "Puppy",
            }
        } else if age < 3.0 {
            "Young adult"
        } else if age < 7.0 {
            "Prime adult"
        } else if age < 11.0 {
            "Mature adult"
        } else {
            "Senior"
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BirthMonth {
    pub label: String,
    pub years: f64,
    pub total_months: u32,
}

/// `YYYY-MM`, measured from the first of that month. Future months are rejected.
pub fn birth_month(value: &str, today: NaiveDate) -> Option<BirthMonth> {
    let (year, month) = value.trim().split_once('-')?;
    let born = NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)?;
    if born > today {
        return None;
    }
    let months = (today.year() - born.year()) * 12 + today.month() as i32 - born.month() as i32;
    Some(BirthMonth {
        label: born.format("%B %Y").to_string(),
        years: (today - born).num_days() as f64 / DAYS_PER_YEAR,
        total_months: months.max(0) as u32,
    })
}

pub fn describe_months(total: u32) -> String {
    if total == 0 {
        return "less than a month".to_string();
    }
    let (years, months) = (total / 12, total % 12);
    let mut parts = Vec::new();
    if years > 0 {
        parts.push(format!("{} year{}", years, plural(years.into())));
    }
    if months > 0 {
        parts.push(format!("{} month{}", months, plural(months.into())));
    }
    parts.join(" ")
}

fn years(value: f64) -> String {
    let s = format!("{:.1}", value);
    s.strip_suffix(".0").map(str::to_string).unwrap_or(s)
}

#[derive(Debug, Clone, Serialize)]
pub struct PetAge {
    pub species: Species,
    pub age: f64,
    pub human_years: f64,
    pub life_stage: &'static str,
    pub birth: Option<BirthMonth>,
}

pub struct PetAgeConverter;

#[async_trait]
impl Calculator for PetAgeConverter {
    fn key(&self) -> &'static str {
        "pet-age-converter"
    }

    async fn run(&self, form: &Form, env: &Env) -> Result<Card> {
        let species = Species::parse(form.text_or("species", "dog"))
            .ok_or_else(|| CalcError::invalid("Choose a dog or a cat."))?;

        let birth = match form.get("birth_month") {
            Some(value) => Some(birth_month(value, env.today).ok_or_else(|| {
                CalcError::invalid("Choose a birth month that is not in the future.")
            })?),
            None => None,
        };
        let age = match (form.get("years"), &birth) {
            (Some(_), _) => form.value("years"),
            (None, Some(b)) => b.years,
            (None, None) => f64::NAN,
        };
        if !age.is_finite() || age < 0.0 {
            return Err(CalcError::invalid(
                "Enter a non-negative number of human years to see the conversion.",
            ));
        }

        let result = PetAge {
            species,
            age,
            human_years: species.human_equivalent(age),
            life_stage: species.life_stage(age),
            birth,
        };
        let noun = species.label().to_lowercase();

        let mut card = Card::new("Conversion result")
            .stat("Species", species.label())
            .stat("Human years lived", years(age))
            .stat(format!("Equivalent {} years", noun), years(result.human_years))
            .stat("Life stage estimate", result.life_stage);
        if let Some(b) = &result.birth {
            let synced = (age - b.years).abs() <= 0.05;
            card = card.stat(
                "Birth month",
                format!(
                    "{} • {} ago{}",
                    b.label,
                    describe_months(b.total_months),
                    if synced { "" } else { " (adjusted after auto-fill)" }
                ),
            );
        }

        let mut table = Table::new(&["Human years", format!("{} years", species.label()).as_str()])
            .captioned(format!("{} reference", species.label()));
        for milestone in MILESTONES {
            table.push(&[years(milestone), years(species.human_equivalent(milestone))]);
        }

        card.table(table)
            .note("Always factor in breed size, health, and vet guidance for more precise care recommendations.")
            .data(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_curves() {
        assert_eq!(Species::Dog.human_equivalent(0.5), 7.5);
        assert_eq!(Species::Dog.human_equivalent(2.0), 24.0);
        assert_eq!(Species::Dog.human_equivalent(5.0), 39.0);
        assert_eq!(Species::Cat.human_equivalent(5.0), 36.0);
        assert_eq!(Species::Cat.life_stage(0.5), "Kitten");
        assert_eq!(Species::Dog.life_stage(12.0), "Senior");
    }

    #[test]
    fn test_birth_month() {
        let today = ymd(2024, 6, 15);
        let b = birth_month("2021-03", today).unwrap();
        assert_eq!(b.total_months, 39);
        assert_eq!(b.label, "March 2021");
        assert_eq!(describe_months(b.total_months), "3 years 3 months");
        assert!(birth_month("2024-07", today).is_none());
        assert!(birth_month("2024-13", today).is_none());
    }

    #[tokio::test]
    async fn test_birth_month_fills_age() {
        let env = Env::offline_at(ymd(2024, 6, 15));
        let form = Form::new().with("species", "cat").with("birth_month", "2022-06");
        let card = PetAgeConverter.run(&form, &env).await.unwrap();
        assert_eq!(card.stat_value("Human years lived"), Some("2"));
        assert_eq!(card.stat_value("Life stage estimate"), Some("Young adult"));
        assert_eq!(card.tables[0].rows.len(), MILESTONES.len());
    }
}
