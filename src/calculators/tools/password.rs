//! Random password generation.
//!
//! Every selected pool contributes at least one character, the rest are
//! drawn uniformly from the combined pool, then the whole string is
//! shuffled so the guaranteed characters do not sit at the front.

use crate::core::{Calculator, Card, Env};
use crate::domain::model::{Form, Tone};
use crate::utils::error::{CalcError, Result};
use async_trait::async_trait;
use rand::rngs::{OsRng, StdRng};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use serde::Serialize;

pub const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
pub const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*()-_=+[]{};:,.<>?/|~`'\"\\";
const SIMILAR: &[char] = &['O', '0', 'o', '1', 'l', 'I', '|', '\\'];

pub const MIN_LENGTH: usize = 4;
pub const MAX_LENGTH: usize = 64;
pub const DEFAULT_LENGTH: usize = 16;

pub fn clamp_length(value: f64) -> usize {
    if !value.is_finite() {
        return DEFAULT_LENGTH;
    }
    (value.round() as i64).clamp(MIN_LENGTH as i64, MAX_LENGTH as i64) as usize
}

#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub lower: bool,
    pub upper: bool,
    pub digits: bool,
    pub symbols: bool,
    pub avoid_similar: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            lower: true,
            upper: true,
            digits: true,
            symbols: true,
            avoid_similar: false,
        }
    }
}

impl Options {
    pub fn pools(&self) -> Vec<Vec<char>> {
        [
            (self.lower, LOWER),
            (self.upper, UPPER),
            (self.digits, DIGITS),
            (self.symbols, SYMBOLS),
        ]
        .into_iter()
        .filter(|(on, _)| *on)
        .map(|(_, set)| {
            set.chars()
                .filter(|c| !(self.avoid_similar && SIMILAR.contains(c)))
                .collect::<Vec<_>>()
        })
        .filter(|pool| !pool.is_empty())
        .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Generated {
    pub password: String,
    pub pool_size: usize,
    pub entropy_bits: f64,
    pub strength: &'static str,
}

pub fn strength(bits: f64) -> &'static str {
    match bits {
        b if b < 40.0 => "Weak",
        b if b < 60.0 => "Fair",
        b if b < 80.0 => "Strong",
        _ => "Very strong",
    }
}

pub fn generate<R: RngCore + ?Sized>(rng: &mut R, length: usize, options: &Options) -> Result<Generated> {
    let pools = options.pools();
    if pools.is_empty() {
        return Err(CalcError::invalid(
            "Select at least one character set before generating a password.",
        ));
    }
    if length < pools.len() {
        return Err(CalcError::invalid(
            "Increase the length or adjust options so each set can be used.",
        ));
    }

    let combined: Vec<char> = pools.iter().flatten().copied().collect();
    let mut chars: Vec<char> = pools
        .iter()
        .map(|pool| pool[rng.gen_range(0..pool.len())])
        .collect();
    while chars.len() < length {
        chars.push(combined[rng.gen_range(0..combined.len())]);
    }
    chars.shuffle(rng);

    let entropy_bits = (combined.len() as f64).log2() * length as f64;
    Ok(Generated {
        password: chars.into_iter().collect(),
        pool_size: combined.len(),
        entropy_bits,
        strength: strength(entropy_bits),
    })
}

/// The OS source when it is readable, otherwise a clock-seeded generator.
fn random_source(seed: Option<u64>) -> (Box<dyn RngCore + Send>, bool) {
    if let Some(seed) = seed {
        return (Box::new(StdRng::seed_from_u64(seed)), false);
    }
    let mut probe = [0u8; 8];
    match OsRng.try_fill_bytes(&mut probe) {
        Ok(()) => (Box::new(OsRng), false),
        Err(e) => {
            tracing::warn!("OS random source unavailable, falling back: {}", e);
            let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
            (Box::new(StdRng::seed_from_u64(nanos as u64)), true)
        }
    }
}

pub struct PasswordGenerator;

#[async_trait]
impl Calculator for PasswordGenerator {
    fn key(&self) -> &'static str {
        "password-generator"
    }

    async fn run(&self, form: &Form, env: &Env) -> Result<Card> {
        let length = clamp_length(form.value_or("length", DEFAULT_LENGTH as f64));
        let on = |field: &str| form.get(field).map_or(true, |_| form.flag(field));
        let options = Options {
            lower: on("lowercase"),
            upper: on("uppercase"),
            digits: on("numbers"),
            symbols: on("symbols"),
            avoid_similar: form.flag("avoid_similar"),
        };

        let (mut rng, weak) = random_source(env.rng_seed);
        let generated = generate(rng.as_mut(), length, &options)?;

        let mut card = Card::new("Generated password")
            .headline(generated.password.clone())
            .stat("Length", length.to_string())
            .stat("Character pool", generated.pool_size.to_string())
            .stat("Approximate entropy", format!("{:.1} bits", generated.entropy_bits))
            .stat("Strength", generated.strength);
        if weak {
            card = card
                .tone(Tone::Warning)
                .note("Secure randomness was unavailable, so this password used a fallback generator. Generate again before relying on it.");
        }
        card.data(&generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    #[test]
    fn test_length_clamp() {
        assert_eq!(clamp_length(2.0), 4);
        assert_eq!(clamp_length(100.0), 64);
        assert_eq!(clamp_length(f64::NAN), 16);
        assert_eq!(clamp_length(12.4), 12);
    }

    #[test]
    fn test_similar_characters_removed() {
        let options = Options { avoid_similar: true, ..Options::default() };
        let mut rng = StdRng::seed_from_u64(7);
        let generated = generate(&mut rng, 64, &options).unwrap();
        assert!(!generated.password.chars().any(|c| SIMILAR.contains(&c)));
        assert_eq!(generated.pool_size, 26 + 26 + 10 + 32 - SIMILAR.len());
    }

    #[test]
    fn test_same_seed_same_password() {
        let options = Options::default();
        let a = generate(&mut StdRng::seed_from_u64(9), 24, &options).unwrap();
        let b = generate(&mut StdRng::seed_from_u64(9), 24, &options).unwrap();
        let c = generate(&mut StdRng::seed_from_u64(10), 24, &options).unwrap();
        assert_eq!(a.password, b.password);
        assert_ne!(a.password, c.password);
    }

    #[test]
    fn test_guaranteed_characters_are_shuffled() {
        // Before shuffling a two-character password is always lowercase then digit.
        let options = Options { upper: false, symbols: false, ..Options::default() };
        let digit_first = (0..32u64)
            .map(|seed| generate(&mut StdRng::seed_from_u64(seed), 2, &options).unwrap().password)
            .filter(|pw| pw.starts_with(|c: char| c.is_ascii_digit()))
            .count();
        assert!(digit_first > 0);
        assert!(digit_first < 32);
    }

    #[test]
    fn test_no_pools() {
        let options = Options { lower: false, upper: false, digits: false, symbols: false, avoid_similar: false };
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate(&mut rng, 16, &options).is_err());
    }

    #[tokio::test]
    async fn test_seeded_runs_repeat() {
        let env = Env::offline_at(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()).with_seed(42);
        let form = Form::new().with("length", "20").with("symbols", "false");
        let a = PasswordGenerator.run(&form, &env).await.unwrap();
        let b = PasswordGenerator.run(&form, &env).await.unwrap();
        assert_eq!(a.headline, b.headline);
        assert_eq!(a.headline.as_ref().map(|p| p.chars().count()), Some(20));
        assert_eq!(a.stat_value("Character pool"), Some("62"));
    }

    proptest! {
        #[test]
        fn prop_every_pool_present(seed in any::<u64>(), length in 4usize..=64) {
            let mut rng = StdRng::seed_from_u64(seed);
            let generated = generate(&mut rng, length, &Options::default()).unwrap();
            let pw = &generated.password;
            prop_assert_eq!(pw.chars().count(), length);
            prop_assert!(pw.chars().any(|c| c.is_ascii_lowercase()));
            prop_assert!(pw.chars().any(|c| c.is_ascii_uppercase()));
            prop_assert!(pw.chars().any(|c| c.is_ascii_digit()));
            prop_assert!(pw.chars().any(|c| SYMBOLS.contains(c)));
        }
    }
}
