use crate::core::{Calculator, Card, Env};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::plural;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Upper,
    Lower,
    Title,
}

impl Case {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upper" => Some(Self::Upper),
            "lower" => Some(Self::Lower),
            "title" => Some(Self::Title),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Upper => "Uppercase",
            Self::Lower => "Lowercase",
            Self::Title => "Title Case",
        }
    }

    pub fn apply(self, text: &str) -> String {
        match self {
            Self::Upper => text.to_uppercase(),
            Self::Lower => text.to_lowercase(),
            Self::Title => title_case(text),
        }
    }
}

/// Capitalises the first letter or digit of every word. Apostrophes do not
/// start a new word, so "don't" stays "Don't".
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut capitalize = true;
    for ch in text.to_lowercase().chars() {
        if ch.is_alphanumeric() {
            if capitalize {
                out.extend(ch.to_uppercase());
                capitalize = false;
            } else {
                out.push(ch);
            }
        } else {
            out.push(ch);
            capitalize = !matches!(ch, '\'' | '\u{2019}');
        }
    }
    out
}

pub struct TextCaseConverter;

#[async_trait]
impl Calculator for TextCaseConverter {
    fn key(&self) -> &'static str {
        "text-case-converter"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let text = form
            .raw("text")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CalcError::invalid("Enter or paste some text to convert."))?;
        let case = Case::parse(form.text_or("mode", "upper"))
            .ok_or_else(|| CalcError::invalid("Choose upper, lower or title case."))?;
        let converted = case.apply(text);
        let count = converted.chars().count();

        Card::new(case.label())
            .headline(converted.clone())
            .note(format!("{} character{}.", count, plural(count as i64)))
            .data(&serde_json::json!({ "mode": case.label(), "text": converted }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_keeps_apostrophes() {
        assert_eq!(title_case("don't STOP me now"), "Don't Stop Me Now");
        assert_eq!(title_case("rock’n’roll"), "Rock’n’roll");
        assert_eq!(title_case("hello-world 2nd"), "Hello-World 2nd");
    }

    #[test]
    fn test_modes() {
        assert_eq!(Case::Upper.apply("Straße"), "STRASSE");
        assert_eq!(Case::Lower.apply("ÀB"), "àb");
        assert!(Case::parse("sponge").is_none());
    }
}
