use crate::utils::error::{CalcError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Submitted form fields, keyed by input name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Form {
    fields: BTreeMap<String, String>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl ToString) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: &str, value: impl ToString) {
        self.fields.insert(field.to_string(), value.to_string());
    }

    /// Parses `key=value` pairs as passed on the command line.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut form = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair.split_once('=').ok_or_else(|| CalcError::ConfigError {
                message: format!("Expected key=value, got '{}'", pair),
            })?;
            form.insert(key.trim(), value);
        }
        Ok(form)
    }

    /// Fills in fields the form does not already carry.
    pub fn merge_defaults(&mut self, defaults: &HashMap<String, String>) {
        for (key, value) in defaults {
            self.fields
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Trimmed value, `None` when absent or blank.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Untrimmed value for free text such as the word counter input.
    pub fn raw(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Lenient numeric read: `NaN` when missing or unparsable. Calculators
    /// guard with their own messages.
    pub fn value(&self, field: &str) -> f64 {
        self.get(field)
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(f64::NAN)
    }

    /// Like [`Form::value`] but blank fields fall back to `default`.
    pub fn value_or(&self, field: &str, default: f64) -> f64 {
        match self.get(field) {
            None => default,
            Some(v) => v.parse::<f64>().unwrap_or(f64::NAN),
        }
    }

    pub fn number(&self, field: &str) -> Result<f64> {
        let raw = self.get(field).ok_or_else(|| CalcError::MissingField {
            field: field.to_string(),
        })?;
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| CalcError::invalid(format!("'{}' is not a valid number for {}.", raw, field)))
    }

    /// Strips currency symbols and separators, blank is zero.
    pub fn money(&self, field: &str) -> f64 {
        let Some(raw) = self.get(field) else {
            return 0.0;
        };
        let cleaned: String = raw
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect();
        cleaned.parse::<f64>().unwrap_or(0.0)
    }

    pub fn text(&self, field: &str) -> Result<&str> {
        self.get(field).ok_or_else(|| CalcError::MissingField {
            field: field.to_string(),
        })
    }

    pub fn text_or<'a>(&'a self, field: &str, default: &'a str) -> &'a str {
        self.get(field).unwrap_or(default)
    }

    pub fn flag(&self, field: &str) -> bool {
        matches!(
            self.get(field).map(|v| v.to_ascii_lowercase()).as_deref(),
            Some("1" | "true" | "yes" | "on")
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: ToString>(headers: &[S]) -> Self {
        Self {
            caption: None,
            headers: headers.iter().map(ToString::to_string).collect(),
            rows: Vec::new(),
        }
    }

    pub fn captioned(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn push<S: ToString>(&mut self, row: &[S]) {
        self.rows.push(row.iter().map(ToString::to_string).collect());
    }
}

/// A downloadable file produced by a calculator (QR image, exported document).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    pub mime: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// The rendered result panel of one calculator run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Card {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub tone: Tone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    pub stats: Vec<Stat>,
    pub tables: Vec<Table>,
    pub notes: Vec<String>,
    pub attachments: Vec<Attachment>,
    /// Machine-readable copy of the computed values.
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
}

impl Card {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn untitled() -> Self {
        Self::default()
    }

    /// Message card used for rejected input.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            tone: Tone::Error,
            headline: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn headline(mut self, text: impl Into<String>) -> Self {
        self.headline = Some(text.into());
        self
    }

    pub fn stat(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.stats.push(Stat {
            label: label.into(),
            value: value.into(),
            hint: None,
        });
        self
    }

    pub fn stat_hint(
        mut self,
        label: impl Into<String>,
        value: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        self.stats.push(Stat {
            label: label.into(),
            value: value.into(),
            hint: Some(hint.into()),
        });
        self
    }

    pub fn table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    pub fn note(mut self, text: impl Into<String>) -> Self {
        self.notes.push(text.into());
        self
    }

    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn data<T: Serialize>(mut self, value: &T) -> Result<Self> {
        self.data = serde_json::to_value(value)?;
        Ok(self)
    }

    pub fn stat_value(&self, label: &str) -> Option<&str> {
        self.stats
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.value.as_str())
    }
}

/// Where a rate table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateOrigin {
    Live,
    Offline,
}

/// Exchange rates quoted against `base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub base: String,
    pub rates: HashMap<String, f64>,
    pub origin: RateOrigin,
    pub updated: Option<String>,
}

impl RateTable {
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied().filter(|r| r.is_finite() && *r > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrRequest {
    pub data: String,
    pub size: u32,
    pub margin: u32,
    pub ecc: char,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_value_is_lenient() {
        let form = Form::new().with("amount", " 2500 ").with("rate", "abc");
        assert_eq!(form.value("amount"), 2500.0);
        assert!(form.value("rate").is_nan());
        assert!(form.value("missing").is_nan());
        assert_eq!(form.value_or("missing", 1.5), 1.5);
    }

    #[test]
    fn test_form_strict_number() {
        let form = Form::new().with("amount", "x");
        assert!(matches!(
            form.number("other"),
            Err(CalcError::MissingField { .. })
        ));
        assert!(matches!(
            form.number("amount"),
            Err(CalcError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_form_money_strips_symbols() {
        let form = Form::new().with("venue", "$1,250.50");
        assert_eq!(form.money("venue"), 1250.5);
        assert_eq!(form.money("missing"), 0.0);
    }

    #[test]
    fn test_from_pairs_and_defaults() {
        let mut form = Form::from_pairs(["bill=80", "people = 2"]).unwrap();
        let mut defaults = HashMap::new();
        defaults.insert("bill".to_string(), "10".to_string());
        defaults.insert("tip".to_string(), "18".to_string());
        form.merge_defaults(&defaults);
        assert_eq!(form.get("bill"), Some("80"));
        assert_eq!(form.get("people"), Some("2"));
        assert_eq!(form.get("tip"), Some("18"));
        assert!(Form::from_pairs(["novalue"]).is_err());
    }
}
