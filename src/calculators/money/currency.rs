use crate::core::{Calculator, Card, Env, Tone};
use crate::domain::model::{Form, RateOrigin, RateTable};
use crate::utils::error::{CalcError, Result};
use crate::utils::format::format_fixed;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;

pub const DEFAULT_RATE_ENDPOINT: &str = "https://open.er-api.com/v6/latest/USD";

/// (code, name, bundled USD rate)
pub const CURRENCIES: [(&str, &str, f64); 30] = [
    ("USD", "US Dollar", 1.0),
    ("EUR", "Euro", 0.92),
    ("GBP", "British Pound", 0.79),
    ("CAD", "Canadian Dollar", 1.36),
    ("AUD", "Australian Dollar", 1.53),
    ("NZD", "New Zealand Dollar", 1.66),
    ("JPY", "Japanese Yen", 150.25),
    ("CNY", "Chinese Yuan", 7.18),
    ("INR", "Indian Rupee", 83.2),
    ("CHF", "Swiss Franc", 0.87),
    ("SEK", "Swedish Krona", 10.5),
    ("NOK", "Norwegian Krone", 10.8),
    ("MXN", "Mexican Peso", 17.1),
    ("BRL", "Brazilian Real", 5.15),
    ("ZAR", "South African Rand", 18.2),
    ("SGD", "Singapore Dollar", 1.35),
    ("HKD", "Hong Kong Dollar", 7.82),
    ("KRW", "South Korean Won", 1340.0),
    ("PLN", "Polish Złoty", 3.99),
    ("DKK", "Danish Krone", 6.85),
    ("TRY", "Turkish Lira", 30.5),
    ("AED", "UAE Dirham", 3.67),
    ("SAR", "Saudi Riyal", 3.75),
    ("ILS", "Israeli Shekel", 3.72),
    ("MYR", "Malaysian Ringgit", 4.72),
    ("IDR", "Indonesian Rupiah", 15500.0),
    ("PHP", "Philippine Peso", 55.7),
    ("THB", "Thai Baht", 34.5),
    ("ARS", "Argentine Peso", 825.0),
    ("CLP", "Chilean Peso", 870.0),
];

pub fn fallback_table() -> RateTable {
    let rates: HashMap<String, f64> = CURRENCIES
        .iter()
        .map(|(code, _, rate)| (code.to_string(), *rate))
        .collect();
    RateTable {
        base: "USD".to_string(),
        rates,
        origin: RateOrigin::Offline,
        updated: None,
    }
}

pub fn currency_name(code: &str) -> Option<&'static str> {
    CURRENCIES.iter().find(|(c, _, _)| *c == code).map(|(_, n, _)| *n)
}

/// en-US currency display: symbol where Intl would show one, code otherwise.
pub fn format_money(value: f64, code: &str) -> String {
    let (prefix, decimals) = match code {
        "USD" => ("$", 2),
        "EUR" => ("€", 2),
        "GBP" => ("£", 2),
        "JPY" => ("¥", 0),
        "KRW" => ("₩", 0),
        "INR" => ("₹", 2),
        "CNY" => ("CN¥", 2),
        "CAD" => ("CA$", 2),
        "AUD" => ("A$", 2),
        "NZD" => ("NZ$", 2),
        "MXN" => ("MX$", 2),
        "BRL" => ("R$", 2),
        "HKD" => ("HK$", 2),
        "ILS" => ("₪", 2),
        "PHP" => ("₱", 2),
        "CLP" => ("CLP ", 0),
        _ => ("", 2),
    };
    let body = format_fixed(value.abs(), decimals);
    let sign = if value < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    if prefix.is_empty() {
        format!("{}{} {}", sign, code, body)
    } else {
        format!("{}{}{}", sign, prefix, body)
    }
}

/// `amount / from * to`, `None` when either rate is missing.
pub fn convert(table: &RateTable, amount: f64, from: &str, to: &str) -> Option<f64> {
    let from_rate = table.rate(from)?;
    let to_rate = table.rate(to)?;
    Some(amount / from_rate * to_rate)
}

#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    pub amount: f64,
    pub from: String,
    pub to: String,
    pub converted: f64,
    pub rate: f64,
    pub inverse: f64,
    pub origin: RateOrigin,
}

pub fn quote(table: &RateTable, amount: f64, from: &str, to: &str) -> Result<Conversion> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(CalcError::invalid("Enter an amount of zero or more to convert."));
    }
    let missing = || CalcError::invalid("We don't have rates for that pair right now.");
    let converted = convert(table, amount, from, to).ok_or_else(missing)?;
    let rate = convert(table, 1.0, from, to).ok_or_else(missing)?;
    let inverse = convert(table, 1.0, to, from).ok_or_else(missing)?;
    Ok(Conversion {
        amount,
        from: from.to_string(),
        to: to.to_string(),
        converted,
        rate,
        inverse,
        origin: table.origin,
    })
}

pub struct CurrencyConverter;

#[async_trait]
impl Calculator for CurrencyConverter {
    fn key(&self) -> &'static str {
        "currency-converter"
    }

    async fn run(&self, form: &Form, env: &Env) -> Result<Card> {
        let amount = form.value_or("amount", 0.0);
        let from = form.text_or("from", "USD").to_ascii_uppercase();
        let to = form.text_or("to", "EUR").to_ascii_uppercase();

        let table = env.rates.latest().await?;
        let result = quote(&table, amount, &from, &to)?;

        let freshness = match (result.origin, table.updated.as_deref()) {
            (RateOrigin::Live, Some(updated)) => format!("updated {}", updated),
            (RateOrigin::Live, None) => "updated recently".to_string(),
            (RateOrigin::Offline, _) => {
                "using fallback rates (check back online for live data)".to_string()
            }
        };

        let mut card = Card::untitled()
            .headline(format!(
                "{} = {}",
                format_money(result.amount, &from),
                format_money(result.converted, &to)
            ))
            .stat("Converted", format_money(result.converted, &to))
            .stat(format!("1 {}", from), format_money(result.rate, &to))
            .stat(format!("1 {}", to), format_money(result.inverse, &from))
            .note(format!(
                "1 {} = {} · Rates {}",
                from,
                format_money(result.rate, &to),
                freshness
            ));
        if result.origin == RateOrigin::Offline {
            card = card
                .tone(Tone::Warning)
                .note("Using cached sample rates. Connect to the internet for fresh data.");
        }
        card.data(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_fallback_cross_rate() {
        let table = fallback_table();
        let eur_to_gbp = convert(&table, 100.0, "EUR", "GBP").unwrap();
        assert!((eur_to_gbp - 100.0 / 0.92 * 0.79).abs() < 1e-9);
        assert!(convert(&table, 1.0, "USD", "XYZ").is_none());
    }

    #[test]
    fn test_quote_rejects_negative() {
        let err = quote(&fallback_table(), -1.0, "USD", "EUR").unwrap_err();
        assert_eq!(err.to_string(), "Enter an amount of zero or more to convert.");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(1234.5, "USD"), "$1,234.50");
        assert_eq!(format_money(150.25, "JPY"), "¥150");
        assert_eq!(format_money(10.5, "SEK"), "SEK 10.50");
    }

    #[tokio::test]
    async fn test_offline_card_warns() {
        let env = Env::offline_at(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let form = Form::new().with("amount", "100").with("from", "usd").with("to", "eur");
        let card = CurrencyConverter.run(&form, &env).await.unwrap();
        assert_eq!(card.headline.as_deref(), Some("$100.00 = €92.00"));
        assert_eq!(card.tone, Tone::Warning);
        assert!(card.notes[0].contains("using fallback rates"));
    }
}
