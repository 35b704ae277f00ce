use crate::core::{Calculator, Card, Env, Table};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::{format_currency, format_max};
use async_trait::async_trait;
use serde::Serialize;

/// Annual average CPI-U.
pub const CPI: [(i32, f64); 44] = [
    (1980, 82.4), (1981, 90.9), (1982, 96.5), (1983, 99.6), (1984, 103.9),
    (1985, 107.6), (1986, 109.6), (1987, 113.6), (1988, 118.3), (1989, 124.0),
    (1990, 130.7), (1991, 136.2), (1992, 140.3), (1993, 144.5), (1994, 148.2),
    (1995, 152.4), (1996, 156.9), (1997, 160.5), (1998, 163.0), (1999, 166.6),
    (2000, 172.2), (2001, 177.1), (2002, 179.9), (2003, 184.0), (2004, 188.9),
    (2005, 195.3), (2006, 201.6), (2007, 207.3), (2008, 215.3), (2009, 214.5),
    (2010, 218.1), (2011, 224.9), (2012, 229.6), (2013, 233.0), (2014, 236.7),
    (2015, 237.0), (2016, 240.0), (2017, 245.1), (2018, 251.1), (2019, 255.7),
    (2020, 258.8), (2021, 271.0), (2022, 292.7), (2023, 305.3),
];

pub fn cpi(year: i32) -> Option<f64> {
    CPI.iter().find(|(y, _)| *y == year).map(|(_, c)| *c)
}

pub fn latest_year() -> i32 {
    CPI[CPI.len() - 1].0
}

#[derive(Debug, Clone, Serialize)]
pub struct CpiRow {
    pub year: i32,
    pub cpi: f64,
    pub equivalent: f64,
    pub yoy_percent: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InflationResult {
    pub amount: f64,
    pub start_year: i32,
    pub end_year: i32,
    pub adjusted: f64,
    pub change_percent: f64,
    pub average_annual_percent: f64,
    pub years_apart: i32,
    pub rows: Vec<CpiRow>,
}

pub fn adjust(amount: f64, start_year: i32, end_year: i32) -> Result<InflationResult> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(CalcError::invalid("Enter an amount of zero or more."));
    }
    let (Some(start_cpi), Some(end_cpi)) = (cpi(start_year), cpi(end_year)) else {
        return Err(CalcError::invalid(
            "Year selection is outside our CPI data range.",
        ));
    };

    let years_apart = (end_year - start_year).abs();
    if years_apart == 0 {
        return Ok(InflationResult {
            amount,
            start_year,
            end_year,
            adjusted: amount,
            change_percent: 0.0,
            average_annual_percent: 0.0,
            years_apart,
            rows: Vec::new(),
        });
    }

    let ratio = end_cpi / start_cpi;
    let (low, high) = (start_year.min(end_year), start_year.max(end_year));
    let window: Vec<&(i32, f64)> = CPI.iter().filter(|(y, _)| (low..=high).contains(y)).collect();
    let rows = window
        .iter()
        .enumerate()
        .map(|(i, (year, value))| CpiRow {
            year: *year,
            cpi: *value,
            equivalent: amount * value / start_cpi,
            yoy_percent: (i > 0).then(|| (value / window[i - 1].1 - 1.0) * 100.0),
        })
        .collect();

    Ok(InflationResult {
        amount,
        start_year,
        end_year,
        adjusted: amount * ratio,
        change_percent: (ratio - 1.0) * 100.0,
        average_annual_percent: (ratio.powf(1.0 / f64::from(years_apart)) - 1.0) * 100.0,
        years_apart,
        rows,
    })
}

fn year_field(form: &Form, field: &str, default: i32) -> Result<i32> {
    match form.get(field) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| {
            CalcError::invalid("Select start and end years within the dataset.")
        }),
    }
}

pub struct InflationCalculator;

#[async_trait]
impl Calculator for InflationCalculator {
    fn key(&self) -> &'static str {
        "inflation-calculator"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let amount = form.value_or("amount", 0.0);
        let start = year_field(form, "start", 2000)?;
        let end = year_field(form, "end", latest_year())?;
        let result = adjust(amount, start, end)?;
        let money = format_currency(result.amount);

        if result.years_apart == 0 {
            return Card::untitled()
                .headline(format!("{} in {} is still {} in {}", money, start, money, end))
                .note("Same-year comparisons have no inflation effect.")
                .data(&result);
        }

        let summary = if start < end {
            format!(
                "{} in {} has the buying power of {} in {}.",
                money, start, format_currency(result.adjusted), end
            )
        } else {
            format!(
                "{} in {} would be worth {} in {}.",
                money, start, format_currency(result.adjusted), end
            )
        };

        let mut table = Table::new(&[
            "Year".to_string(),
            "CPI-U".to_string(),
            format!("Value of {}", money),
            "YoY change".to_string(),
        ]);
        for row in &result.rows {
            table.push(&[
                row.year.to_string(),
                format!("{:.1}", row.cpi),
                format_currency(row.equivalent),
                row.yoy_percent
                    .map(|p| format!("{}%", format_max(p, 2)))
                    .unwrap_or_else(|| "—".to_string()),
            ]);
        }

        Card::untitled()
            .headline(summary)
            .stat("Total inflation", format!("{}%", format_max(result.change_percent, 2)))
            .stat("Average annual", format!("{}%", format_max(result.average_annual_percent, 2)))
            .stat("Years apart", result.years_apart.to_string())
            .table(table)
            .data(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_adjustment() {
        let result = adjust(100.0, 2000, 2023).unwrap();
        assert!((result.adjusted - 100.0 * 305.3 / 172.2).abs() < 1e-9);
        assert_eq!(result.rows.len(), 24);
        assert!(result.rows[0].yoy_percent.is_none());
        assert_eq!(result.years_apart, 23);
    }

    #[test]
    fn test_backward_adjustment() {
        let result = adjust(100.0, 2023, 2000).unwrap();
        assert!(result.adjusted < 100.0);
        assert!(result.change_percent < 0.0);
    }

    #[test]
    fn test_same_year_and_out_of_range() {
        let same = adjust(50.0, 1999, 1999).unwrap();
        assert_eq!(same.adjusted, 50.0);
        assert!(same.rows.is_empty());
        assert!(adjust(50.0, 1970, 2000).is_err());
        assert!(adjust(-1.0, 2000, 2001).is_err());
    }
}
