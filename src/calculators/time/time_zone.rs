use crate::core::{Calculator, Card, Env, Table};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct Zone {
    pub id: &'static str,
    pub label: &'static str,
    pub tz: Tz,
}

pub const ZONES: [Zone; 15] = [
    Zone { id: "new_york", label: "New York, USA", tz: chrono_tz::America::New_York },
    Zone { id: "los_angeles", label: "Los Angeles, USA", tz: chrono_tz::America::Los_Angeles },
    Zone { id: "chicago", label: "Chicago, USA", tz: chrono_tz::America::Chicago },
    Zone { id: "mexico_city", label: "Mexico City, Mexico", tz: chrono_tz::America::Mexico_City },
    Zone { id: "sao_paulo", label: "São Paulo, Brazil", tz: chrono_tz::America::Sao_Paulo },
    Zone { id: "london", label: "London, UK", tz: chrono_tz::Europe::London },
    Zone { id: "paris", label: "Paris, France", tz: chrono_tz::Europe::Paris },
    Zone { id: "berlin", label: "Berlin, Germany", tz: chrono_tz::Europe::Berlin },
    Zone { id: "johannesburg", label: "Johannesburg, South Africa", tz: chrono_tz::Africa::Johannesburg },
    Zone { id: "dubai", label: "Dubai, UAE", tz: chrono_tz::Asia::Dubai },
    Zone { id: "mumbai", label: "Mumbai, India", tz: chrono_tz::Asia::Kolkata },
    Zone { id: "singapore", label: "Singapore", tz: chrono_tz::Asia::Singapore },
    Zone { id: "tokyo", label: "Tokyo, Japan", tz: chrono_tz::Asia::Tokyo },
    Zone { id: "sydney", label: "Sydney, Australia", tz: chrono_tz::Australia::Sydney },
    Zone { id: "auckland", label: "Auckland, New Zealand", tz: chrono_tz::Pacific::Auckland },
];

pub const DEFAULT_TARGETS: [&str; 4] = ["london", "los_angeles", "tokyo", "sydney"];

pub fn zone(id: &str) -> Option<&'static Zone> {
    ZONES.iter().find(|z| z.id == id)
}

/// Local wall-clock time in `tz`. Ambiguous times take the earlier offset;
/// times skipped by a DST jump yield `None`.
pub fn resolve_local(tz: Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&local).earliest()
}

pub fn offset_seconds(dt: &DateTime<Tz>) -> i32 {
    dt.offset().fix().local_minus_utc()
}

/// `UTC+05:30`
pub fn utc_label(offset_seconds: i32) -> String {
    let sign = if offset_seconds >= 0 { '+' } else { '-' };
    let minutes = offset_seconds.abs() / 60;
    format!("UTC{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}

/// `Mar 4, 2024, 9:30 AM`
pub fn format_medium(dt: &DateTime<Tz>) -> String {
    dt.format("%b %-d, %Y, %-I:%M %p").to_string()
}

pub fn format_difference(diff_hours: f64) -> String {
    if !diff_hours.is_finite() || diff_hours.abs() < 1e-9 {
        return "Same time".to_string();
    }
    let rounded = (diff_hours.abs() * 10.0).round() / 10.0;
    let display = if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{:.1}", rounded)
    };
    let unit = if rounded == 1.0 { "hour" } else { "hours" };
    if diff_hours > 0.0 {
        format!("Ahead by {} {}", display, unit)
    } else {
        format!("Behind by {} {}", display, unit)
    }
}

pub fn parse_local(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M"))
        .ok()
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneTime {
    pub zone: &'static str,
    pub local: String,
    pub utc_offset: String,
    pub difference: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    pub utc: DateTime<Utc>,
    pub source: ZoneTime,
    pub targets: Vec<ZoneTime>,
}

pub fn convert(local: NaiveDateTime, from: &Zone, targets: &[&Zone]) -> Result<Conversion> {
    let source = resolve_local(from.tz, local).ok_or_else(|| {
        CalcError::invalid(format!(
            "The selected time does not exist in {}, likely due to a daylight saving shift. Try a different time.",
            from.label
        ))
    })?;
    let utc = source.with_timezone(&Utc);
    let source_offset = offset_seconds(&source);

    let targets = targets
        .iter()
        .map(|zone| {
            let there = utc.with_timezone(&zone.tz);
            let offset = offset_seconds(&there);
            ZoneTime {
                zone: zone.id,
                local: format_medium(&there),
                utc_offset: utc_label(offset),
                difference: format_difference(f64::from(offset - source_offset) / 3600.0),
            }
        })
        .collect();

    Ok(Conversion {
        utc,
        source: ZoneTime {
            zone: from.id,
            local: format_medium(&source),
            utc_offset: utc_label(source_offset),
            difference: format_difference(0.0),
        },
        targets,
    })
}

pub struct TimeZoneConverter;

#[async_trait]
impl Calculator for TimeZoneConverter {
    fn key(&self) -> &'static str {
        "time-zone-converter"
    }

    async fn run(&self, form: &Form, env: &Env) -> Result<Card> {
        let from = zone(form.text_or("from", "new_york"))
            .ok_or_else(|| CalcError::invalid("Choose a source city."))?;
        let local = match form.get("datetime") {
            Some(raw) => parse_local(raw).ok_or_else(|| CalcError::invalid("Enter a valid date and time."))?,
            None => env.now.with_timezone(&from.tz).naive_local(),
        };

        let targets: Vec<&Zone> = match form.get("targets") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .filter_map(zone)
                .collect(),
            None => DEFAULT_TARGETS.iter().filter_map(|id| zone(id)).collect(),
        };
        if targets.is_empty() {
            return Err(CalcError::invalid("Select at least one destination city to compare."));
        }

        let conversion = convert(local, from, &targets)?;

        let mut table = Table::new(&["City".to_string(), "Local time".to_string(), format!("Offset vs. {}", from.label)]);
        for (zone, time) in targets.iter().zip(&conversion.targets) {
            table.push(&[zone.label, time.local.as_str(), time.difference.as_str()]);
        }

        Card::new(format!("{} in {}", conversion.source.local, from.label))
            .stat("UTC", conversion.utc.format("%Y-%m-%d %H:%M").to_string())
            .stat("Source offset", conversion.source.utc_offset.clone())
            .table(table)
            .note("All offsets account for daylight saving time when applicable.")
            .data(&conversion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_new_york_to_defaults_in_summer() {
        let from = zone("new_york").unwrap();
        let targets: Vec<&Zone> = DEFAULT_TARGETS.iter().map(|id| zone(id).unwrap()).collect();
        let result = convert(local(2024, 7, 1, 9, 0), from, &targets).unwrap();
        assert_eq!(result.source.utc_offset, "UTC-04:00");
        assert_eq!(result.targets[0].local, "Jul 1, 2024, 2:00 PM");
        assert_eq!(result.targets[0].difference, "Ahead by 5 hours");
        assert_eq!(result.targets[1].difference, "Behind by 3 hours");
        assert_eq!(result.targets[2].difference, "Ahead by 13 hours");
    }

    #[test]
    fn test_half_hour_offset() {
        let from = zone("london").unwrap();
        let result = convert(local(2024, 1, 15, 12, 0), from, &[zone("mumbai").unwrap()]).unwrap();
        assert_eq!(result.targets[0].utc_offset, "UTC+05:30");
        assert_eq!(result.targets[0].difference, "Ahead by 5.5 hours");
    }

    #[test]
    fn test_spring_forward_gap_rejected() {
        let from = zone("new_york").unwrap();
        let err = convert(local(2024, 3, 10, 2, 30), from, &[zone("london").unwrap()]).unwrap_err();
        assert!(err.to_string().contains("does not exist in New York, USA"));
    }

    #[test]
    fn test_format_difference() {
        assert_eq!(format_difference(0.0), "Same time");
        assert_eq!(format_difference(1.0), "Ahead by 1 hour");
        assert_eq!(format_difference(-9.75), "Behind by 9.8 hours");
    }
}
