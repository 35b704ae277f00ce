use super::time_zone::{format_medium, offset_seconds, resolve_local, utc_label};
use crate::core::{Calculator, Card, Env};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::{format_fixed, plural};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::Serialize;

const EARTH_RADIUS_KM: f64 = 6371.0088;
const KM_TO_MILES: f64 = 0.621371;
const KMH_TO_KNOTS: f64 = 0.539957;
pub const DEFAULT_CRUISE_KMH: f64 = 850.0;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Airport {
    pub code: &'static str,
    pub name: &'static str,
    pub city: &'static str,
    #[serde(skip)]
    pub tz: Tz,
    pub lat: f64,
    pub lon: f64,
}

macro_rules! airport {
    ($code:literal, $name:literal, $city:literal, $tz:expr, $lat:literal, $lon:literal) => {
        Airport { code: $code, name: $name, city: $city, tz: $tz, lat: $lat, lon: $lon }
    };
}

pub const AIRPORTS: [Airport; 20] = [
    airport!("ATL", "Hartsfield–Jackson Atlanta International", "Atlanta, USA", chrono_tz::America::New_York, 33.6407, -84.4277),
    airport!("JFK", "John F. Kennedy International", "New York City, USA", chrono_tz::America::New_York, 40.6413, -73.7781),
    airport!("LAX", "Los Angeles International", "Los Angeles, USA", chrono_tz::America::Los_Angeles, 33.9416, -118.4085),
    airport!("ORD", "Chicago O'Hare International", "Chicago, USA", chrono_tz::America::Chicago, 41.9742, -87.9073),
    airport!("DFW", "Dallas/Fort Worth International", "Dallas, USA", chrono_tz::America::Chicago, 32.8998, -97.0403),
    airport!("DEN", "Denver International", "Denver, USA", chrono_tz::America::Denver, 39.8561, -104.6737),
    airport!("SEA", "Seattle–Tacoma International", "Seattle, USA", chrono_tz::America::Los_Angeles, 47.4502, -122.3088),
    airport!("MIA", "Miami International", "Miami, USA", chrono_tz::America::New_York, 25.7959, -80.2871),
    airport!("YYZ", "Toronto Pearson International", "Toronto, Canada", chrono_tz::America::Toronto, 43.6777, -79.6248),
    airport!("LHR", "London Heathrow", "London, United Kingdom", chrono_tz::Europe::London, 51.47, -0.4543),
    airport!("CDG", "Paris Charles de Gaulle", "Paris, France", chrono_tz::Europe::Paris, 49.0097, 2.5479),
    airport!("FRA", "Frankfurt Airport", "Frankfurt, Germany", chrono_tz::Europe::Berlin, 50.0379, 8.5622),
    airport!("DXB", "Dubai International", "Dubai, UAE", chrono_tz::Asia::Dubai, 25.2532, 55.3657),
    airport!("HND", "Tokyo Haneda", "Tokyo, Japan", chrono_tz::Asia::Tokyo, 35.5494, 139.7798),
    airport!("SYD", "Sydney Kingsford Smith", "Sydney, Australia", chrono_tz::Australia::Sydney, -33.9399, 151.1753),
    airport!("SFO", "San Francisco International", "San Francisco, USA", chrono_tz::America::Los_Angeles, 37.6213, -122.379),
    airport!("GRU", "São Paulo/Guarulhos", "São Paulo, Brazil", chrono_tz::America::Sao_Paulo, -23.4356, -46.4731),
    airport!("EZE", "Buenos Aires Ministro Pistarini", "Buenos Aires, Argentina", chrono_tz::America::Argentina::Buenos_Aires, -34.8222, -58.5358),
    airport!("SIN", "Singapore Changi", "Singapore", chrono_tz::Asia::Singapore, 1.3644, 103.9915),
    airport!("JNB", "O. R. Tambo International", "Johannesburg, South Africa", chrono_tz::Africa::Johannesburg, -26.1367, 28.241),
];

pub fn airport(code: &str) -> Option<&'static Airport> {
    let code = code.trim().to_ascii_uppercase();
    AIRPORTS.iter().find(|a| a.code == code)
}

/// Great-circle distance in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    EARTH_RADIUS_KM * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

pub fn format_duration(total_minutes: f64) -> String {
    let minutes = total_minutes.round() as i64;
    let hours = minutes / 60;
    let mins = minutes % 60;
    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{} hour{}", hours, plural(hours)));
    }
    parts.push(format!("{} minute{}", mins, plural(mins)));
    parts.join(" ")
}

#[derive(Debug, Clone, Serialize)]
pub struct FlightEstimate {
    pub from: &'static str,
    pub to: &'static str,
    pub distance_km: f64,
    pub distance_miles: f64,
    pub duration_minutes: f64,
    pub cruise_knots: f64,
    pub depart_local: String,
    pub depart_offset: String,
    pub arrive_local: String,
    pub arrive_offset: String,
    pub zone_shift_hours: f64,
}

pub fn estimate(
    from: &Airport,
    to: &Airport,
    date: NaiveDate,
    time: NaiveTime,
    speed_kmh: f64,
) -> Result<FlightEstimate> {
    if from.code == to.code {
        return Err(CalcError::invalid("Departure and arrival airports must be different."));
    }
    if !speed_kmh.is_finite() || speed_kmh <= 0.0 {
        return Err(CalcError::invalid("Enter a cruise speed in km/h."));
    }
    let departure = resolve_local(from.tz, date.and_time(time))
        .ok_or_else(|| CalcError::invalid("Enter a valid departure date and time."))?;

    let distance_km = haversine_km(from.lat, from.lon, to.lat, to.lon);
    let duration_minutes = distance_km / speed_kmh * 60.0;
    let arrival = (departure + Duration::seconds((duration_minutes * 60.0).round() as i64))
        .with_timezone(&to.tz);

    let dep_offset = offset_seconds(&departure);
    let arr_offset = offset_seconds(&arrival);

    Ok(FlightEstimate {
        from: from.code,
        to: to.code,
        distance_km,
        distance_miles: distance_km * KM_TO_MILES,
        duration_minutes,
        cruise_knots: speed_kmh * KMH_TO_KNOTS,
        depart_local: format_medium(&departure),
        depart_offset: utc_label(dep_offset),
        arrive_local: format_medium(&arrival),
        arrive_offset: utc_label(arr_offset),
        zone_shift_hours: f64::from(arr_offset - dep_offset) / 3600.0,
    })
}

fn shift_label(hours: f64) -> String {
    if hours == 0.0 {
        return "No time zone change".to_string();
    }
    let unit = if hours.abs() == 1.0 { "hour" } else { "hours" };
    if hours > 0.0 {
        format!("{:.1} {} ahead", hours, unit)
    } else {
        format!("{:.1} {} behind", hours.abs(), unit)
    }
}

pub struct FlightTimeCalculator;

#[async_trait]
impl Calculator for FlightTimeCalculator {
    fn key(&self) -> &'static str {
        "flight-time-calculator"
    }

    async fn run(&self, form: &Form, env: &Env) -> Result<Card> {
        let (Some(from), Some(to)) = (
            form.get("from").and_then(airport),
            form.get("to").and_then(airport),
        ) else {
            return Err(CalcError::invalid("Choose both departure and arrival airports."));
        };

        let invalid_when = || CalcError::invalid("Enter a valid departure date and time.");
        let local_now = env.now.with_timezone(&from.tz).naive_local();
        let date = match form.get("date") {
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid_when())?,
            None => local_now.date(),
        };
        let time = match form.get("time") {
            Some(raw) => NaiveTime::parse_from_str(raw, "%H:%M").map_err(|_| invalid_when())?,
            None => local_now.time(),
        };
        let speed = form.value_or("speed", DEFAULT_CRUISE_KMH);

        let trip = estimate(from, to, date, time, speed)?;
        let duration = format_duration(trip.duration_minutes);

        Card::new("Estimated itinerary")
            .headline(format!("{} ({}) to {} ({})", from.city, from.code, to.city, to.code))
            .stat(
                "Distance",
                format!(
                    "{} km ({} miles)",
                    format_fixed(trip.distance_km, 0),
                    format_fixed(trip.distance_miles, 0)
                ),
            )
            .stat(
                "Estimated duration",
                format!(
                    "{} at {} km/h ({} knots)",
                    duration,
                    format_fixed(speed, 0),
                    format_fixed(trip.cruise_knots, 0)
                ),
            )
            .stat("Depart", format!("{} ({})", trip.depart_local, trip.depart_offset))
            .stat("Arrive", format!("{} ({})", trip.arrive_local, trip.arrive_offset))
            .stat("Time zone shift", shift_label(trip.zone_shift_hours))
            .note("Distance is based on the great-circle route between airport coordinates.")
            .note(format!(
                "Nonstop estimate: {}. Adjust cruise speed for winds or ground time.",
                duration
            ))
            .data(&trip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jfk_to_lhr() {
        let jfk = airport("jfk").unwrap();
        let lhr = airport("LHR").unwrap();
        let distance = haversine_km(jfk.lat, jfk.lon, lhr.lat, lhr.lon);
        assert!((distance - 5540.0).abs() < 10.0, "distance {}", distance);

        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let time = NaiveTime::from_hms_opt(18, 0, 0).unwrap();
        let trip = estimate(jfk, lhr, date, time, 850.0).unwrap();
        assert_eq!(trip.depart_offset, "UTC-04:00");
        assert_eq!(trip.arrive_offset, "UTC+01:00");
        assert_eq!(trip.zone_shift_hours, 5.0);
        assert!(trip.arrive_local.starts_with("Jul 2, 2024"));
    }

    #[test]
    fn test_same_airport_rejected() {
        let sfo = airport("SFO").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let time = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        assert!(estimate(sfo, sfo, date, time, 850.0).is_err());
        assert!(estimate(sfo, airport("SEA").unwrap(), date, time, 0.0).is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(392.4), "6 hours 32 minutes");
        assert_eq!(format_duration(61.0), "1 hour 1 minute");
        assert_eq!(format_duration(45.0), "45 minutes");
    }
}
