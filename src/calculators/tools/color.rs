use crate::core::{Calculator, Card, Env};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static HEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#?([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid regex"));
static RGB_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^rgba?\(").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn css(self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    /// (hue degrees, saturation %, lightness %)
    pub fn hsl(self) -> (f64, f64, f64) {
        let r = f64::from(self.r) / 255.0;
        let g = f64::from(self.g) / 255.0;
        let b = f64::from(self.b) / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let d = max - min;
        if d == 0.0 {
            return (0.0, 0.0, l * 100.0);
        }
        let s = d / (1.0 - (2.0 * l - 1.0).abs());
        let h = if max == r {
            60.0 * ((g - b) / d).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / d + 2.0)
        } else {
            60.0 * ((r - g) / d + 4.0)
        };
        (h, s * 100.0, l * 100.0)
    }
}

/// `#RGB` or `#RRGGBB`, hash optional.
pub fn parse_hex(input: &str) -> Option<Rgb> {
    let caps = HEX.captures(input.trim())?;
    let digits = caps.get(1)?.as_str();
    let full: String = if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    };
    let channel = |i: usize| u8::from_str_radix(&full[i..i + 2], 16).ok();
    Some(Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

/// `rgb(10, 20, 30)`, `10 20 30` or percentages like `100% 50% 0%`.
pub fn parse_rgb(input: &str) -> Option<Rgb> {
    let stripped = RGB_PREFIX.replace(input.trim(), "");
    let body = stripped.trim_end_matches(')');
    let parts: Vec<&str> = body
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() < 3 {
        return None;
    }
    let mut channels = [0u8; 3];
    for (slot, part) in channels.iter_mut().zip(&parts) {
        let value = match part.strip_suffix('%') {
            Some(pct) => {
                let n: f64 = pct.parse().ok()?;
                if !(0.0..=100.0).contains(&n) {
                    return None;
                }
                (n / 100.0 * 255.0).round()
            }
            None => {
                let n: f64 = part.parse().ok()?;
                if !(0.0..=255.0).contains(&n) {
                    return None;
                }
                n.round()
            }
        };
        *slot = value as u8;
    }
    Some(Rgb {
        r: channels[0],
        g: channels[1],
        b: channels[2],
    })
}

pub struct HexRgbConverter;

#[async_trait]
impl Calculator for HexRgbConverter {
    fn key(&self) -> &'static str {
        "hex-rgb-color-converter"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let (color, direction) = match (form.get("hex"), form.get("rgb")) {
            (Some(hex), _) => (
                parse_hex(hex).ok_or_else(|| CalcError::invalid("Hex colors should be #RGB or #RRGGBB."))?,
                "Converted HEX → RGB.",
            ),
            (None, Some(rgb)) => (
                parse_rgb(rgb).ok_or_else(|| {
                    CalcError::invalid("RGB values need three numbers between 0 and 255.")
                })?,
                "Converted RGB → HEX.",
            ),
            (None, None) => {
                return Err(CalcError::invalid("Enter a hex code or RGB values to convert."))
            }
        };
        let (h, s, l) = color.hsl();

        Card::new("Color preview")
            .stat("HEX", color.hex())
            .stat("RGB", color.css())
            .stat("HSL", format!("hsl({:.0}, {:.0}%, {:.0}%)", h, s, l))
            .note(direction)
            .data(&color)
    }
}
