//! en-US style number formatting shared by the result cards.

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn split_sign(value: f64, decimals: usize) -> (bool, String) {
    let raw = format!("{:.*}", decimals, value.abs());
    let is_zero = raw.chars().all(|c| c == '0' || c == '.');
    (value.is_sign_negative() && !is_zero, raw)
}

/// Fixed decimals with thousands separators, e.g. `1,234.50`.
pub fn format_fixed(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "—".to_string();
    }
    let (negative, raw) = split_sign(value, decimals);
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (raw.clone(), None),
    };
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(&int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(&frac);
    }
    out
}

/// Up to `max_decimals`, trailing zeros dropped.
pub fn format_max(value: f64, max_decimals: usize) -> String {
    let fixed = format_fixed(value, max_decimals);
    if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        fixed
    }
}

pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "—".to_string();
    }
    let body = format_fixed(value.abs(), 2);
    if split_sign(value, 2).0 {
        format!("-${}", body)
    } else {
        format!("${}", body)
    }
}

pub fn format_currency_whole(value: f64) -> String {
    if !value.is_finite() {
        return "—".to_string();
    }
    let body = format_fixed(value.abs(), 0);
    if split_sign(value, 0).0 {
        format!("-${}", body)
    } else {
        format!("${}", body)
    }
}

pub fn format_percent(value: f64, max_decimals: usize) -> String {
    format!("{}%", format_max(value, max_decimals))
}

pub fn plural(n: i64) -> &'static str {
    if n.abs() == 1 {
        ""
    } else {
        "s"
    }
}

/// `1` -> `1st`, `12` -> `12th`, `23` -> `23rd`
pub fn ordinal(n: i64) -> String {
    let suffix = match (n % 100, n % 10) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// "X yrs Y mos" style month spans used by the payoff calculators.
pub fn format_months(total: u32) -> String {
    if total == 0 {
        return "Already paid".to_string();
    }
    let years = total / 12;
    let months = total % 12;
    let mut parts = Vec::new();
    if years > 0 {
        parts.push(format!("{} yr{}", years, plural(years as i64)));
    }
    if months > 0 {
        parts.push(format!("{} mo{}", months, plural(months as i64)));
    }
    if parts.is_empty() {
        "<1 mo".to_string()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1198.4275), "$1,198.43");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(-0.001), "$0.00");
        assert_eq!(format_currency(-2500.5), "-$2,500.50");
        assert_eq!(format_currency(1_234_567.0), "$1,234,567.00");
        assert_eq!(format_currency_whole(349_999.6), "$350,000");
    }

    #[test]
    fn test_format_max_trims() {
        assert_eq!(format_max(2.5, 4), "2.5");
        assert_eq!(format_max(1000.0, 2), "1,000");
        assert_eq!(format_max(0.000123, 6), "0.000123");
    }

    #[test]
    fn test_ordinal() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(21), "21st");
        assert_eq!(ordinal(112), "112th");
    }

    #[test]
    fn test_format_months() {
        assert_eq!(format_months(0), "Already paid");
        assert_eq!(format_months(1), "1 mo");
        assert_eq!(format_months(12), "1 yr");
        assert_eq!(format_months(27), "2 yrs 3 mos");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>Tom & \"Jerry\"</b>"), "&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;");
    }
}
