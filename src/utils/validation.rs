use crate::utils::error::{CalcError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> CalcError {
    CalcError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// http(s) endpoints only.
pub fn validate_url(field: &str, url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(invalid(field, url, "URL cannot be empty"));
    }
    let parsed = Url::parse(url).map_err(|e| invalid(field, url, format!("Invalid URL format: {}", e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(field, url, format!("Unsupported URL scheme: {}", scheme))),
    }
}

pub fn validate_path(field: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field, path, "Path cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field, path, "Path contains null bytes"));
    }
    Ok(())
}

pub fn validate_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, value, format!("Valid values: {}", allowed.join(", "))))
    }
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(field: &str, value: T, min: T, max: T) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(field, value, format!("Value must be between {} and {}", min, max)));
    }
    Ok(())
}
