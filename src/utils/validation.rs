use crate::utils::error::{Result, ScoutError};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ScoutError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ScoutError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ScoutError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(ScoutError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ScoutError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Major versions are either bare (`14`) or dotted (`9.6`), digits only.
pub fn validate_major_version(value: &str) -> Result<()> {
    static MAJOR: OnceLock<Regex> = OnceLock::new();
    let re = MAJOR.get_or_init(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").expect("static regex"));

    if !re.is_match(value) {
        return Err(ScoutError::InvalidVersion {
            value: value.to_string(),
            reason: "expected digits, optionally followed by '.' and digits".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("release_notes_url", "https://www.postgresql.org/docs").is_ok());
        assert!(validate_url("release_notes_url", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("release_notes_url", "").is_err());
        assert!(validate_url("release_notes_url", "invalid-url").is_err());
        assert!(validate_url("release_notes_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("year_offset", 2008, 1).is_ok());
        assert!(validate_positive_number("year_offset", 0, 1).is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("username", "postgres").is_ok());
        assert!(validate_non_empty_string("username", "   ").is_err());
    }

    #[test]
    fn test_validate_major_version() {
        assert!(validate_major_version("14").is_ok());
        assert!(validate_major_version("9.6").is_ok());
        assert!(validate_major_version("9.6.1").is_err());
        assert!(validate_major_version("-1").is_err());
        assert!(validate_major_version("fourteen").is_err());
        assert!(validate_major_version("").is_err());
    }
}
