use crate::domain::ports::{MajorVersionResolver, PageFetcher};
use crate::utils::error::{Result, ScoutError};
use chrono::Datelike;
use regex::Regex;

/// Default major derived from the calendar: `year - offset`.
///
/// With the default offset of 2008 this only tracks the yearly release train
/// that started with PostgreSQL 10; treat the result as a guess.
#[derive(Debug, Clone)]
pub struct YearOffsetResolver {
    offset: i32,
}

impl YearOffsetResolver {
    pub fn new(offset: i32) -> Self {
        Self { offset }
    }

    pub fn major_for_year(&self, year: i32) -> String {
        (year - self.offset).to_string()
    }
}

impl MajorVersionResolver for YearOffsetResolver {
    fn resolve_current_major(&self) -> String {
        let year = chrono::Local::now().year();
        let major = self.major_for_year(year);
        tracing::info!(
            "No --major given, guessing {} from year {} (offset {})",
            major,
            year,
            self.offset
        );
        major
    }
}

/// Always answers the same major.
#[derive(Debug, Clone)]
pub struct FixedMajor(pub String);

impl MajorVersionResolver for FixedMajor {
    fn resolve_current_major(&self) -> String {
        self.0.clone()
    }
}

/// Stable branch name: `9.5` -> `REL9_5_STABLE`, `14` -> `REL_14_STABLE`.
pub fn stable_branch_tag(major: &str) -> String {
    if major.contains('.') {
        format!("REL{}_STABLE", major.replace('.', "_"))
    } else {
        format!("REL_{}_STABLE", major)
    }
}

pub fn configure_url(source_url: &str, major: &str) -> String {
    format!(
        "{}/{}/configure",
        source_url.trim_end_matches('/'),
        stable_branch_tag(major)
    )
}

/// Minor number from the first `PACKAGE_VERSION='<major>.<N>'` line.
pub fn parse_latest_minor(configure: &str, major: &str) -> Result<Option<u32>> {
    let pattern = format!(r"^PACKAGE_VERSION='{}\.([0-9]+)'", regex::escape(major));
    let re = Regex::new(&pattern)?;

    for line in configure.lines() {
        if let Some(caps) = re.captures(line) {
            let minor = caps[1]
                .parse::<u32>()
                .map_err(|e| ScoutError::InvalidVersion {
                    value: caps[1].to_string(),
                    reason: e.to_string(),
                })?;
            return Ok(Some(minor));
        }
    }

    Ok(None)
}

/// Fetches the stable branch's `configure` script and reads the current minor from it.
pub async fn resolve_latest_minor(
    fetcher: &dyn PageFetcher,
    source_url: &str,
    major: &str,
) -> Result<u32> {
    let url = configure_url(source_url, major);
    tracing::debug!("Resolving latest minor of {} from {}", major, url);

    let configure = fetcher.fetch_text(&url).await?;
    match parse_latest_minor(&configure, major)? {
        Some(minor) => {
            tracing::debug!("Latest minor of {} is {}", major, minor);
            Ok(minor)
        }
        None => Err(ScoutError::VersionNotFound {
            major: major.to_string(),
            url,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIGURE_SNIPPET: &str = "\
#! /bin/sh
# Guess values for system-dependent variables and create Makefiles.
# Generated by GNU Autoconf 2.69 for PostgreSQL 14.11.
PACKAGE_NAME='PostgreSQL'
PACKAGE_TARNAME='postgresql'
PACKAGE_VERSION='14.11'
PACKAGE_STRING='PostgreSQL 14.11'
";

    #[test]
    fn test_major_for_year() {
        let resolver = YearOffsetResolver::new(2008);
        assert_eq!(resolver.major_for_year(2021), "13");
        assert_eq!(resolver.major_for_year(2026), "18");

        let shifted = YearOffsetResolver::new(2009);
        assert_eq!(shifted.major_for_year(2026), "17");
    }

    #[test]
    fn test_stable_branch_tag() {
        assert_eq!(stable_branch_tag("9.5"), "REL9_5_STABLE");
        assert_eq!(stable_branch_tag("14"), "REL_14_STABLE");
    }

    #[test]
    fn test_configure_url() {
        assert_eq!(
            configure_url("https://raw.githubusercontent.com/postgres/postgres/", "9.6"),
            "https://raw.githubusercontent.com/postgres/postgres/REL9_6_STABLE/configure"
        );
    }

    #[test]
    fn test_parse_latest_minor() {
        assert_eq!(parse_latest_minor(CONFIGURE_SNIPPET, "14").unwrap(), Some(11));
    }

    #[test]
    fn test_parse_latest_minor_requires_matching_major() {
        assert_eq!(parse_latest_minor(CONFIGURE_SNIPPET, "13").unwrap(), None);
        // "1" must not match "14.11" through an unescaped or unanchored pattern
        assert_eq!(parse_latest_minor(CONFIGURE_SNIPPET, "1").unwrap(), None);
    }

    #[test]
    fn test_parse_latest_minor_dotted_major() {
        let configure = "PACKAGE_VERSION='9.6.24'\n";
        assert_eq!(parse_latest_minor(configure, "9.6").unwrap(), Some(24));
        // the dot is literal
        assert_eq!(parse_latest_minor("PACKAGE_VERSION='9x6.24'\n", "9.6").unwrap(), None);
    }

    #[test]
    fn test_parse_latest_minor_devel_branch() {
        let configure = "PACKAGE_VERSION='19devel'\n";
        assert_eq!(parse_latest_minor(configure, "19").unwrap(), None);
    }
}
