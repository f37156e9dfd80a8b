use crate::domain::ports::PageFetcher;
use crate::utils::error::Result;
use regex::{Regex, RegexBuilder};
use scraper::{Html, Selector};
use std::sync::OnceLock;

/// Paragraph filter; always case-insensitive.
pub fn build_search_regex(pattern: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}

/// `14.2` -> `<base>/release-14-2.html`
pub fn release_notes_url(base_url: &str, version: &str) -> String {
    format!(
        "{}/release-{}.html",
        base_url.trim_end_matches('/'),
        version.replace('.', "-")
    )
}

/// Downloads and parses the release-notes page of one version.
pub async fn fetch_release_notes(
    fetcher: &dyn PageFetcher,
    base_url: &str,
    version: &str,
) -> Result<(String, Html)> {
    let url = release_notes_url(base_url, version);
    tracing::debug!("Fetching release notes for {} from {}", version, url);

    let body = fetcher.fetch_text(&url).await?;
    Ok((url, Html::parse_document(&body)))
}

/// Text of every `<p>` whose content matches `regex`, in document order,
/// paired with the page URL.
pub fn extract_matches(document: &Html, url: &str, regex: &Regex) -> Vec<(String, String)> {
    static PARAGRAPH: OnceLock<Selector> = OnceLock::new();
    let selector = PARAGRAPH.get_or_init(|| Selector::parse("p").expect("static selector"));

    document
        .select(selector)
        .map(|p| p.text().collect::<String>())
        .filter(|text| regex.is_match(text))
        .map(|text| (url.to_string(), text))
        .collect()
}
