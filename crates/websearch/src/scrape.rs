//! Page fetching and readable-text extraction.
//!
//! Extraction collects text from content-bearing elements only (headings,
//! paragraphs, list items, table cells), which drops script, style, and
//! navigation boilerplate without a mutation pass over the DOM.

use handbook_core::{AppError, AppResult};
use scraper::{ElementRef, Html, Selector};

/// Elements considered content-bearing when extracting page text.
const CONTENT_SELECTOR: &str = "h1, h2, h3, h4, h5, h6, p, li, td, th, blockquote";

/// Browser-like User-Agent; some institutional sites refuse default client
/// agents.
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; HandbookAgent/0.1)";

/// Extract readable text from an HTML document.
///
/// Returns the text of content elements in document order, one line per
/// element, with intra-element whitespace collapsed. Deterministic for a
/// given document.
pub fn extract_readable_text(html: &str) -> String {
    let document = Html::parse_document(html);

    // The selector is a compile-time constant; parse failure would be a
    // programming error, so fall back to empty output instead of panicking.
    let selector = match Selector::parse(CONTENT_SELECTOR) {
        Ok(selector) => selector,
        Err(_) => return String::new(),
    };

    let mut lines: Vec<String> = Vec::new();
    for element in document.select(&selector) {
        // Keep only the outermost match: an element nested inside another
        // selected element (e.g. a <p> inside an <li>) is already covered
        // by its ancestor's text, so emitting it again would duplicate it.
        let nested = element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| selector.matches(&ancestor));
        if nested {
            continue;
        }

        let text = element
            .text()
            .collect::<Vec<_>>()
            .join(" ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        if !text.is_empty() {
            lines.push(text);
        }
    }

    lines.join("\n")
}

/// Fetch a page and extract its readable text.
///
/// The caller supplies the HTTP client (carrying the page-fetch timeout);
/// errors are reported as `SearchUnavailable` so callers can treat a failed
/// page like a missing result.
pub async fn fetch_page_text(client: &reqwest::Client, url: &str) -> AppResult<String> {
    tracing::debug!("Fetching page: {}", url);

    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await
        .map_err(|e| AppError::SearchUnavailable(format!("Failed to fetch {}: {}", url, e)))?;

    if !response.status().is_success() {
        return Err(AppError::SearchUnavailable(format!(
            "Fetching {} returned status {}",
            url,
            response.status()
        )));
    }

    let html = response
        .text()
        .await
        .map_err(|e| AppError::SearchUnavailable(format!("Failed to read {}: {}", url, e)))?;

    Ok(extract_readable_text(&html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_content_elements() {
        let html = r#"
            <html><head><title>ignored</title>
            <script>var hidden = "should not appear";</script>
            <style>.x { color: red }</style></head>
            <body>
            <nav><div>Menu bar</div></nav>
            <h1>Library Rules</h1>
            <p>Late fees are 5 rupees per day.</p>
            <ul><li>Quiet zones on floor two</li></ul>
            </body></html>
        "#;

        let text = extract_readable_text(html);
        assert!(text.contains("Library Rules"));
        assert!(text.contains("Late fees are 5 rupees per day."));
        assert!(text.contains("Quiet zones on floor two"));
        assert!(!text.contains("should not appear"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn test_nested_content_not_duplicated() {
        let html = "<ul><li><p>Only once</p></li></ul>";
        let text = extract_readable_text(html);
        assert_eq!(text.matches("Only once").count(), 1);
    }

    #[test]
    fn test_whitespace_collapsed() {
        let html = "<p>spaced   \n   out</p>";
        assert_eq!(extract_readable_text(html), "spaced out");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(extract_readable_text(""), "");
    }
}
