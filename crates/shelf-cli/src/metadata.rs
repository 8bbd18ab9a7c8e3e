//! Page title fetching
//!
//! Looks up a title for `shelf add` when none is given on the command line.

use anyhow::Result;
use scraper::{Html, Selector};
use std::time::Duration;

/// Fetch the page title for a URL
///
/// Any failure (network error, timeout, non-2xx status, no title) yields
/// `None`; callers fall back to the URL.
pub async fn fetch_page_title(url: &str, timeout: Duration) -> Option<String> {
    match fetch_page_title_inner(url, timeout).await {
        Ok(title) => title,
        Err(e) => {
            tracing::debug!(url, error = %e, "title fetch failed");
            None
        }
    }
}

async fn fetch_page_title_inner(url: &str, timeout: Duration) -> Result<Option<String>> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent("Mozilla/5.0 (compatible; shelf/0.3)")
        .build()?;

    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Ok(None);
    }

    let html = response.text().await?;
    Ok(parse_title(&html))
}

/// Extract a page title from HTML
///
/// Prefers `og:title`, then `twitter:title`, then `<title>`.
fn parse_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    extract_meta_content(&document, "og:title")
        .or_else(|| extract_meta_content(&document, "twitter:title"))
        .or_else(|| {
            let selector = Selector::parse("title").ok()?;
            document
                .select(&selector)
                .next()
                .map(|el| el.text().collect::<String>())
        })
        .map(|s| collapse_whitespace(&s))
        .filter(|s| !s.is_empty())
}

/// Extract content from a meta tag by property or name
fn extract_meta_content(document: &Html, property: &str) -> Option<String> {
    ["property", "name"].iter().find_map(|attr| {
        let selector = Selector::parse(&format!(r#"meta[{}="{}"]"#, attr, property)).ok()?;
        document
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
    })
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_title_basic() {
        let html = r#"
            <!DOCTYPE html>
            <html>
            <head><title>Test Page</title></head>
            <body></body>
            </html>
        "#;
        assert_eq!(parse_title(html), Some("Test Page".to_string()));
    }

    #[test]
    fn test_parse_title_prefers_opengraph() {
        let html = r#"
            <html>
            <head>
                <title>Fallback Title</title>
                <meta name="twitter:title" content="Twitter Title">
                <meta property="og:title" content="OG Title">
            </head>
            </html>
        "#;
        assert_eq!(parse_title(html), Some("OG Title".to_string()));
    }

    #[test]
    fn test_parse_title_twitter_fallback() {
        let html = r#"
            <html>
            <head>
                <title>Fallback Title</title>
                <meta name="twitter:title" content="Twitter Title">
            </head>
            </html>
        "#;
        assert_eq!(parse_title(html), Some("Twitter Title".to_string()));
    }

    #[test]
    fn test_parse_title_collapses_whitespace() {
        let html = "<html><head><title>\n  Spread\n   over   lines  </title></head></html>";
        assert_eq!(parse_title(html), Some("Spread over lines".to_string()));
    }

    #[test]
    fn test_parse_title_missing() {
        assert!(parse_title("<html><head></head><body></body></html>").is_none());
        assert!(parse_title("<html><head><title>   </title></head></html>").is_none());
    }

    #[tokio::test]
    async fn test_fetch_unreachable_returns_none() {
        // Port 9 on localhost is discard; nothing answers HTTP there
        let title = fetch_page_title("http://127.0.0.1:9/", Duration::from_millis(500)).await;
        assert!(title.is_none());
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_returns_none() {
        assert!(fetch_page_title("not a url", Duration::from_secs(1)).await.is_none());
    }
}
