//! Page fetching and text extraction
//!
//! Wraps a pooled reqwest client and a scraper-based HTML stripper. The
//! extractor keeps visible prose and drops chrome (script, style, nav,
//! footer, header) so the encoder sees content rather than markup.

use std::time::Duration;

use scraper::{ElementRef, Html, Selector};

use crate::error::{BasinError, Result};

/// Tags whose subtrees never contribute visible content
const SKIP_TAGS: [&str; 7] = [
    "script", "style", "noscript", "nav", "footer", "header", "head",
];

/// Title and visible text pulled out of a fetched page
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// `<title>` content, possibly empty
    pub title: String,
    /// Space-joined visible text, truncated to the configured cap
    pub text: String,
}

/// HTTP fetcher with HTML text extraction.
///
/// The inner client pools connections, so one fetcher should be shared by
/// everything that downloads pages.
pub struct PageFetcher {
    client: reqwest::Client,
    max_text_len: usize,
}

impl PageFetcher {
    /// Build a fetcher with the given request timeout and extracted-text cap
    pub fn new(timeout: Duration, max_text_len: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("basinsearch/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()?;
        Ok(Self { client, max_text_len })
    }

    /// Download a page and return its raw HTML.
    ///
    /// Rejects non-http(s) URLs and non-text content types.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let parsed = url::Url::parse(url)
            .map_err(|e| BasinError::Fetch(format!("invalid url {url}: {e}")))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(BasinError::Fetch(format!(
                "unsupported scheme: {}",
                parsed.scheme()
            )));
        }

        let response = self.client.get(url).send().await?.error_for_status()?;

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !content_type.is_empty()
            && !content_type.contains("text/html")
            && !content_type.contains("text/plain")
            && !content_type.contains("application/xhtml")
        {
            return Err(BasinError::Fetch(format!(
                "skipping non-HTML content: {content_type}"
            )));
        }

        Ok(response.text().await?)
    }

    /// Strip markup and pull out `(title, visible text)`.
    pub fn extract(&self, html: &str) -> ExtractedPage {
        let document = Html::parse_document(html);

        let title = Selector::parse("title")
            .ok()
            .and_then(|sel| {
                document
                    .select(&sel)
                    .next()
                    .map(|el| el.text().collect::<String>().trim().to_string())
            })
            .unwrap_or_default();

        let mut parts = Vec::new();
        collect_text(document.root_element(), &mut parts);
        let text: String = truncate_chars(&parts.join(" "), self.max_text_len);

        ExtractedPage { title, text }
    }

    /// Fetch a URL and extract its content in one step
    pub async fn fetch_page(&self, url: &str) -> Result<ExtractedPage> {
        let html = self.fetch(url).await?;
        Ok(self.extract(&html))
    }
}

fn collect_text(element: ElementRef<'_>, parts: &mut Vec<String>) {
    use scraper::node::Node;

    if SKIP_TAGS.contains(&element.value().name()) {
        return;
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed.to_string());
                }
            }
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    collect_text(el, parts);
                }
            }
            _ => {}
        }
    }
}

/// Char-boundary-safe truncation
pub(crate) fn truncate_chars(s: &str, max_len: usize) -> String {
    s.chars().take(max_len).collect()
}
