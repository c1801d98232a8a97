use anyhow::{Context, Result};
use common::{ExtractionConfig, FetchConfig};
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::PipelineError;

/// Elements that never hold article prose.
const NOISE_SELECTOR: &str =
    "script, style, nav, header, footer, aside, .advertisement, .ads, .sidebar";

/// Candidate containers, most specific first. The first match long enough wins.
const CONTENT_SELECTORS: &[&str] = &[
    "article .content",
    "article .post-content",
    "article .entry-content",
    "article .article-content",
    "article",
    ".post-content",
    ".entry-content",
    ".article-content",
    ".content",
    "main",
    "[role=\"main\"]",
];

/// Thin wrapper over a shared `reqwest::Client` that downloads article pages.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self { client })
    }

    /// Use an already configured client (shared pools, tests).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// GET the page and return its body; any non-2xx status is an error.
    pub async fn fetch(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .context("failed to fetch article page")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("article fetch failed with status: {}", status));
        }

        response.text().await.context("failed to read response body")
    }
}

/// Reduces an HTML document to the plain text of its article body.
#[derive(Debug, Clone)]
pub struct ArticleExtractor {
    min_content_chars: usize,
    min_paragraph_chars: usize,
}

impl Default for ArticleExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

impl ArticleExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            min_content_chars: config.min_content_chars,
            min_paragraph_chars: config.min_paragraph_chars,
        }
    }

    /// Returns whitespace-normalized article text, or an empty string when nothing was found.
    pub fn extract(&self, html: &str) -> String {
        let mut document = Html::parse_document(html);
        strip_noise(&mut document);

        for selector_str in CONTENT_SELECTORS {
            let Ok(selector) = Selector::parse(selector_str) else {
                continue;
            };
            let Some(element) = document.select(&selector).next() else {
                continue;
            };

            let text = normalize_whitespace(&element.text().collect::<String>());
            let len = text.chars().count();
            if len > self.min_content_chars {
                info!("scraping: found content using selector '{}' ({} chars)", selector_str, len);
                return text;
            }
            debug!("scraping: selector '{}' matched but only {} chars", selector_str, len);
        }

        let text = self.paragraph_fallback(&document);
        info!("scraping: fallback to <p> tags, {} chars", text.chars().count());
        text
    }

    fn paragraph_fallback(&self, document: &Html) -> String {
        let Ok(p_selector) = Selector::parse("p") else {
            return String::new();
        };

        let paragraphs: Vec<String> = document
            .select(&p_selector)
            .map(|p| normalize_whitespace(&p.text().collect::<String>()))
            .filter(|text| text.chars().count() > self.min_paragraph_chars)
            .collect();

        normalize_whitespace(&paragraphs.join(" "))
    }
}

/// Content Extractor: fetch a URL and reduce it to article text.
#[derive(Clone)]
pub struct ContentExtractor {
    fetcher: PageFetcher,
    extractor: ArticleExtractor,
}

impl ContentExtractor {
    pub fn new(fetcher: PageFetcher, extractor: ArticleExtractor) -> Self {
        Self { fetcher, extractor }
    }

    pub async fn extract(&self, url: &str) -> Result<String, PipelineError> {
        let url = parse_article_url(url)?;

        let html = self.fetcher.fetch(&url).await.map_err(|e| {
            warn!("scraping: fetch failed for {}: {:#}", url, e);
            PipelineError::Fetch(e)
        })?;

        let text = self.extractor.extract(&html);
        if text.is_empty() {
            warn!("scraping: could not extract content for {}", url);
            return Err(PipelineError::Extraction { length: 0 });
        }
        Ok(text)
    }
}

/// Accept only absolute http(s) URLs.
pub fn parse_article_url(raw: &str) -> Result<Url, PipelineError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(PipelineError::MissingUrl);
    }
    let url = Url::parse(raw).map_err(|e| PipelineError::InvalidUrl(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(PipelineError::InvalidUrl(format!(
            "unsupported scheme '{}' (expected http or https)",
            other
        ))),
    }
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_noise(document: &mut Html) {
    let Ok(selector) = Selector::parse(NOISE_SELECTOR) else {
        return;
    };
    let ids: Vec<_> = document.select(&selector).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}
