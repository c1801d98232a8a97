#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use repurposer::llm::repurpose::{ContentGenerator, PromptStyle};
use repurposer::llm::{LlmProvider, LlmRequest, LlmResponse, UsageMetadata};
use repurposer::processing::Repurposer;
use repurposer::scraping::{ArticleExtractor, ContentExtractor, PageFetcher};

pub const THREAD: &str = "Shipping small changes beats big-bang releases.\n\nSmaller batches surface problems early.\n\nWhat is your team's batch size?";
pub const POST: &str = "Most teams underestimate how much waiting hides inside large releases.\n\nThe article shows how trimming batch size shortens feedback loops and lowers risk.";

/// In-process provider that replays a fixed reply (or error) and records requests.
pub struct ScriptedProvider {
    reply: Result<String, String>,
    calls: AtomicUsize,
    last_request: Mutex<Option<LlmRequest>>,
}

impl ScriptedProvider {
    pub fn replying(content: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(content.into()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn failing(message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.into()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<LlmRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedProvider {
    async fn generate(&self, request: LlmRequest) -> anyhow::Result<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);
        match &self.reply {
            Ok(content) => Ok(LlmResponse {
                content: content.clone(),
                usage: UsageMetadata::default(),
                model: "scripted".to_string(),
            }),
            Err(message) => Err(anyhow::anyhow!("{}", message)),
        }
    }
}

pub fn valid_reply() -> String {
    serde_json::json!({
        "twitterThread": THREAD,
        "linkedinPost": POST,
        "keyTakeaways": ["Ship smaller batches", "Measure lead time", "Automate the release path"],
    })
    .to_string()
}

/// Article page whose `.post-content` block is well over the selector threshold.
pub fn article_page() -> String {
    let body = "Continuous delivery works best when every change is small enough to review in minutes. "
        .repeat(12);
    format!(
        "<html><head><title>Batch size</title><script>window.x = 1;</script></head>\
         <body><nav>Home Blog About</nav>\
         <article><h1>Why batch size matters</h1><div class=\"post-content\"><p>{}</p></div></article>\
         <footer>Copyright 2024</footer></body></html>",
        body
    )
}

pub fn pipeline(provider: Arc<dyn LlmProvider>) -> Repurposer {
    let extractor = ContentExtractor::new(
        PageFetcher::with_client(reqwest::Client::new()),
        ArticleExtractor::default(),
    );
    let generator = ContentGenerator::new(provider, PromptStyle::Strategist, 3000);
    Repurposer::new(extractor, generator, 100)
}
