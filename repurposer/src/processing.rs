use anyhow::{Context, Result};
use common::Config;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::llm::remote::RemoteLlmProvider;
use crate::llm::repurpose::{ContentGenerator, PromptStyle, RepurposedContent};
use crate::llm::LlmProvider;
use crate::scraping::{ArticleExtractor, ContentExtractor, PageFetcher};

/// The two-stage pipeline: extract the article, then generate drafts from it.
///
/// Holds only stateless collaborators, so one instance serves every request.
#[derive(Clone)]
pub struct Repurposer {
    extractor: ContentExtractor,
    generator: ContentGenerator,
    min_viable_chars: usize,
}

impl Repurposer {
    pub fn new(extractor: ContentExtractor, generator: ContentGenerator, min_viable_chars: usize) -> Self {
        Self {
            extractor,
            generator,
            min_viable_chars,
        }
    }

    /// Wire the pipeline from configuration with the given model provider.
    pub fn from_config(config: &Config, provider: Arc<dyn LlmProvider>) -> Result<Self> {
        let fetcher = PageFetcher::new(&config.fetch)?;
        let extractor = ContentExtractor::new(fetcher, ArticleExtractor::new(&config.extraction));
        let style: PromptStyle = config
            .generation
            .prompt_style
            .parse()
            .context("invalid generation.prompt_style")?;
        let generator = ContentGenerator::new(provider, style, config.generation.max_input_chars);

        Ok(Self::new(extractor, generator, config.generation.min_viable_chars))
    }

    pub async fn repurpose(&self, url: &str) -> Result<RepurposedContent, PipelineError> {
        info!("Processing URL: {}", url);

        let article = self.extractor.extract(url).await?;
        let length = article.chars().count();
        if length < self.min_viable_chars {
            warn!("Extracted only {} characters from {}, not calling the model", length, url);
            return Err(PipelineError::Extraction { length });
        }
        info!("Extracted content length: {} characters", length);

        let content = self.generator.generate(&article).await?;
        info!("Content generation completed successfully");
        Ok(content)
    }
}

/// Build the remote model provider from configuration, reading the API key from the environment.
pub fn create_llm_provider(config: &Config) -> Result<Arc<dyn LlmProvider>> {
    let api_key = config.api_key()?;
    let provider = RemoteLlmProvider::new(&config.llm.api_url, api_key, &config.llm.model)
        .with_defaults(config.llm.timeout_seconds, 1500, 0.7);
    info!("LLM provider initialized: remote ({}) at {}", provider.model(), config.llm.api_url);
    Ok(Arc::new(provider))
}
