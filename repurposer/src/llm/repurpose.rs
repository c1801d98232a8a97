// Repurposing generator: prompt construction and reply validation
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use super::{extract_json_from_text, LlmProvider, LlmRequest};
use crate::error::PipelineError;

/// A thread shorter than this is treated as missing.
pub const THREAD_MIN_CHARS: usize = 50;
/// A long-form post shorter than this is treated as missing.
pub const POST_MIN_CHARS: usize = 100;

/// Separator between consecutive thread posts.
pub const THREAD_SEPARATOR: &str = "\n\n";

const TRUNCATION_MARKER: &str = "...";

const FALLBACK_THREAD: &str = "[Fallback] Professional content analysis completed. The original article contains valuable insights that can be adapted for social media engagement.";
const FALLBACK_POST: &str = "[Fallback] The analyzed content provides strategic insights that can be leveraged for professional development and business growth. Consider the key themes and adapt them to your industry context.";
const FALLBACK_TAKEAWAYS: [&str; 3] = [
    "Strategic insights generated",
    "Review content for implementation",
    "Adapt for your specific use case",
];

const CANNED_THREAD: &str = "[Fallback] Professional content analysis completed. The article contains valuable insights that can be repurposed for social media engagement. Consider the main themes and adapt them to your audience.";
const CANNED_POST: &str = "[Fallback] Content analysis reveals strategic insights applicable to professional development. The original material provides a foundation for thought leadership content that can drive meaningful engagement in your network.";
const CANNED_TAKEAWAYS: [&str; 4] = [
    "Content analysis completed successfully - review generated insights",
    "Adapt key themes to your specific industry and audience",
    "Focus on actionable insights that drive business value",
    "Maintain professional tone while ensuring accessibility",
];

/// Social media drafts produced for one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepurposedContent {
    /// Short-form thread; posts separated by [`THREAD_SEPARATOR`]
    #[serde(rename = "twitterThread")]
    pub thread: String,
    /// A few paragraphs of professional prose
    #[serde(rename = "linkedinPost")]
    pub long_form_post: String,
    #[serde(rename = "keyTakeaways")]
    pub takeaways: Vec<String>,
}

impl RepurposedContent {
    /// Static content returned when the model reply is not JSON at all.
    pub fn canned() -> Self {
        Self {
            thread: CANNED_THREAD.to_string(),
            long_form_post: CANNED_POST.to_string(),
            takeaways: CANNED_TAKEAWAYS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Individual thread posts, in order.
    pub fn thread_posts(&self) -> Vec<&str> {
        self.thread
            .split(THREAD_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Prompt flavour. `Strategist` is the detailed B2B prompt, `Basic` the short one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptStyle {
    #[default]
    Strategist,
    Basic,
}

impl FromStr for PromptStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strategist" => Ok(PromptStyle::Strategist),
            "basic" => Ok(PromptStyle::Basic),
            other => anyhow::bail!("Unknown prompt style: '{}' (expected 'strategist' or 'basic')", other),
        }
    }
}

impl PromptStyle {
    fn system_prompt(self) -> &'static str {
        match self {
            PromptStyle::Strategist => "You are an expert content strategist with a decade of experience in B2B marketing, social media strategy and content repurposing. You write high-value, professional posts for LinkedIn and Twitter that drive engagement and thought leadership. Always respond with valid JSON only.",
            PromptStyle::Basic => "You are an expert content strategist who repurposes long-form articles for social media. Always respond with valid JSON only.",
        }
    }

    fn temperature(self) -> f32 {
        match self {
            PromptStyle::Strategist => 0.3,
            PromptStyle::Basic => 0.7,
        }
    }

    fn top_p(self) -> Option<f32> {
        match self {
            PromptStyle::Strategist => Some(0.9),
            PromptStyle::Basic => None,
        }
    }

    fn max_tokens(self) -> usize {
        match self {
            PromptStyle::Strategist => 2000,
            PromptStyle::Basic => 1500,
        }
    }

    /// Build the user prompt embedding the (already truncated) article text.
    pub fn build_prompt(self, article: &str) -> String {
        match self {
            PromptStyle::Strategist => format!(
                r#"Analyze the following article and turn it into high-quality, valuable content for several platforms.

ARTICLE CONTENT:
{article}

REQUIREMENTS:

1. TWITTER THREAD (3-5 tweets):
   - Open with a hook that creates curiosity
   - Each tweet builds on the previous one and carries a practical insight
   - At most 2-3 relevant hashtags per tweet
   - Professional yet engaging tone
   - Close with a call-to-action or a thought-provoking question
   - Separate tweets with a blank line

2. LINKEDIN POST (2-3 paragraphs):
   - Authoritative tone suited to a B2B audience
   - Open on a common pain point
   - Give actionable insights, concrete examples or frameworks
   - End with a question or call-to-action that invites engagement

3. KEY TAKEAWAYS (3-5 points):
   - Actionable, implementable and specific
   - Focused on strategic value and practical application

GUIDELINES:
- Avoid generic advice; stay specific to the article
- Keep the tone consistent across all formats

RESPONSE FORMAT (strict JSON, no markdown, no commentary):
{{
  "twitterThread": "Tweet 1\n\nTweet 2\n\nTweet 3",
  "linkedinPost": "LinkedIn post text",
  "keyTakeaways": ["Takeaway 1", "Takeaway 2", "Takeaway 3"]
}}
"#
            ),
            PromptStyle::Basic => format!(
                r#"Analyze the following article content and create:

1. A Twitter thread (3-5 tweets, separated by a blank line) that captures the key points in an engaging way
2. A LinkedIn post (professional tone, 2-3 paragraphs) that summarizes the main insights
3. Three key takeaways

Article content:
{article}

Respond with JSON only, using exactly this structure:
{{
  "twitterThread": "Tweet 1\n\nTweet 2\n\nTweet 3",
  "linkedinPost": "LinkedIn post text",
  "keyTakeaways": ["Takeaway 1", "Takeaway 2", "Takeaway 3"]
}}
"#
            ),
        }
    }

    /// Full request for this style: system framing, prompt and sampling parameters.
    pub fn request(self, article: &str) -> LlmRequest {
        LlmRequest {
            system: Some(self.system_prompt().to_string()),
            prompt: self.build_prompt(article),
            max_tokens: Some(self.max_tokens()),
            temperature: Some(self.temperature()),
            top_p: self.top_p(),
            timeout_seconds: None,
        }
    }
}

/// Repurposing Generator: article text in, fully populated drafts out.
#[derive(Clone)]
pub struct ContentGenerator {
    provider: Arc<dyn LlmProvider>,
    style: PromptStyle,
    max_input_chars: usize,
}

impl ContentGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, style: PromptStyle, max_input_chars: usize) -> Self {
        Self {
            provider,
            style,
            max_input_chars,
        }
    }

    /// Only a failed model call is an error; any reply, however broken, yields content.
    pub async fn generate(&self, article_text: &str) -> Result<RepurposedContent, PipelineError> {
        let input = truncate_input(article_text, self.max_input_chars);
        info!(
            "generation: original content {} chars, prompt input {} chars",
            article_text.chars().count(),
            input.chars().count()
        );

        let response = self
            .provider
            .generate(self.style.request(&input))
            .await
            .map_err(PipelineError::Generation)?;

        info!(
            "generation: model {} replied, {} tokens (prompt: {}, completion: {})",
            response.model,
            response.usage.total_tokens,
            response.usage.prompt_tokens,
            response.usage.completion_tokens
        );

        let content = parse_reply(&response.content);
        info!(
            "generation: {} thread posts, {} takeaways",
            content.thread_posts().len(),
            content.takeaways.len()
        );
        Ok(content)
    }
}

/// Cut `text` to `max_chars` characters, appending a marker when cut.
pub fn truncate_input(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Turn a raw model reply into content, substituting fallbacks field by field.
pub fn parse_reply(raw: &str) -> RepurposedContent {
    // Strict JSON first; fences inside string values must not trigger extraction
    let parsed = serde_json::from_str::<Value>(raw.trim())
        .ok()
        .filter(Value::is_object)
        .or_else(|| {
            extract_json_from_text(raw)
                .and_then(|json| serde_json::from_str::<Value>(&json).ok())
                .filter(Value::is_object)
        });

    let Some(value) = parsed else {
        warn!("generation: reply is not a JSON object, using canned content. Raw reply: {}", raw);
        return RepurposedContent::canned();
    };

    let thread = match thread_text(&value) {
        Some(thread) if long_enough(&thread, THREAD_MIN_CHARS) => thread,
        _ => {
            warn!("generation: twitterThread missing or too short, using fallback");
            FALLBACK_THREAD.to_string()
        }
    };

    let long_form_post = match value.get("linkedinPost").and_then(Value::as_str) {
        Some(post) if long_enough(post, POST_MIN_CHARS) => post.to_string(),
        _ => {
            warn!("generation: linkedinPost missing or too short, using fallback");
            FALLBACK_POST.to_string()
        }
    };

    let takeaways = match takeaway_items(&value) {
        Some(items) => items,
        None => {
            warn!("generation: keyTakeaways missing or empty, using fallback");
            FALLBACK_TAKEAWAYS.iter().map(|s| s.to_string()).collect()
        }
    };

    RepurposedContent {
        thread,
        long_form_post,
        takeaways,
    }
}

fn long_enough(text: &str, min_chars: usize) -> bool {
    text.trim().chars().count() >= min_chars
}

/// Thread as a string, or an array of posts joined with the separator.
fn thread_text(value: &Value) -> Option<String> {
    match value.get("twitterThread")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let posts: Vec<&str> = items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            if posts.is_empty() {
                None
            } else {
                Some(posts.join(THREAD_SEPARATOR))
            }
        }
        _ => None,
    }
}

fn takeaway_items(value: &Value) -> Option<Vec<String>> {
    let items: Vec<String> = value
        .get("keyTakeaways")?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}
