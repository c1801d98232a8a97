/*!
common/src/lib.rs

Shared configuration types for Repurposer.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader that layers an optional defaults file and an optional override file
- Environment overrides (`PORT`, model credential lookup)
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Browser-like User-Agent; several blogs reject obvious bot clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

/// Outbound page fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Thresholds for the article body heuristic
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// A selector match is accepted once its normalized text is longer than this.
    pub min_content_chars: usize,
    /// Paragraphs at or below this length are dropped by the `<p>` fallback.
    pub min_paragraph_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_content_chars: 500,
            min_paragraph_chars: 50,
        }
    }
}

/// Remote LLM config (OpenAI-compatible chat completions endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            model: "llama-3.1-70b-versatile".to_string(),
            timeout_seconds: 60,
        }
    }
}

/// Generation settings: prompt flavour and input budgets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// "strategist" or "basic"
    pub prompt_style: String,
    pub max_input_chars: usize,
    /// Extracted text shorter than this never reaches the model.
    pub min_viable_chars: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            prompt_style: "strategist".to_string(),
            max_input_chars: 3000,
            min_viable_chars: 100,
        }
    }
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub fetch: FetchConfig,
    pub extraction: ExtractionConfig,
    pub llm: LlmConfig,
    pub generation: GenerationConfig,
}

/// Defaults file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.default.toml";
/// Local override used when no explicit config file is given.
pub const LOCAL_CONFIG_FILE: &str = "config.toml";

impl Config {
    /// Standard layering shared by every binary: `config.default.toml` from `base_dir`,
    /// then `explicit` (which must exist) or `config.toml` from `base_dir`.
    pub async fn load_layered(base_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        let default_path = base_dir.join(DEFAULT_CONFIG_FILE);
        let override_path = match explicit {
            Some(p) => {
                if !p.exists() {
                    anyhow::bail!("Config file not found: {}", p.display());
                }
                p.to_path_buf()
            }
            None => base_dir.join(LOCAL_CONFIG_FILE),
        };

        Self::load_with_defaults(Some(&default_path), Some(&override_path)).await
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        for path in [default_path, override_path].into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            let data = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let val: toml::Value = toml::from_str(&data)
                .with_context(|| format!("Failed to parse configuration: {}", path.display()))?;
            merge_toml(&mut config_value, val);
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        Ok(cfg)
    }

    /// Apply process environment on top of file configuration.
    /// Only `PORT` is honoured here; the API key is looked up lazily via [`Config::api_key`].
    pub fn apply_env(mut self) -> Result<Self> {
        if let Ok(port) = std::env::var("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT env var is not a valid port: '{}'", port))?;
        }
        Ok(self)
    }

    /// Read the model API credential from the environment variable named in `llm.api_key_env`.
    pub fn api_key(&self) -> Result<String> {
        let name = &self.llm.api_key_env;
        let key = std::env::var(name)
            .with_context(|| format!("LLM API key env var '{}' not set", name))?;
        if key.trim().is_empty() {
            anyhow::bail!("LLM API key env var '{}' is empty", name);
        }
        Ok(key)
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}
