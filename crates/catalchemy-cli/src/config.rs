use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use catalchemy_generate::{DEFAULT_CONTEXT_TOKENS, PipelineOptions};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid settings file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("missing required setting: {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Generation settings, read from an optional TOML file and then
/// overridden by environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Never written back out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub product_temperature: f32,
    pub review_temperature: f32,
    pub profile_batch_size: usize,
    pub product_batch_size: usize,
    pub review_batch_size: usize,
    pub max_retries: u32,
    pub context_tokens: usize,
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        let pipeline = PipelineOptions::default();
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            product_temperature: pipeline.product_temperature,
            review_temperature: pipeline.review_temperature,
            profile_batch_size: pipeline.profile_batch_size,
            product_batch_size: pipeline.product_batch_size,
            review_batch_size: pipeline.review_batch_size,
            max_retries: pipeline.max_retries,
            context_tokens: DEFAULT_CONTEXT_TOKENS,
            seed: None,
        }
    }
}

impl Settings {
    /// Load settings from `path` when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Settings::default());
        };
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`, keyed by environment variable name.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(value) = get("OPENAI_API_KEY") {
            self.api_key = Some(value);
        }
        if let Some(value) = get("MODEL") {
            self.model = value;
        }
        if let Some(value) = get("OPENAI_BASE_URL") {
            self.base_url = value;
        }
        if let Some(value) = get("TEMPERATURE_PRODUCT") {
            self.product_temperature = parse("TEMPERATURE_PRODUCT", &value)?;
        }
        if let Some(value) = get("TEMPERATURE_REVIEW") {
            self.review_temperature = parse("TEMPERATURE_REVIEW", &value)?;
        }
        if let Some(value) = get("BATCH_SIZE") {
            self.product_batch_size = parse("BATCH_SIZE", &value)?;
        }
        if let Some(value) = get("REVIEW_BATCH_SIZE") {
            self.review_batch_size = parse("REVIEW_BATCH_SIZE", &value)?;
        }
        if let Some(value) = get("MAX_RETRIES") {
            self.max_retries = parse("MAX_RETRIES", &value)?;
        }
        Ok(())
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::Missing("OPENAI_API_KEY"))
    }

    /// Seed for this run: the configured one, or a fresh draw stored back
    /// into the settings so `config.json` records it.
    pub fn resolve_seed(&mut self, draw: impl FnOnce() -> u64) -> u64 {
        *self.seed.get_or_insert_with(draw)
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        let defaults = PipelineOptions::default();
        PipelineOptions {
            seed: self.seed.unwrap_or(defaults.seed),
            profile_batch_size: self.profile_batch_size,
            product_batch_size: self.product_batch_size,
            review_batch_size: self.review_batch_size,
            max_retries: self.max_retries,
            product_temperature: self.product_temperature,
            review_temperature: self.review_temperature,
        }
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}
