use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::capability::TextGenerator;
use crate::errors::GenerationError;
use crate::prompts::summary_prompt;

/// Default token budget for brand context embedded in prompts.
pub const DEFAULT_CONTEXT_TOKENS: usize = 300;

/// Source of the brand context string shared by every prompt of a run.
#[async_trait]
pub trait ContextSource: Send + Sync {
    async fn get_context(&self) -> Result<String, GenerationError>;
}

/// Fixed context, mostly useful in tests.
#[derive(Debug, Clone)]
pub struct StaticContext(pub String);

#[async_trait]
impl ContextSource for StaticContext {
    async fn get_context(&self) -> Result<String, GenerationError> {
        Ok(self.0.clone())
    }
}

/// Markdown brand guide read from disk.
///
/// A guide larger than the token budget is condensed once through the
/// summarizer, when one is configured.
pub struct BrandGuide {
    path: PathBuf,
    max_tokens: usize,
    summarizer: Option<Arc<dyn TextGenerator>>,
}

impl BrandGuide {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_tokens: DEFAULT_CONTEXT_TOKENS,
            summarizer: None,
        }
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn TextGenerator>, max_tokens: usize) -> Self {
        self.summarizer = Some(summarizer);
        self.max_tokens = max_tokens;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<String, GenerationError> {
        std::fs::read_to_string(&self.path).map_err(|err| {
            GenerationError::Configuration(format!(
                "brand guide not readable at {}: {err}",
                self.path.display()
            ))
        })
    }
}

#[async_trait]
impl ContextSource for BrandGuide {
    async fn get_context(&self) -> Result<String, GenerationError> {
        let content = self.read()?;
        let tokens = estimate_tokens(&content);

        let Some(summarizer) = self.summarizer.as_ref() else {
            return Ok(content);
        };
        if tokens <= self.max_tokens {
            return Ok(content);
        }

        info!(
            path = %self.path.display(),
            tokens,
            max_tokens = self.max_tokens,
            "summarizing brand guide"
        );
        match summarizer
            .invoke(&summary_prompt(&content, self.max_tokens))
            .await
        {
            Ok(summary) if !summary.trim().is_empty() => Ok(summary.trim().to_string()),
            Ok(_) => {
                warn!(path = %self.path.display(), "empty brand guide summary, using full guide");
                Ok(content)
            }
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "brand guide summary failed, using full guide"
                );
                Ok(content)
            }
        }
    }
}

/// Rough token estimate: four characters per token.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}
