use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use catalchemy_core::EntityKind;

use crate::errors::GenerationError;

/// One request to the text generation capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    /// Entity kind being generated, `None` for auxiliary prompts.
    pub kind: Option<EntityKind>,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    /// Pre-allocated ids the response is expected to use, in order.
    #[serde(default)]
    pub ids: Vec<String>,
}

/// Black-box text generation: prompt in, raw text out.
///
/// Implementations make a single attempt; retries belong to the caller.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn invoke(&self, prompt: &Prompt) -> Result<String, GenerationError>;
}
