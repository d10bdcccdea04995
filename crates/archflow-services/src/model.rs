use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// A single text generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
  pub model: String,
  pub system_prompt: String,
  pub prompt: String,
  pub temperature: f64,
  pub max_tokens: u32,
}

/// Generated text plus token accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
  pub text: String,
  pub input_tokens: u32,
  pub output_tokens: u32,
}

/// Rough token count: one token per whitespace-separated word.
pub fn estimate_tokens(text: &str) -> u32 {
  u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX)
}

/// Text generation backend.
///
/// Implementations own their own latency bounds and retries; the engine waits
/// for whatever they return.
#[async_trait]
pub trait ModelService: Send + Sync {
  async fn generate(&self, request: &GenerateRequest) -> Result<Completion, ServiceError>;
}
