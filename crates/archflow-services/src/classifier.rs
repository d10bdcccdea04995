use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
  pub category: String,
  /// Confidence in [0, 1].
  pub confidence: f64,
  pub reasoning: String,
}

/// Assigns a text to one of a fixed list of categories.
#[async_trait]
pub trait ClassifierService: Send + Sync {
  async fn classify(
    &self,
    text: &str,
    categories: &[String],
    model: &str,
  ) -> Result<Classification, ServiceError>;
}
