use archflow_config::PersistAction;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteRequest {
  pub action: PersistAction,
  pub title: String,
  pub content: String,
  pub target_id: Option<String>,
  pub collection_id: Option<String>,
}

/// Where a written document ended up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
  pub reference: String,
  pub url: String,
}

/// Document persistence backend (pages, notes, database rows).
#[async_trait]
pub trait DocumentStore: Send + Sync {
  async fn write(&self, request: &WriteRequest) -> Result<StoredDocument, ServiceError>;
}
