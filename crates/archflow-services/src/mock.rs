//! Credential-free collaborators.
//!
//! These keep a workflow completable without any external account: the CLI
//! runs on them by default and the engine tests use them as deterministic
//! stand-ins.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::classifier::{Classification, ClassifierService};
use crate::document::{DocumentStore, StoredDocument, WriteRequest};
use crate::error::ServiceError;
use crate::model::{Completion, GenerateRequest, ModelService, estimate_tokens};

/// Model service that echoes the prompt back.
#[derive(Debug, Clone, Default)]
pub struct MockModelService;

#[async_trait]
impl ModelService for MockModelService {
  async fn generate(&self, request: &GenerateRequest) -> Result<Completion, ServiceError> {
    let text = format!("Mock response ({}): {}", request.model, request.prompt);
    Ok(Completion {
      input_tokens: estimate_tokens(&request.system_prompt) + estimate_tokens(&request.prompt),
      output_tokens: estimate_tokens(&text).min(request.max_tokens),
      text,
    })
  }
}

/// Classifier that picks the first category whose label appears in the text.
///
/// Falls back to the first category with low confidence when none match.
#[derive(Debug, Clone, Default)]
pub struct MockClassifierService;

#[async_trait]
impl ClassifierService for MockClassifierService {
  async fn classify(
    &self,
    text: &str,
    categories: &[String],
    _model: &str,
  ) -> Result<Classification, ServiceError> {
    let lowered = text.to_lowercase();
    if let Some(category) = categories
      .iter()
      .find(|c| !c.is_empty() && lowered.contains(&c.to_lowercase()))
    {
      return Ok(Classification {
        category: category.clone(),
        confidence: 0.8,
        reasoning: format!("text mentions '{}'", category),
      });
    }

    let fallback = categories
      .first()
      .ok_or_else(|| ServiceError::Rejected("no categories supplied".to_string()))?;
    Ok(Classification {
      category: fallback.clone(),
      confidence: 0.3,
      reasoning: "no category mentioned, using the first one".to_string(),
    })
  }
}

/// Document store that keeps every write in memory.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
  writes: Mutex<Vec<(StoredDocument, WriteRequest)>>,
}

impl InMemoryDocumentStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Every write so far, oldest first.
  pub async fn writes(&self) -> Vec<(StoredDocument, WriteRequest)> {
    self.writes.lock().await.clone()
  }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
  async fn write(&self, request: &WriteRequest) -> Result<StoredDocument, ServiceError> {
    let reference = match &request.target_id {
      Some(target) if !target.is_empty() => target.clone(),
      _ => format!("doc-{}", uuid::Uuid::new_v4()),
    };
    let url = match &request.collection_id {
      Some(collection) if !collection.is_empty() => {
        format!("memory://collections/{}/{}", collection, reference)
      }
      _ => format!("memory://documents/{}", reference),
    };
    let stored = StoredDocument { reference, url };

    self
      .writes
      .lock()
      .await
      .push((stored.clone(), request.clone()));
    Ok(stored)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use archflow_config::PersistAction;

  #[tokio::test]
  async fn test_mock_model_echoes_prompt() {
    let completion = MockModelService
      .generate(&GenerateRequest {
        model: "mock".to_string(),
        system_prompt: "be brief".to_string(),
        prompt: "hello there".to_string(),
        temperature: 0.2,
        max_tokens: 100,
      })
      .await
      .unwrap();

    assert!(completion.text.contains("hello there"));
    assert_eq!(completion.input_tokens, 4);
  }

  #[tokio::test]
  async fn test_mock_classifier_matches_label() {
    let categories = vec!["billing".to_string(), "support".to_string()];
    let result = MockClassifierService
      .classify("Need SUPPORT asap", &categories, "mock")
      .await
      .unwrap();
    assert_eq!(result.category, "support");

    let result = MockClassifierService
      .classify("nothing relevant", &categories, "mock")
      .await
      .unwrap();
    assert_eq!(result.category, "billing");
    assert!(result.confidence < 0.5);
  }

  #[tokio::test]
  async fn test_in_memory_document_store_records_writes() {
    let store = InMemoryDocumentStore::new();
    let stored = store
      .write(&WriteRequest {
        action: PersistAction::AddToCollection,
        title: "Report".to_string(),
        content: "body".to_string(),
        target_id: None,
        collection_id: Some("db-1".to_string()),
      })
      .await
      .unwrap();

    assert!(stored.url.starts_with("memory://collections/db-1/"));
    let writes = store.writes().await;
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].1.title, "Report");
  }
}
