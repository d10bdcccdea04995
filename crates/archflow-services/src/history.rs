use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Error type for execution history storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  /// The requested record was not found.
  #[error("execution not found: {0}")]
  NotFound(String),

  /// The execution id cannot be used as a storage key.
  #[error("invalid execution id: {0}")]
  InvalidId(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

/// Status of a workflow execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
  Running,
  Succeeded,
  CompletedWithErrors,
}

/// A workflow execution as kept in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
  pub execution_id: String,
  pub workflow_id: String,
  pub status: ExecutionStatus,
  pub started_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub completed_at: Option<DateTime<Utc>>,
  /// Ledger snapshot, node id -> result.
  #[serde(default)]
  pub results: serde_json::Value,
  #[serde(default)]
  pub summary: serde_json::Value,
}

impl ExecutionRecord {
  /// A fresh record for a run that is about to start.
  pub fn started(execution_id: impl Into<String>, workflow_id: impl Into<String>) -> Self {
    Self {
      execution_id: execution_id.into(),
      workflow_id: workflow_id.into(),
      status: ExecutionStatus::Running,
      started_at: Utc::now(),
      completed_at: None,
      results: serde_json::Value::Null,
      summary: serde_json::Value::Null,
    }
  }

  /// Mark the record finished with the final ledger and summary.
  pub fn complete(
    &mut self,
    status: ExecutionStatus,
    results: serde_json::Value,
    summary: serde_json::Value,
  ) {
    self.status = status;
    self.completed_at = Some(Utc::now());
    self.results = results;
    self.summary = summary;
  }
}

/// Storage trait for execution history.
#[async_trait]
pub trait ExecutionStore: Send + Sync {
  /// Create a new execution record.
  async fn create_execution(&self, record: &ExecutionRecord) -> Result<(), StoreError>;

  /// Replace an existing execution record.
  async fn update_execution(&self, record: &ExecutionRecord) -> Result<(), StoreError>;

  /// Get an execution by ID.
  async fn get_execution(&self, execution_id: &str) -> Result<ExecutionRecord, StoreError>;

  /// List executions, newest first, optionally for one workflow.
  async fn list_executions(
    &self,
    workflow_id: Option<&str>,
    limit: Option<usize>,
  ) -> Result<Vec<ExecutionRecord>, StoreError>;
}

/// Sort newest first and apply the filter and limit.
pub(crate) fn select_records(
  mut records: Vec<ExecutionRecord>,
  workflow_id: Option<&str>,
  limit: Option<usize>,
) -> Vec<ExecutionRecord> {
  records.retain(|r| workflow_id.is_none_or(|id| r.workflow_id == id));
  records.sort_by(|a, b| {
    b.started_at
      .cmp(&a.started_at)
      .then_with(|| a.execution_id.cmp(&b.execution_id))
  });
  if let Some(limit) = limit {
    records.truncate(limit);
  }
  records
}

/// In-memory execution store.
///
/// Suitable for a single process or testing.
#[derive(Debug, Default)]
pub struct InMemoryExecutionStore {
  records: RwLock<HashMap<String, ExecutionRecord>>,
}

impl InMemoryExecutionStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl ExecutionStore for InMemoryExecutionStore {
  async fn create_execution(&self, record: &ExecutionRecord) -> Result<(), StoreError> {
    self
      .records
      .write()
      .await
      .insert(record.execution_id.clone(), record.clone());
    Ok(())
  }

  async fn update_execution(&self, record: &ExecutionRecord) -> Result<(), StoreError> {
    let mut records = self.records.write().await;
    match records.get_mut(&record.execution_id) {
      Some(existing) => {
        *existing = record.clone();
        Ok(())
      }
      None => Err(StoreError::NotFound(record.execution_id.clone())),
    }
  }

  async fn get_execution(&self, execution_id: &str) -> Result<ExecutionRecord, StoreError> {
    self
      .records
      .read()
      .await
      .get(execution_id)
      .cloned()
      .ok_or_else(|| StoreError::NotFound(execution_id.to_string()))
  }

  async fn list_executions(
    &self,
    workflow_id: Option<&str>,
    limit: Option<usize>,
  ) -> Result<Vec<ExecutionRecord>, StoreError> {
    let records: Vec<ExecutionRecord> = self.records.read().await.values().cloned().collect();
    Ok(select_records(records, workflow_id, limit))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  #[tokio::test]
  async fn test_in_memory_execution_store() {
    let store = InMemoryExecutionStore::new();

    let mut record = ExecutionRecord::started("exec-1", "wf-1");
    store.create_execution(&record).await.unwrap();
    assert_eq!(
      store.get_execution("exec-1").await.unwrap().status,
      ExecutionStatus::Running
    );

    record.complete(
      ExecutionStatus::Succeeded,
      serde_json::json!({ "a": { "success": true } }),
      serde_json::json!({ "totalBlocks": 1 }),
    );
    store.update_execution(&record).await.unwrap();

    let stored = store.get_execution("exec-1").await.unwrap();
    assert_eq!(stored.status, ExecutionStatus::Succeeded);
    assert!(stored.completed_at.is_some());

    assert!(matches!(
      store.get_execution("missing").await,
      Err(StoreError::NotFound(_))
    ));
  }

  #[tokio::test]
  async fn test_update_requires_existing_record() {
    let store = InMemoryExecutionStore::new();
    let record = ExecutionRecord::started("exec-1", "wf-1");
    assert!(matches!(
      store.update_execution(&record).await,
      Err(StoreError::NotFound(_))
    ));
  }

  #[tokio::test]
  async fn test_list_filters_and_orders_newest_first() {
    let store = InMemoryExecutionStore::new();
    let now = Utc::now();

    for (id, workflow, age) in [("old", "wf-1", 10), ("new", "wf-1", 1), ("other", "wf-2", 5)] {
      let mut record = ExecutionRecord::started(id, workflow);
      record.started_at = now - Duration::seconds(age);
      store.create_execution(&record).await.unwrap();
    }

    let all = store.list_executions(None, None).await.unwrap();
    let ids: Vec<&str> = all.iter().map(|r| r.execution_id.as_str()).collect();
    assert_eq!(ids, vec!["new", "other", "old"]);

    let wf1 = store.list_executions(Some("wf-1"), Some(1)).await.unwrap();
    assert_eq!(wf1.len(), 1);
    assert_eq!(wf1[0].execution_id, "new");
  }
}
