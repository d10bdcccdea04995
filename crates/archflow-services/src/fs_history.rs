use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::history::{ExecutionRecord, ExecutionStore, StoreError, select_records};

/// Filesystem-based execution store.
///
/// Each execution is stored as pretty-printed JSON at
/// `{base_path}/{execution_id}.json`. The directory is created on first write.
pub struct FsExecutionStore {
  base_path: PathBuf,
}

impl FsExecutionStore {
  /// Create a new filesystem store with the given base path.
  pub fn new(base_path: impl Into<PathBuf>) -> Self {
    Self {
      base_path: base_path.into(),
    }
  }

  fn record_path(&self, execution_id: &str) -> Result<PathBuf, StoreError> {
    if execution_id.is_empty()
      || execution_id.contains(['/', '\\'])
      || execution_id.starts_with('.')
    {
      return Err(StoreError::InvalidId(execution_id.to_string()));
    }
    Ok(self.base_path.join(format!("{}.json", execution_id)))
  }

  async fn write_record(&self, record: &ExecutionRecord) -> Result<(), StoreError> {
    let path = self.record_path(&record.execution_id)?;
    fs::create_dir_all(&self.base_path).await?;
    let body = serde_json::to_vec_pretty(record)?;
    fs::write(path, body).await?;
    Ok(())
  }
}

#[async_trait]
impl ExecutionStore for FsExecutionStore {
  async fn create_execution(&self, record: &ExecutionRecord) -> Result<(), StoreError> {
    self.write_record(record).await
  }

  async fn update_execution(&self, record: &ExecutionRecord) -> Result<(), StoreError> {
    let path = self.record_path(&record.execution_id)?;
    if !fs::try_exists(&path).await? {
      return Err(StoreError::NotFound(record.execution_id.clone()));
    }
    self.write_record(record).await
  }

  async fn get_execution(&self, execution_id: &str) -> Result<ExecutionRecord, StoreError> {
    let path = self.record_path(execution_id)?;
    let body = fs::read(&path).await.map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        StoreError::NotFound(execution_id.to_string())
      } else {
        StoreError::Io(e)
      }
    })?;
    Ok(serde_json::from_slice(&body)?)
  }

  async fn list_executions(
    &self,
    workflow_id: Option<&str>,
    limit: Option<usize>,
  ) -> Result<Vec<ExecutionRecord>, StoreError> {
    let mut entries = match fs::read_dir(&self.base_path).await {
      Ok(entries) => entries,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
      Err(e) => return Err(StoreError::Io(e)),
    };

    let mut records = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
      let path = entry.path();
      if path.extension().and_then(|e| e.to_str()) != Some("json") {
        continue;
      }
      let body = fs::read(&path).await?;
      match serde_json::from_slice::<ExecutionRecord>(&body) {
        Ok(record) => records.push(record),
        Err(e) => {
          tracing::warn!(
            path = %path.display(),
            error = %e,
            "skipping unreadable execution record"
          );
        }
      }
    }

    Ok(select_records(records, workflow_id, limit))
  }
}
