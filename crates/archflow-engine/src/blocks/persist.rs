use archflow_config::PersistConfig;
use archflow_services::{DocumentStore, WriteRequest};

use crate::error::BlockError;
use crate::input::NodeInputs;
use crate::result::BlockOutput;

const UNTITLED: &str = "Untitled";

/// The configured content followed by each input's text, separated by blank
/// lines.
pub fn compose_content(base: &str, inputs: &NodeInputs) -> String {
  let mut content = base.to_string();
  for text in inputs.texts() {
    content.push_str("\n\n");
    content.push_str(text);
  }
  content
}

/// Write a document through the store.
pub async fn run(
  store: &dyn DocumentStore,
  config: &PersistConfig,
  inputs: &NodeInputs,
) -> Result<BlockOutput, BlockError> {
  let title = if config.title.trim().is_empty() {
    UNTITLED.to_string()
  } else {
    config.title.clone()
  };
  let request = WriteRequest {
    action: config.action,
    title,
    content: compose_content(&config.content, inputs),
    target_id: config.target_id.clone(),
    collection_id: config.collection_id.clone(),
  };

  let stored = store
    .write(&request)
    .await
    .map_err(|source| BlockError::Service {
      service: "document store",
      source,
    })?;

  Ok(BlockOutput::Persist {
    action: request.action,
    title: request.title,
    content: request.content,
    reference: stored.reference,
    page_url: stored.url,
  })
}
