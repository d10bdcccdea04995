//! Block handlers.
//!
//! Each handler turns a typed config plus the node's inputs into a
//! [`BlockOutput`]. Config is parsed here, at dispatch time, so a malformed
//! config fails only the node that carries it.

use std::sync::Arc;

use archflow_config::{BlockConfig, NodeDef};
use archflow_services::mock::{InMemoryDocumentStore, MockClassifierService, MockModelService};
use archflow_services::{ClassifierService, DocumentStore, ModelService};
use chrono::{DateTime, Utc};

use crate::error::BlockError;
use crate::input::NodeInputs;
use crate::result::BlockOutput;

pub mod condition;
pub mod generate;
pub mod input;
pub mod persist;
pub mod route;
pub mod schedule;

/// External collaborators the handlers call into.
#[derive(Clone)]
pub struct Services {
  pub model: Arc<dyn ModelService>,
  pub classifier: Arc<dyn ClassifierService>,
  pub documents: Arc<dyn DocumentStore>,
}

impl Services {
  pub fn new(
    model: Arc<dyn ModelService>,
    classifier: Arc<dyn ClassifierService>,
    documents: Arc<dyn DocumentStore>,
  ) -> Self {
    Self {
      model,
      classifier,
      documents,
    }
  }

  /// Credential-free collaborators.
  pub fn mock() -> Self {
    Self::new(
      Arc::new(MockModelService),
      Arc::new(MockClassifierService),
      Arc::new(InMemoryDocumentStore::new()),
    )
  }
}

impl std::fmt::Debug for Services {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Services").finish_non_exhaustive()
  }
}

/// Parse a node's config and run the handler for its block type.
pub async fn run_block(
  services: &Services,
  node: &NodeDef,
  inputs: &NodeInputs,
  now: DateTime<Utc>,
) -> Result<BlockOutput, BlockError> {
  let config = BlockConfig::parse(node.kind, &node.config)?;
  let output = match &config {
    BlockConfig::Input(c) => input::run(c),
    BlockConfig::Generate(c) => generate::run(services.model.as_ref(), c, inputs).await,
    BlockConfig::Persist(c) => persist::run(services.documents.as_ref(), c, inputs).await?,
    BlockConfig::Condition(c) => condition::run(c, inputs),
    BlockConfig::Schedule(c) => schedule::run(c, now),
    BlockConfig::Route(c) => route::run(services.classifier.as_ref(), c, inputs).await?,
  };
  Ok(output)
}
