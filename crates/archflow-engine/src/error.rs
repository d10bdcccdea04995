//! Engine error types.

use archflow_config::ConfigError;
use archflow_services::ServiceError;
use archflow_workflow::WorkflowError;

/// Errors that stop a run before any node executes.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
  /// The definition failed graph validation.
  #[error("invalid workflow graph: {0}")]
  InvalidGraph(#[from] WorkflowError),
}

/// Errors raised by a single block. These never abort a run: the engine
/// turns them into a failure entry in the ledger.
#[derive(Debug, thiserror::Error)]
pub enum BlockError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  /// A collaborator call failed and the block has no fallback for it.
  #[error("{service} call failed: {source}")]
  Service {
    service: &'static str,
    #[source]
    source: ServiceError,
  },

  #[error("classifier returned unknown category '{category}'")]
  UnknownCategory { category: String },

  #[error("block handler panicked: {message}")]
  Panicked { message: String },
}
