//! Archflow Services
//!
//! The engine never talks to an AI provider or document store directly. It
//! goes through the narrow traits defined here, injected at construction:
//!
//! - [`ModelService`]: prompt in, text and token counts out
//! - [`ClassifierService`]: text and categories in, a scored category out
//! - [`DocumentStore`]: write a titled document, get a reference back
//! - [`ExecutionStore`]: record run history outside the engine
//!
//! [`mock`] holds credential-free implementations used by the CLI and tests.

mod classifier;
mod document;
mod error;
mod fs_history;
mod history;
pub mod mock;
mod model;

pub use classifier::{Classification, ClassifierService};
pub use document::{DocumentStore, StoredDocument, WriteRequest};
pub use error::ServiceError;
pub use fs_history::FsExecutionStore;
pub use history::{
  ExecutionRecord, ExecutionStatus, ExecutionStore, InMemoryExecutionStore, StoreError,
};
pub use model::{Completion, GenerateRequest, ModelService, estimate_tokens};
