use thiserror::Error;

use crate::enums::BlockKind;

/// Errors raised while turning a node's raw config into a typed [`crate::BlockConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
  /// The config object does not match the block's schema.
  #[error("malformed {kind} config: {source}")]
  Malformed {
    kind: BlockKind,
    #[source]
    source: serde_json::Error,
  },

  /// The config parsed but violates a constraint of the block.
  #[error("invalid {kind} config: {message}")]
  Invalid { kind: BlockKind, message: String },
}

impl ConfigError {
  pub(crate) fn invalid(kind: BlockKind, message: impl Into<String>) -> Self {
    Self::Invalid {
      kind,
      message: message.into(),
    }
  }
}
