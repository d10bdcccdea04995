use thiserror::Error;

/// Error returned by an external collaborator.
#[derive(Debug, Error)]
pub enum ServiceError {
  /// The service could not be reached or has no credentials.
  #[error("service unavailable: {0}")]
  Unavailable(String),

  /// The service refused the request.
  #[error("request rejected: {0}")]
  Rejected(String),
}
