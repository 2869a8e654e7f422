use thiserror::Error;

pub type InvestApiResult<T> = Result<T, InvestApiError>;

/// Errors that can occur while configuring an Invest API client
///
/// All of these are raised before any network I/O happens. Failures of the
/// calls themselves are reported by tonic as `tonic::Status`.
#[derive(Error, Debug)]
pub enum InvestApiError {
  /// Settings are incomplete or request an unavailable feature
  #[error("Invalid configuration: {0}")]
  Configuration(String),

  /// A credential cannot be carried as a gRPC metadata value
  #[error("Invalid value for metadata header '{header}'")]
  InvalidHeader { header: &'static str },

  /// The endpoint or its TLS configuration was rejected by the transport
  #[error("Invalid endpoint: {0}")]
  InvalidEndpoint(#[from] tonic::transport::Error),

  /// A client with this name is already registered
  #[error("gRPC client '{0}' is already registered")]
  DuplicateClient(String),

  /// Loading settings from the environment failed
  #[error(transparent)]
  Env(#[from] core_config::ConfigError),
}

impl InvestApiError {
  pub(crate) fn missing_access_token() -> Self {
    InvestApiError::Configuration("AccessToken is required".to_string())
  }
}

impl From<InvestApiError> for tonic::Status {
  fn from(err: InvestApiError) -> Self {
    match err {
      InvestApiError::Configuration(_)
      | InvestApiError::InvalidHeader { .. }
      | InvestApiError::Env(_) => tonic::Status::failed_precondition(err.to_string()),
      InvestApiError::InvalidEndpoint(_) => tonic::Status::invalid_argument(err.to_string()),
      InvestApiError::DuplicateClient(_) => tonic::Status::already_exists(err.to_string()),
    }
  }
}
