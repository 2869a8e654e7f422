pub mod config;
#[cfg(feature = "web")]
pub mod web;

pub use config::ChannelConfig;

use std::fmt;

use tonic::body::Body;
use tonic::transport::{ClientTlsConfig, Endpoint};
use tower::{BoxError, ServiceExt, util::BoxCloneService};

use crate::endpoint::ApiEndpoint;
use crate::error::{InvestApiError, InvestApiResult};

/// Type-erased transport shared by the native and grpc-web paths
pub type Transport = BoxCloneService<http::Request<Body>, http::Response<Body>, BoxError>;

/// Which wire transport a client uses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportKind {
  /// HTTP/2 gRPC
  Native,
  /// grpc-web over HTTP/1.1, for proxies and gateways without HTTP/2
  Web,
}

impl fmt::Display for TransportKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TransportKind::Native => f.write_str("native"),
      TransportKind::Web => f.write_str("grpc-web"),
    }
  }
}

/// Build the transport for an endpoint without connecting
///
/// Both transports use TLS with the webpki root store. The connection is
/// established on the first call.
pub fn create_transport(
  endpoint: ApiEndpoint,
  kind: TransportKind,
  config: &ChannelConfig,
) -> InvestApiResult<Transport> {
  match kind {
    TransportKind::Native => create_native_transport(endpoint, config),
    TransportKind::Web => create_web_transport(endpoint),
  }
}

/// Creates a lazy HTTP/2 channel with TLS
///
/// ## Example
/// ```ignore
/// use invest_api::channel::{create_native_transport, ChannelConfig};
///
/// // Returns immediately, no connection attempt yet
/// let transport = create_native_transport(ApiEndpoint::Sandbox, &ChannelConfig::default())?;
/// ```
pub fn create_native_transport(
  endpoint: ApiEndpoint,
  config: &ChannelConfig,
) -> InvestApiResult<Transport> {
  let url = endpoint.url();

  // The lazy channel spawns its worker onto the current Tokio runtime
  if tokio::runtime::Handle::try_current().is_err() {
    return Err(InvestApiError::Configuration(
      "native transport must be configured inside a Tokio runtime".to_string(),
    ));
  }

  let tls = ClientTlsConfig::new().with_webpki_roots();
  let tonic_endpoint = Endpoint::from_shared(url.to_string())
    .and_then(|e| e.tls_config(tls))
    .map_err(|e| {
      tracing::error!(target: "invest_api", url, error = ?e, "Invalid endpoint");
      InvestApiError::InvalidEndpoint(e)
    })?;

  let tonic_endpoint = config.apply_to_endpoint(tonic_endpoint);

  tracing::debug!(
    target: "invest_api",
    url,
    "Creating lazy gRPC channel (connects on first request)"
  );

  let channel = tonic_endpoint.connect_lazy();
  Ok(BoxCloneService::new(channel.map_err(BoxError::from)))
}

#[cfg(feature = "web")]
fn create_web_transport(endpoint: ApiEndpoint) -> InvestApiResult<Transport> {
  web::create_web_transport(endpoint)
}

#[cfg(not(feature = "web"))]
fn create_web_transport(_endpoint: ApiEndpoint) -> InvestApiResult<Transport> {
  Err(InvestApiError::Configuration(
    "grpc-web transport requires the 'web' feature".to_string(),
  ))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_native_transport_is_lazy() {
    // No server is reachable from tests; building must still succeed
    let transport = create_transport(
      ApiEndpoint::Sandbox,
      TransportKind::Native,
      &ChannelConfig::default(),
    );
    assert!(transport.is_ok());
  }

  #[test]
  fn test_native_transport_without_runtime_fails() {
    let err = create_native_transport(ApiEndpoint::Production, &ChannelConfig::default())
      .err()
      .unwrap();
    assert!(matches!(err, InvestApiError::Configuration(_)));
    assert!(err.to_string().contains("Tokio runtime"));
  }

  #[cfg(feature = "web")]
  #[tokio::test]
  async fn test_web_transport_is_lazy() {
    let transport = create_transport(
      ApiEndpoint::Production,
      TransportKind::Web,
      &ChannelConfig::default(),
    );
    assert!(transport.is_ok());
  }

  #[test]
  fn test_transport_kind_display() {
    assert_eq!(TransportKind::Native.to_string(), "native");
    assert_eq!(TransportKind::Web.to_string(), "grpc-web");
  }
}
