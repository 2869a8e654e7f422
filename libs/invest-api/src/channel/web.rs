//! grpc-web transport
//!
//! Wraps a `hyper` HTTPS client in `tonic-web`'s client layer so gRPC calls
//! travel as grpc-web over HTTP/1.1.

use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tonic::body::Body;
use tonic_web::{GrpcWebCall, GrpcWebClientLayer};
use tower::{BoxError, ServiceBuilder, ServiceExt, util::BoxCloneService};

use super::Transport;
use crate::endpoint::ApiEndpoint;
use crate::error::InvestApiResult;

/// Creates a grpc-web transport with rustls and the webpki root store
///
/// Nothing is connected until the first request.
pub fn create_web_transport(endpoint: ApiEndpoint) -> InvestApiResult<Transport> {
  let connector = HttpsConnectorBuilder::new()
    .with_webpki_roots()
    .https_only()
    .enable_http1()
    .build();

  let client: Client<_, GrpcWebCall<Body>> =
    Client::builder(TokioExecutor::new()).build(connector);

  let service = ServiceBuilder::new()
    .layer(GrpcWebClientLayer::new())
    .service(client)
    .map_response(|response: http::Response<_>| response.map(Body::new))
    .map_err(BoxError::from);

  tracing::debug!(
    target: "invest_api",
    url = endpoint.url(),
    "Creating grpc-web transport (connects on first request)"
  );

  Ok(BoxCloneService::new(service))
}
