pub mod limits;
pub mod registry;

pub use limits::{ConfigurableClient, with_limits, with_unbounded_limits};
pub use registry::{ClientRegistry, DEFAULT_CLIENT_NAME};

use std::fmt;
use std::future::Future;

use http::uri::PathAndQuery;
use tonic::client::Grpc;
use tonic::codec::Streaming;
use tonic::service::interceptor::InterceptedService;
use tonic::{Request, Response, Status};
use tonic_prost::ProstCodec;

use crate::channel::{ChannelConfig, Transport, TransportKind, create_transport};
use crate::endpoint::ApiEndpoint;
use crate::error::InvestApiResult;
use crate::interceptors::InvestApiCredentials;
use crate::retry::RetryPolicy;
use crate::settings::{InvestApiSettings, ResolvedSettings};

/// Transport with per-call credentials layered on top of TLS
pub type AuthenticatedTransport = InterceptedService<Transport, InvestApiCredentials>;

/// A configured Invest API client handle
///
/// Cheap to clone; clones share the underlying connection.
///
/// [`InvestApiClient::unary`] and [`InvestApiClient::server_streaming`] always
/// run under the retry policy and the unbounded inbound limit. The raw
/// [`InvestApiClient::transport`] bypasses retries: stubs built on it must be
/// wrapped in [`InvestApiClient::execute`] by hand and passed through
/// [`InvestApiClient::apply_limits`].
///
/// # Example
/// ```ignore
/// use invest_api::{InvestApiClient, InvestApiSettings};
///
/// let settings = InvestApiSettings::new(token).with_sandbox(true);
/// let client = InvestApiClient::from_settings("", &settings)?;
///
/// let accounts: tonic::Response<GetAccountsResponse> = client
///     .unary(
///         "/tinkoff.public.invest.api.contract.v1.UsersService/GetAccounts",
///         GetAccountsRequest::default(),
///     )
///     .await?;
/// ```
#[derive(Clone)]
pub struct InvestApiClient {
    name: String,
    endpoint: ApiEndpoint,
    transport_kind: TransportKind,
    credentials: InvestApiCredentials,
    transport: AuthenticatedTransport,
    decoding_limit: usize,
    retry_policy: RetryPolicy,
}

impl InvestApiClient {
    /// Configure a client from settings with the default channel tuning
    pub fn from_settings(
        name: impl Into<String>,
        settings: &InvestApiSettings,
    ) -> InvestApiResult<Self> {
        Self::from_settings_with_config(name, settings, ChannelConfig::default())
    }

    /// Configure a client from settings with custom channel tuning
    ///
    /// Validation happens before any transport is built, so a missing token
    /// never leaves a half-configured client behind.
    pub fn from_settings_with_config(
        name: impl Into<String>,
        settings: &InvestApiSettings,
        config: ChannelConfig,
    ) -> InvestApiResult<Self> {
        let resolved = settings.resolve()?;
        let credentials = InvestApiCredentials::new(&resolved.access_token, &resolved.app_name)?;
        let transport = create_transport(resolved.endpoint, resolved.transport, &config)?;

        Ok(Self::with_transport(
            name.into(),
            &resolved,
            credentials,
            transport,
            &config,
        ))
    }

    pub(crate) fn with_transport(
        name: String,
        resolved: &ResolvedSettings,
        credentials: InvestApiCredentials,
        transport: Transport,
        config: &ChannelConfig,
    ) -> Self {
        let transport = InterceptedService::new(transport, credentials.clone());

        tracing::info!(
            target: "invest_api",
            client = %name,
            endpoint = %resolved.endpoint,
            transport = %resolved.transport,
            app_name = %resolved.app_name,
            "Configured Invest API client"
        );

        Self {
            name,
            endpoint: resolved.endpoint,
            transport_kind: resolved.transport,
            credentials,
            transport,
            decoding_limit: config.decoding_limit(),
            retry_policy: RetryPolicy::DEFAULT,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> ApiEndpoint {
        self.endpoint
    }

    pub fn transport_kind(&self) -> TransportKind {
        self.transport_kind
    }

    pub fn app_name(&self) -> &str {
        self.credentials.app_name()
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Origin (scheme and authority) every request is sent to
    pub fn origin(&self) -> http::Uri {
        self.endpoint.uri()
    }

    /// Authenticated transport for generated service stubs
    ///
    /// Calls made on this transport bypass the retry policy and carry tonic's
    /// default 4MB inbound limit until [`InvestApiClient::apply_limits`] is used.
    pub fn transport(&self) -> AuthenticatedTransport {
        self.transport.clone()
    }

    /// Apply this client's message limits to a generated stub
    ///
    /// ```ignore
    /// let users = client.apply_limits(UsersServiceClient::with_origin(
    ///     client.transport(),
    ///     client.origin(),
    /// ));
    /// ```
    pub fn apply_limits<T: ConfigurableClient>(&self, stub: T) -> T {
        with_limits(stub, self.decoding_limit, usize::MAX)
    }

    /// Low-level gRPC client with the message limits applied
    pub fn grpc(&self) -> Grpc<AuthenticatedTransport> {
        self.apply_limits(Grpc::with_origin(self.transport(), self.origin()))
    }

    /// Unary call under the retry policy
    ///
    /// `message` is cloned for every attempt.
    pub async fn unary<M1, M2>(
        &self,
        path: &'static str,
        message: M1,
    ) -> Result<Response<M2>, Status>
    where
        M1: prost::Message + Clone + Send + Sync + 'static,
        M2: prost::Message + Default + Send + Sync + 'static,
    {
        self.execute(|| {
            let mut grpc = self.grpc();
            let request = Request::new(message.clone());
            async move {
                ready(&mut grpc, path).await?;
                grpc.unary(request, PathAndQuery::from_static(path), ProstCodec::default())
                    .await
            }
        })
        .await
    }

    /// Server-streaming call under the retry policy
    ///
    /// Only opening the stream is retried. Errors on an established stream
    /// are returned from [`Streaming::message`].
    pub async fn server_streaming<M1, M2>(
        &self,
        path: &'static str,
        message: M1,
    ) -> Result<Response<Streaming<M2>>, Status>
    where
        M1: prost::Message + Clone + Send + Sync + 'static,
        M2: prost::Message + Default + Send + Sync + 'static,
    {
        self.execute(|| {
            let mut grpc = self.grpc();
            let request = Request::new(message.clone());
            async move {
                ready(&mut grpc, path).await?;
                let path = PathAndQuery::from_static(path);
                grpc.server_streaming(request, path, ProstCodec::default())
                    .await
            }
        })
        .await
    }

    /// Run a call under this client's retry policy
    ///
    /// `call` is invoked once per attempt and must build a fresh request each time.
    pub async fn execute<F, Fut, T>(&self, call: F) -> Result<T, Status>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Status>>,
    {
        self.retry_policy.execute(call).await
    }
}

async fn ready(grpc: &mut Grpc<AuthenticatedTransport>, path: &str) -> Result<(), Status> {
    grpc.ready().await.map_err(|e| {
        tracing::debug!(target: "invest_api", path, error = %e, "Transport not ready");
        Status::unavailable(format!("Service was not ready: {}", e))
    })
}

impl fmt::Debug for InvestApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvestApiClient")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("transport_kind", &self.transport_kind)
            .field("app_name", &self.app_name())
            .field("retry_policy", &self.retry_policy)
            .finish_non_exhaustive()
    }
}

/// Configure a client the way the embedding application describes it
///
/// `configure_settings` runs exactly once, on default settings whose
/// `web_client` is pre-set from `web_client`.
///
/// # Example
/// ```ignore
/// let client = invest_api::configure("", |settings| {
///     settings.access_token = Some(token);
///     settings.sandbox = true;
/// }, false)?;
/// ```
pub fn configure<F>(
    name: impl Into<String>,
    configure_settings: F,
    web_client: bool,
) -> InvestApiResult<InvestApiClient>
where
    F: FnOnce(&mut InvestApiSettings),
{
    let mut settings = InvestApiSettings {
        web_client,
        ..InvestApiSettings::default()
    };
    configure_settings(&mut settings);

    InvestApiClient::from_settings(name, &settings)
}
