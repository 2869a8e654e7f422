use std::time::Duration;
use tonic::transport::Endpoint;

/// HTTP/2 and TCP tuning for the native Invest API transport
///
/// No request timeout is set by default: market data streams are long lived
/// and callers are expected to put deadlines on individual calls.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
  // HTTP/2 Keep-Alive
  pub http2_keep_alive_interval: Option<Duration>,
  pub keep_alive_timeout: Duration,
  pub keep_alive_while_idle: bool,

  // Connection settings
  pub connect_timeout: Duration,
  pub timeout: Option<Duration>,

  // Window sizes (HTTP/2 flow control)
  pub initial_connection_window_size: Option<u32>,
  pub initial_stream_window_size: Option<u32>,
  pub http2_adaptive_window: bool,

  // TCP settings
  pub tcp_nodelay: bool,
  pub tcp_keepalive: Option<Duration>,

  // Message limits, None = unbounded
  pub max_decoding_message_size: Option<usize>,
}

impl Default for ChannelConfig {
  fn default() -> Self {
    Self {
      http2_keep_alive_interval: Some(Duration::from_secs(30)),
      keep_alive_timeout: Duration::from_secs(10),
      keep_alive_while_idle: true,
      connect_timeout: Duration::from_secs(10),
      timeout: None,
      initial_connection_window_size: Some(1024 * 1024), // 1MB
      initial_stream_window_size: Some(1024 * 1024),     // 1MB
      http2_adaptive_window: true,
      tcp_nodelay: true,
      tcp_keepalive: Some(Duration::from_secs(30)),
      max_decoding_message_size: None,
    }
  }
}

impl ChannelConfig {
  pub fn new() -> Self {
    Self::default()
  }

  /// Set the connection timeout
  pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
    self.connect_timeout = timeout;
    self
  }

  /// Set a channel-wide timeout for individual RPCs
  ///
  /// # Example
  /// ```ignore
  /// let config = ChannelConfig::new()
  ///     .with_request_timeout(Duration::from_secs(120));
  /// ```
  pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = Some(timeout);
    self
  }

  pub fn without_keep_alive(mut self) -> Self {
    self.http2_keep_alive_interval = None;
    self
  }

  /// Set both connection and stream window sizes to the same value
  pub fn with_window_size(mut self, size: u32) -> Self {
    self.initial_connection_window_size = Some(size);
    self.initial_stream_window_size = Some(size);
    self
  }

  /// Cap the size of inbound messages
  pub fn with_max_decoding_message_size(mut self, limit: usize) -> Self {
    self.max_decoding_message_size = Some(limit);
    self
  }

  /// Inbound message limit handed to `tonic::client::Grpc`
  pub fn decoding_limit(&self) -> usize {
    self.max_decoding_message_size.unwrap_or(usize::MAX)
  }

  pub(crate) fn apply_to_endpoint(&self, mut endpoint: Endpoint) -> Endpoint {
    // HTTP/2 keep-alive
    if let Some(interval) = self.http2_keep_alive_interval {
      endpoint = endpoint.http2_keep_alive_interval(interval);
    }
    endpoint = endpoint
      .keep_alive_timeout(self.keep_alive_timeout)
      .keep_alive_while_idle(self.keep_alive_while_idle);

    // Connection settings
    endpoint = endpoint.connect_timeout(self.connect_timeout);
    if let Some(timeout) = self.timeout {
      endpoint = endpoint.timeout(timeout);
    }

    // Window sizes
    if let Some(size) = self.initial_connection_window_size {
      endpoint = endpoint.initial_connection_window_size(size);
    }
    if let Some(size) = self.initial_stream_window_size {
      endpoint = endpoint.initial_stream_window_size(size);
    }
    endpoint = endpoint.http2_adaptive_window(self.http2_adaptive_window);

    // TCP settings
    endpoint = endpoint.tcp_nodelay(self.tcp_nodelay);
    endpoint.tcp_keepalive(self.tcp_keepalive)
  }
}
