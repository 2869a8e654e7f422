use tonic::client::Grpc;

/// Trait for clients whose message limits can be configured
///
/// tonic-generated stubs already have these methods; implement the trait for
/// a stub by forwarding to them so [`with_unbounded_limits`] can be applied.
///
/// ```ignore
/// impl<T> ConfigurableClient for MarketDataServiceClient<T> { /* forward */ }
///
/// let stub = with_unbounded_limits(MarketDataServiceClient::with_origin(
///     client.transport(),
///     client.origin(),
/// ));
/// ```
pub trait ConfigurableClient: Sized {
    /// Set maximum size for incoming messages
    fn max_decoding_message_size(self, limit: usize) -> Self;

    /// Set maximum size for outgoing messages
    fn max_encoding_message_size(self, limit: usize) -> Self;
}

impl<T> ConfigurableClient for Grpc<T> {
    fn max_decoding_message_size(self, limit: usize) -> Self {
        Grpc::max_decoding_message_size(self, limit)
    }

    fn max_encoding_message_size(self, limit: usize) -> Self {
        Grpc::max_encoding_message_size(self, limit)
    }
}

/// Apply message size limits to any configurable client
pub fn with_limits<T>(client: T, max_decoding: usize, max_encoding: usize) -> T
where
    T: ConfigurableClient,
{
    client
        .max_decoding_message_size(max_decoding)
        .max_encoding_message_size(max_encoding)
}

/// Remove tonic's 4MB inbound cap
///
/// Candle and order book responses regularly exceed the default.
pub fn with_unbounded_limits<T>(client: T) -> T
where
    T: ConfigurableClient,
{
    with_limits(client, usize::MAX, usize::MAX)
}
