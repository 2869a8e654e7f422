use std::fmt;

/// Production host for live trading
pub const PRODUCTION_URL: &str = "https://invest-public-api.tinkoff.ru:443";

/// Sandbox host for testing strategies without real money
pub const SANDBOX_URL: &str = "https://sandbox-invest-public-api.tinkoff.ru:443";

/// One of the two Invest API hosts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiEndpoint {
    Production,
    Sandbox,
}

impl ApiEndpoint {
    /// Pick the endpoint for the given sandbox flag
    pub fn for_sandbox(sandbox: bool) -> Self {
        if sandbox {
            ApiEndpoint::Sandbox
        } else {
            ApiEndpoint::Production
        }
    }

    pub fn url(&self) -> &'static str {
        match self {
            ApiEndpoint::Production => PRODUCTION_URL,
            ApiEndpoint::Sandbox => SANDBOX_URL,
        }
    }

    /// The endpoint as a URI, used as the request origin
    pub fn uri(&self) -> http::Uri {
        http::Uri::from_static(self.url())
    }
}

impl fmt::Display for ApiEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url())
    }
}
