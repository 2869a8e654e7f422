use std::fmt;

use core_config::{ConfigError, FromEnv, env_flag, env_optional, env_required};

use crate::channel::TransportKind;
use crate::endpoint::ApiEndpoint;
use crate::error::{InvestApiError, InvestApiResult};

/// Identifier sent in `x-app-name` when the caller does not provide one
///
/// The server attributes traffic to client libraries by this header. The
/// official SDKs each report their own `tinkoff.invest-api-<lang>-sdk` name,
/// so this client reports the Rust one rather than borrowing the C# SDK's.
pub const DEFAULT_APP_NAME: &str = "tinkoff.invest-api-rust-sdk";

/// Caller-supplied settings for an Invest API client
///
/// Built fresh for every configuration and consumed immediately; the
/// configured client is the long-lived artifact.
///
/// # Example
/// ```ignore
/// let settings = InvestApiSettings::new("t.my-token")
///     .with_sandbox(true)
///     .with_app_name("my-robot");
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct InvestApiSettings {
    /// Use the sandbox host instead of production
    pub sandbox: bool,
    /// Bearer token, required
    pub access_token: Option<String>,
    /// Sent as `x-app-name`; `None` and `""` both fall back to [`DEFAULT_APP_NAME`]
    pub app_name: Option<String>,
    /// Use the grpc-web transport instead of native HTTP/2
    pub web_client: bool,
}

impl InvestApiSettings {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            ..Self::default()
        }
    }

    pub fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn with_web_client(mut self, web_client: bool) -> Self {
        self.web_client = web_client;
        self
    }

    pub fn endpoint(&self) -> ApiEndpoint {
        ApiEndpoint::for_sandbox(self.sandbox)
    }

    /// The app name that will be sent, after falling back to the default
    pub fn app_name(&self) -> &str {
        self.app_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_APP_NAME)
    }

    /// Validate and freeze the settings
    ///
    /// Fails when the access token is missing, empty or whitespace-only.
    pub fn resolve(&self) -> InvestApiResult<ResolvedSettings> {
        let access_token = self
            .access_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(InvestApiError::missing_access_token)?;

        Ok(ResolvedSettings {
            endpoint: self.endpoint(),
            access_token: access_token.to_string(),
            app_name: self.app_name().to_string(),
            transport: if self.web_client {
                TransportKind::Web
            } else {
                TransportKind::Native
            },
        })
    }
}

impl fmt::Debug for InvestApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvestApiSettings")
            .field("sandbox", &self.sandbox)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("app_name", &self.app_name)
            .field("web_client", &self.web_client)
            .finish()
    }
}

impl FromEnv for InvestApiSettings {
    /// Reads:
    /// - INVEST_ACCESS_TOKEN: required
    /// - INVEST_SANDBOX: defaults to false
    /// - INVEST_APP_NAME: optional
    /// - INVEST_WEB_CLIENT: defaults to false
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            sandbox: env_flag("INVEST_SANDBOX", false)?,
            access_token: Some(env_required("INVEST_ACCESS_TOKEN")?),
            app_name: env_optional("INVEST_APP_NAME"),
            web_client: env_flag("INVEST_WEB_CLIENT", false)?,
        })
    }
}

/// Settings after validation, shared by endpoint and credential setup
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    pub endpoint: ApiEndpoint,
    pub access_token: String,
    pub app_name: String,
    pub transport: TransportKind,
}

impl fmt::Debug for ResolvedSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedSettings")
            .field("endpoint", &self.endpoint)
            .field("access_token", &"<redacted>")
            .field("app_name", &self.app_name)
            .field("transport", &self.transport)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_production_by_default() {
        let resolved = InvestApiSettings::new("token").resolve().unwrap();
        assert_eq!(resolved.endpoint, ApiEndpoint::Production);
        assert_eq!(resolved.access_token, "token");
        assert_eq!(resolved.app_name, DEFAULT_APP_NAME);
        assert_eq!(resolved.transport, TransportKind::Native);
    }

    #[test]
    fn test_resolve_sandbox_and_web() {
        let resolved = InvestApiSettings::new("token")
            .with_sandbox(true)
            .with_web_client(true)
            .resolve()
            .unwrap();
        assert_eq!(resolved.endpoint, ApiEndpoint::Sandbox);
        assert_eq!(resolved.transport, TransportKind::Web);
    }

    #[test]
    fn test_app_name_fallback() {
        let unset = InvestApiSettings::new("token");
        assert_eq!(unset.app_name(), DEFAULT_APP_NAME);

        let empty = InvestApiSettings::new("token").with_app_name("");
        assert_eq!(empty.app_name(), DEFAULT_APP_NAME);

        let custom = InvestApiSettings::new("token").with_app_name("foo");
        assert_eq!(custom.app_name(), "foo");
    }

    #[test]
    fn test_missing_token_fails() {
        let err = InvestApiSettings::default().resolve().unwrap_err();
        assert!(matches!(err, InvestApiError::Configuration(_)));
    }

    #[test]
    fn test_empty_or_blank_token_fails() {
        for token in ["", "   "] {
            let err = InvestApiSettings::new(token).resolve().unwrap_err();
            assert!(err.to_string().contains("AccessToken is required"));
        }
    }

    #[test]
    fn test_debug_redacts_token() {
        let settings = InvestApiSettings::new("t.secret-value");
        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("secret-value"));
        assert!(rendered.contains("<redacted>"));

        let resolved = settings.resolve().unwrap();
        assert!(!format!("{:?}", resolved).contains("secret-value"));
    }

    #[test]
    fn test_from_env_with_defaults() {
        temp_env::with_vars(
            [
                ("INVEST_ACCESS_TOKEN", Some("t.env-token")),
                ("INVEST_SANDBOX", None),
                ("INVEST_APP_NAME", None),
                ("INVEST_WEB_CLIENT", None),
            ],
            || {
                let settings = InvestApiSettings::from_env().unwrap();
                assert_eq!(settings.access_token.as_deref(), Some("t.env-token"));
                assert!(!settings.sandbox);
                assert!(!settings.web_client);
                assert_eq!(settings.app_name, None);
            },
        );
    }

    #[test]
    fn test_from_env_with_custom_values() {
        temp_env::with_vars(
            [
                ("INVEST_ACCESS_TOKEN", Some("t.env-token")),
                ("INVEST_SANDBOX", Some("true")),
                ("INVEST_APP_NAME", Some("robot")),
                ("INVEST_WEB_CLIENT", Some("1")),
            ],
            || {
                let settings = InvestApiSettings::from_env().unwrap();
                assert!(settings.sandbox);
                assert!(settings.web_client);
                assert_eq!(settings.app_name(), "robot");
                assert_eq!(settings.endpoint(), ApiEndpoint::Sandbox);
            },
        );
    }

    #[test]
    fn test_from_env_missing_token() {
        temp_env::with_var_unset("INVEST_ACCESS_TOKEN", || {
            let err = InvestApiSettings::from_env().unwrap_err();
            assert!(err.to_string().contains("INVEST_ACCESS_TOKEN"));
        });
    }

    #[test]
    fn test_from_env_invalid_flag() {
        temp_env::with_vars(
            [
                ("INVEST_ACCESS_TOKEN", Some("t.env-token")),
                ("INVEST_SANDBOX", Some("sometimes")),
            ],
            || {
                let err = InvestApiSettings::from_env().unwrap_err();
                assert!(matches!(err, ConfigError::ParseError { .. }));
            },
        );
    }
}
